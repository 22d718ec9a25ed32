//! Tests for subscription quota accounting.

use super::*;
use proptest::prelude::*;

#[test]
fn free_defaults_start_with_ten_remaining() {
    let sub = Subscription::free_default();
    assert_eq!(sub.tier(), PlanTier::Free);
    assert_eq!(sub.remaining(), QuotaCeiling::Limited(10));
}

#[test]
fn consuming_the_full_free_quota_then_failing() {
    let mut sub = Subscription::free_default();
    for _ in 0..10 {
        sub.consume_one().expect("within quota");
    }
    assert_eq!(sub.remaining(), QuotaCeiling::Limited(0));

    // The failing call mutates nothing.
    assert_eq!(sub.consume_one(), Err(SubscriptionError::QuotaExceeded));
    assert_eq!(sub.remaining(), QuotaCeiling::Limited(0));
}

#[test]
fn enterprise_consumption_always_succeeds() {
    let mut sub = Subscription::free_default();
    sub.change_plan(PlanTier::Enterprise);
    for _ in 0..1000 {
        sub.consume_one().expect("unlimited tier");
    }
    assert_eq!(sub.remaining(), QuotaCeiling::Unlimited);
}

#[test]
fn plan_change_grants_a_full_fresh_quota() {
    let mut sub = Subscription::free_default();
    sub.consume_one().unwrap();

    sub.change_plan(PlanTier::Pro);
    assert_eq!(sub.remaining(), QuotaCeiling::Limited(100));

    // Downgrading resets too; quota is never additive.
    sub.change_plan(PlanTier::Free);
    assert_eq!(sub.remaining(), QuotaCeiling::Limited(10));
}

#[test]
fn reselecting_the_current_tier_still_resets() {
    let mut sub = Subscription::free_default();
    sub.consume_one().unwrap();
    sub.change_plan(PlanTier::Free);
    assert_eq!(sub.remaining(), QuotaCeiling::Limited(10));
}

#[test]
fn monthly_reset_restores_the_ceiling() {
    let mut sub = Subscription::free_default();
    for _ in 0..7 {
        sub.consume_one().unwrap();
    }
    sub.reset_monthly();
    assert_eq!(sub.remaining(), QuotaCeiling::Limited(10));
}

#[test]
fn unknown_plan_names_are_rejected() {
    let err = "premium".parse::<PlanTier>().unwrap_err();
    assert_eq!(err, SubscriptionError::InvalidPlan("premium".to_string()));

    assert_eq!(" PRO ".parse::<PlanTier>().unwrap(), PlanTier::Pro);
}

#[test]
fn subscription_serialization_round_trips() {
    let mut sub = Subscription::free_default();
    sub.change_plan(PlanTier::Pro);
    sub.consume_one().unwrap();

    let json = serde_json::to_string(&sub).unwrap();
    let loaded: Subscription = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, sub);
    assert_eq!(loaded.remaining(), QuotaCeiling::Limited(99));
}

proptest! {
    /// However many consume attempts are made, a limited counter never goes
    /// negative and successes never exceed the ceiling.
    #[test]
    fn quota_never_goes_negative(attempts in 0usize..300) {
        let mut sub = Subscription::free_default();
        sub.change_plan(PlanTier::Pro);

        let mut successes = 0u32;
        for _ in 0..attempts {
            if sub.consume_one().is_ok() {
                successes += 1;
            }
        }

        prop_assert!(successes <= 100);
        match sub.remaining() {
            QuotaCeiling::Limited(left) => prop_assert_eq!(left, 100 - successes),
            QuotaCeiling::Unlimited => prop_assert!(false, "pro tier is limited"),
        }
    }

    /// A reset after arbitrary consumption always restores the full ceiling.
    #[test]
    fn reset_always_restores_the_ceiling(consumed in 0usize..15) {
        let mut sub = Subscription::free_default();
        for _ in 0..consumed {
            let _ = sub.consume_one();
        }
        sub.reset_monthly();
        prop_assert_eq!(sub.remaining(), QuotaCeiling::Limited(10));
    }
}
