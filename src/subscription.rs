//! Subscription tier and quota accounting.
//!
//! The tier table is static: Free = 10 analyses, Pro = 100, Enterprise =
//! unlimited. Switching plans always grants a full fresh quota immediately,
//! with no pro-rating. `reset_monthly` is the hook an external billing-cycle
//! scheduler would call; nothing in this client invokes it on a timer.

use crate::errors::SubscriptionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    Free,
    Pro,
    Enterprise,
}

impl PlanTier {
    pub fn ceiling(self) -> QuotaCeiling {
        match self {
            PlanTier::Free => QuotaCeiling::Limited(10),
            PlanTier::Pro => QuotaCeiling::Limited(100),
            PlanTier::Enterprise => QuotaCeiling::Unlimited,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PlanTier::Free => "Free",
            PlanTier::Pro => "Pro",
            PlanTier::Enterprise => "Enterprise",
        }
    }

    pub fn price(self) -> &'static str {
        match self {
            PlanTier::Free => "$0",
            PlanTier::Pro => "$9.99",
            PlanTier::Enterprise => "Custom",
        }
    }

    pub fn features(self) -> &'static [&'static str] {
        match self {
            PlanTier::Free => &["Basic facial analysis", "Standard recommendations"],
            PlanTier::Pro => &[
                "Basic facial analysis",
                "Standard recommendations",
                "Advanced insights",
                "Priority support",
            ],
            PlanTier::Enterprise => &[
                "All Pro features",
                "Custom API",
                "Dedicated support",
                "Team collaboration",
            ],
        }
    }

    pub fn all() -> &'static [PlanTier] {
        &[PlanTier::Free, PlanTier::Pro, PlanTier::Enterprise]
    }
}

impl FromStr for PlanTier {
    type Err = SubscriptionError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "enterprise" => Ok(PlanTier::Enterprise),
            other => Err(SubscriptionError::InvalidPlan(other.to_string())),
        }
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Maximum analyses per billing period for a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaCeiling {
    Limited(u32),
    Unlimited,
}

impl fmt::Display for QuotaCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuotaCeiling::Limited(n) => write!(f, "{}", n),
            QuotaCeiling::Unlimited => write!(f, "unlimited"),
        }
    }
}

/// Plan tier plus remaining-uses counter.
///
/// Invariant: for limited tiers, `0 <= remaining <= ceiling`. The counter is
/// meaningless for Enterprise, whose consumption never decrements anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subscription {
    tier: PlanTier,
    remaining: u32,
}

impl Default for Subscription {
    fn default() -> Self {
        Self::free_default()
    }
}

impl Subscription {
    /// Free-tier defaults, the state every client starts in and returns to
    /// on logout.
    pub fn free_default() -> Self {
        Self {
            tier: PlanTier::Free,
            remaining: match PlanTier::Free.ceiling() {
                QuotaCeiling::Limited(n) => n,
                QuotaCeiling::Unlimited => 0,
            },
        }
    }

    pub fn tier(&self) -> PlanTier {
        self.tier
    }

    pub fn ceiling(&self) -> QuotaCeiling {
        self.tier.ceiling()
    }

    /// Remaining analyses under the current tier.
    pub fn remaining(&self) -> QuotaCeiling {
        match self.tier.ceiling() {
            QuotaCeiling::Limited(_) => QuotaCeiling::Limited(self.remaining),
            QuotaCeiling::Unlimited => QuotaCeiling::Unlimited,
        }
    }

    /// Switches to `tier` and grants its full quota, even when re-selecting
    /// the current tier.
    pub fn change_plan(&mut self, tier: PlanTier) {
        self.tier = tier;
        self.reset_monthly();
    }

    /// Consumes one analysis unit.
    ///
    /// Unlimited tiers always succeed without mutation. Limited tiers fail
    /// with [`SubscriptionError::QuotaExceeded`] at zero remaining, leaving
    /// the counter untouched so it can never go negative.
    pub fn consume_one(&mut self) -> Result<(), SubscriptionError> {
        match self.tier.ceiling() {
            QuotaCeiling::Unlimited => Ok(()),
            QuotaCeiling::Limited(_) => {
                if self.remaining == 0 {
                    Err(SubscriptionError::QuotaExceeded)
                } else {
                    self.remaining -= 1;
                    Ok(())
                }
            }
        }
    }

    /// Restores the full quota for the current tier. Billing-cycle hook.
    pub fn reset_monthly(&mut self) {
        self.remaining = match self.tier.ceiling() {
            QuotaCeiling::Limited(n) => n,
            QuotaCeiling::Unlimited => 0,
        };
    }
}

#[cfg(test)]
#[path = "subscription_tests.rs"]
mod tests;
