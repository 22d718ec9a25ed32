//! End-to-end tests for the effect runner, wired against the mock auth
//! backend and an in-memory store.

use super::*;
use crate::analysis::{AnalysisOutcome, MockAnalyzer, UploadedImage};
use crate::errors::SubscriptionError;
use crate::session::SessionPhase;
use crate::storage::MemoryStore;
use crate::subscription::QuotaCeiling;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

fn mock_config() -> AppConfig {
    AppConfig {
        api_base_url: "http://localhost:5000/api".to_string(),
        use_mock_api: true,
    }
}

fn build_client(store: Arc<MemoryStore>, analyzer: Box<dyn Analyzer>, temp: &TempDir) -> Client {
    let logger = Arc::new(StructuredLogger::new("test-client", temp.path()).unwrap());
    Client::new(&mock_config(), store, analyzer, logger).expect("client should build")
}

struct Fixture {
    client: Client,
    store: Arc<MemoryStore>,
    _temp: TempDir,
}

fn fixture() -> Fixture {
    fixture_with(Box::new(MockAnalyzer))
}

fn fixture_with(analyzer: Box<dyn Analyzer>) -> Fixture {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(MemoryStore::new());
    let client = build_client(store.clone(), analyzer, &temp);
    Fixture {
        client,
        store,
        _temp: temp,
    }
}

fn jpeg_image() -> UploadedImage {
    let mut bytes = vec![0xFF, 0xD8, 0xFF, 0xE0];
    bytes.resize(256, 0x42);
    UploadedImage::from_bytes(bytes).unwrap()
}

/// Counts calls through to the mock analyzer, to prove denied requests
/// perform no analysis work.
struct CountingAnalyzer {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Analyzer for CountingAnalyzer {
    async fn analyze(
        &self,
        image: &UploadedImage,
        ctx: &AnalysisContext,
    ) -> Result<AnalysisOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        MockAnalyzer.analyze(image, ctx).await
    }
}

#[tokio::test]
async fn signup_signs_in_and_persists_credentials() {
    let mut fx = fixture();

    let outcome = fx.client.signup("Ada", "ada@x.com", "secret1").await.unwrap();
    match outcome {
        AuthOutcome::SignedIn(identity) => assert_eq!(identity.email, "ada@x.com"),
        AuthOutcome::Rejected(err) => panic!("signup rejected: {}", err),
    }

    let snapshot = fx.client.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::SignedIn);
    assert!(!snapshot.request_in_flight);
    assert!(fx.store.get("user").unwrap().is_some());
    assert!(fx.store.get("token").unwrap().is_some());
}

#[tokio::test]
async fn rejected_login_is_an_outcome_not_an_error() {
    let mut fx = fixture();

    let outcome = fx.client.login("ghost@x.com", "whatever").await.unwrap();
    assert!(matches!(
        outcome,
        AuthOutcome::Rejected(AuthError::AccountNotFound)
    ));

    let snapshot = fx.client.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::AuthFailed);
    assert!(snapshot.last_error.is_some());
    assert!(fx.store.get("token").unwrap().is_none());

    fx.client.clear_error().unwrap();
    let snapshot = fx.client.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::SignedOut);
    assert!(snapshot.last_error.is_none());
}

#[tokio::test]
async fn wrong_password_leaves_the_session_signed_out() {
    let mut fx = fixture();
    fx.client.signup("Ada", "ada@x.com", "secret1").await.unwrap();
    fx.client.logout().unwrap();

    let outcome = fx.client.login("ada@x.com", "wrong").await.unwrap();
    assert!(matches!(
        outcome,
        AuthOutcome::Rejected(AuthError::InvalidCredentials)
    ));
    assert_eq!(fx.client.snapshot().phase, SessionPhase::AuthFailed);
    assert!(fx.store.get("token").unwrap().is_none());

    // A corrected retry goes straight through.
    let outcome = fx.client.login("ada@x.com", "secret1").await.unwrap();
    assert!(matches!(outcome, AuthOutcome::SignedIn(_)));
}

#[tokio::test]
async fn validation_failures_surface_as_rejections() {
    let mut fx = fixture();

    let outcome = fx.client.login("not-an-email", "secret1").await.unwrap();
    assert!(matches!(
        outcome,
        AuthOutcome::Rejected(AuthError::InvalidEmailFormat)
    ));

    fx.client.clear_error().unwrap();
    let outcome = fx.client.signup("Ada", "ada@x.com", "short").await.unwrap();
    assert!(matches!(outcome, AuthOutcome::Rejected(AuthError::WeakPassword)));
}

#[tokio::test]
async fn session_is_restored_from_the_store_on_startup() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(MemoryStore::new());

    {
        let mut client = build_client(store.clone(), Box::new(MockAnalyzer), &temp);
        client.signup("Ada", "ada@x.com", "secret1").await.unwrap();
    }

    let client = build_client(store, Box::new(MockAnalyzer), &temp);
    let snapshot = client.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::SignedIn);
    assert_eq!(
        snapshot.identity.map(|identity| identity.email),
        Some("ada@x.com".to_string())
    );
}

#[tokio::test]
async fn logout_clears_credentials_and_resets_the_subscription() {
    let mut fx = fixture();
    fx.client.signup("Ada", "ada@x.com", "secret1").await.unwrap();
    fx.client.change_plan(PlanTier::Pro).unwrap();
    fx.client.request_analysis(&jpeg_image()).await.unwrap();
    assert_eq!(
        fx.client.subscription().remaining(),
        QuotaCeiling::Limited(99)
    );

    fx.client.logout().unwrap();

    assert_eq!(fx.client.snapshot().phase, SessionPhase::SignedOut);
    assert!(fx.store.get("user").unwrap().is_none());
    assert!(fx.store.get("token").unwrap().is_none());
    assert_eq!(fx.client.subscription().tier(), PlanTier::Free);
    assert_eq!(
        fx.client.subscription().remaining(),
        QuotaCeiling::Limited(10)
    );
}

#[tokio::test]
async fn analysis_requires_a_signed_in_session() {
    let mut fx = fixture();

    let err = fx.client.request_analysis(&jpeg_image()).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NotSignedIn));
    // The quota is untouched by the denied request.
    assert_eq!(
        fx.client.subscription().remaining(),
        QuotaCeiling::Limited(10)
    );
}

#[tokio::test]
async fn exhausted_quota_denies_analysis_without_doing_work() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut fx = fixture_with(Box::new(CountingAnalyzer {
        calls: calls.clone(),
    }));
    fx.client.signup("Ada", "ada@x.com", "secret1").await.unwrap();

    let image = jpeg_image();
    for _ in 0..10 {
        fx.client.request_analysis(&image).await.unwrap();
    }
    assert_eq!(
        fx.client.subscription().remaining(),
        QuotaCeiling::Limited(0)
    );

    let err = fx.client.request_analysis(&image).await.unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Quota(SubscriptionError::QuotaExceeded)
    ));
    // Exactly the ten granted analyses ran; the denied one never did.
    assert_eq!(calls.load(Ordering::SeqCst), 10);
    assert_eq!(
        fx.client.subscription().remaining(),
        QuotaCeiling::Limited(0)
    );

    // A monthly reset makes the trigger usable again.
    fx.client.reset_monthly().unwrap();
    fx.client.request_analysis(&image).await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 11);
}

#[tokio::test]
async fn enterprise_analysis_is_unlimited() {
    let mut fx = fixture();
    fx.client.signup("Ada", "ada@x.com", "secret1").await.unwrap();
    fx.client.change_plan(PlanTier::Enterprise).unwrap();

    let image = jpeg_image();
    for _ in 0..25 {
        fx.client.request_analysis(&image).await.unwrap();
    }
    assert_eq!(fx.client.subscription().remaining(), QuotaCeiling::Unlimited);
}

#[tokio::test]
async fn subscription_survives_client_reconstruction() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(MemoryStore::new());

    {
        let mut client = build_client(store.clone(), Box::new(MockAnalyzer), &temp);
        client.signup("Ada", "ada@x.com", "secret1").await.unwrap();
        client.change_plan(PlanTier::Pro).unwrap();
        client.request_analysis(&jpeg_image()).await.unwrap();
    }

    let client = build_client(store, Box::new(MockAnalyzer), &temp);
    assert_eq!(client.subscription().tier(), PlanTier::Pro);
    assert_eq!(client.subscription().remaining(), QuotaCeiling::Limited(99));
}

#[tokio::test]
async fn corrupt_persisted_subscription_falls_back_to_free() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let store = Arc::new(MemoryStore::new());
    store.set("subscription", "{not json").unwrap();

    let client = build_client(store, Box::new(MockAnalyzer), &temp);
    assert_eq!(client.subscription().tier(), PlanTier::Free);
    assert_eq!(client.subscription().remaining(), QuotaCeiling::Limited(10));
}
