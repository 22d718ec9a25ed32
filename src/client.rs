//! The effect runner around the session state machine.
//!
//! The machine itself is a pure transition core; this client performs the
//! asynchronous auth service call and feeds its outcome back in as a
//! command, persists credentials and subscription state, and gates the
//! analysis trigger. It is the only writer of session and subscription
//! state, mutating each synchronously in response to one event at a time.

use crate::analysis::{AnalysisContext, AnalysisOutcome, Analyzer, UploadedImage};
use crate::auth::AuthBackend;
use crate::config::AppConfig;
use crate::credentials::CredentialStore;
use crate::errors::{AnalysisError, AuthError};
use crate::session::{Identity, SessionState};
use crate::session_machine::{SessionCommand, SessionSnapshot, SessionStateMachine};
use crate::storage::KvStore;
use crate::structured_logger::StructuredLogger;
use crate::subscription::{PlanTier, Subscription};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::warn;

const SUBSCRIPTION_KEY: &str = "subscription";

/// How an auth submission resolved. Rejections are ordinary outcomes, not
/// process errors: the rejection is already attached to session state as
/// `last_error` by the time the caller sees it.
#[derive(Debug)]
pub enum AuthOutcome {
    SignedIn(Identity),
    Rejected(AuthError),
}

pub struct Client {
    machine: SessionStateMachine,
    snapshot_rx: watch::Receiver<SessionSnapshot>,
    subscription: Subscription,
    backend: AuthBackend,
    credentials: CredentialStore,
    store: Arc<dyn KvStore>,
    analyzer: Box<dyn Analyzer>,
    logger: Arc<StructuredLogger>,
}

impl Client {
    /// Builds a client, restoring session and subscription state from the
    /// injected store. A persisted credential record starts the session
    /// SignedIn; otherwise it starts SignedOut.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn KvStore>,
        analyzer: Box<dyn Analyzer>,
        logger: Arc<StructuredLogger>,
    ) -> Result<Self> {
        let credentials = CredentialStore::new(store.clone());
        let initial = SessionState::from_credentials(credentials.load()?);
        let (machine, snapshot_rx) = SessionStateMachine::new(initial, logger.clone());
        let backend = AuthBackend::from_config(config, store.clone())?;
        let subscription = load_subscription(store.as_ref())?;

        Ok(Self {
            machine,
            snapshot_rx,
            subscription,
            backend,
            credentials,
            store,
            analyzer,
            logger,
        })
    }

    /// Submits a login. Serialized by the machine: a second submission while
    /// one is in flight is rejected before the backend is touched.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthOutcome> {
        self.machine.apply(SessionCommand::SubmitLogin {
            email: email.to_string(),
        })?;
        let result = self.backend.login(email, password).await;
        self.finish_auth(result).await
    }

    /// Submits a registration; on success the new account is signed in.
    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<AuthOutcome> {
        self.machine.apply(SessionCommand::SubmitSignup {
            email: email.to_string(),
        })?;
        let result = self.backend.register(name, email, password).await;
        self.finish_auth(result).await
    }

    async fn finish_auth(
        &mut self,
        result: Result<crate::auth::AuthSession, AuthError>,
    ) -> Result<AuthOutcome> {
        match result {
            Ok(session) => {
                self.machine.apply(SessionCommand::AuthSucceeded {
                    identity: session.identity.clone(),
                    token: session.token.clone(),
                })?;
                self.credentials.save(&session.identity, &session.token)?;
                Ok(AuthOutcome::SignedIn(session.identity))
            }
            Err(err) => {
                self.machine.apply(SessionCommand::AuthRejected {
                    error: err.to_string(),
                })?;
                Ok(AuthOutcome::Rejected(err))
            }
        }
    }

    /// Tears down the session: state, persisted credentials, and the
    /// subscription, which returns to Free defaults regardless of who signs
    /// back in.
    pub fn logout(&mut self) -> Result<()> {
        self.machine.apply(SessionCommand::Logout)?;
        self.credentials.clear()?;
        self.subscription = Subscription::free_default();
        self.persist_subscription()?;
        self.logger.log(
            "Subscription",
            serde_json::json!({"type": "ResetToFree", "reason": "logout"}),
        );
        Ok(())
    }

    /// Clears the last auth error. Idempotent.
    pub fn clear_error(&mut self) -> Result<()> {
        self.machine.apply(SessionCommand::ClearError)?;
        Ok(())
    }

    /// Switches plan and grants the new tier's full quota immediately.
    pub fn change_plan(&mut self, tier: PlanTier) -> Result<()> {
        self.subscription.change_plan(tier);
        self.persist_subscription()?;
        self.logger.log(
            "Subscription",
            serde_json::json!({
                "type": "PlanChanged",
                "tier": tier.label(),
                "remaining": self.subscription.remaining().to_string(),
            }),
        );
        Ok(())
    }

    /// Billing-cycle hook: restores the full quota for the current tier.
    pub fn reset_monthly(&mut self) -> Result<()> {
        self.subscription.reset_monthly();
        self.persist_subscription()?;
        self.logger.log(
            "Subscription",
            serde_json::json!({
                "type": "MonthlyReset",
                "remaining": self.subscription.remaining().to_string(),
            }),
        );
        Ok(())
    }

    /// The one domain action. Quota is consumed before any analysis work, so
    /// a quota failure performs no work and a denied request never drives
    /// the counter negative.
    pub async fn request_analysis(
        &mut self,
        image: &UploadedImage,
    ) -> Result<AnalysisOutcome, AnalysisError> {
        let state = self.machine.state();
        if !state.is_signed_in() {
            return Err(AnalysisError::NotSignedIn);
        }
        let token = state
            .token
            .clone()
            .ok_or(AnalysisError::NotSignedIn)?;

        self.subscription.consume_one()?;
        self.persist_subscription().map_err(AnalysisError::Failed)?;
        self.logger.log(
            "Subscription",
            serde_json::json!({
                "type": "QuotaConsumed",
                "remaining": self.subscription.remaining().to_string(),
            }),
        );

        let ctx = AnalysisContext {
            tier: self.subscription.tier(),
            token,
        };
        self.analyzer.analyze(image, &ctx).await.map_err(AnalysisError::Failed)
    }

    /// Current session snapshot, as any observer would see it.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    fn persist_subscription(&self) -> Result<()> {
        let json =
            serde_json::to_string(&self.subscription).context("Failed to serialize subscription")?;
        self.store.set(SUBSCRIPTION_KEY, &json)
    }
}

fn load_subscription(store: &dyn KvStore) -> Result<Subscription> {
    match store.get(SUBSCRIPTION_KEY)? {
        Some(json) => match serde_json::from_str(&json) {
            Ok(subscription) => Ok(subscription),
            Err(err) => {
                warn!(error = %err, "discarding unparseable persisted subscription");
                Ok(Subscription::free_default())
            }
        },
        None => Ok(Subscription::free_default()),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
