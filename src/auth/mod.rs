//! Auth service: login and registration against a pluggable backend.
//!
//! Two backends exist, selected by configuration: the locally persisted mock
//! directory and the remote HTTP service. Both share the same input
//! validation and normalize into the same `Result<AuthSession, AuthError>`
//! shape, so callers never branch on which one is active.

pub mod http;
pub mod mock;

pub use http::HttpAuthBackend;
pub use mock::MockAuthBackend;

use crate::config::AppConfig;
use crate::errors::{AuthError, MIN_PASSWORD_LEN};
use crate::session::Identity;
use crate::storage::KvStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

/// A freshly authenticated identity plus its bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub identity: Identity,
    pub token: String,
}

/// The active auth backend. Exactly one is constructed per client.
pub enum AuthBackend {
    Mock(MockAuthBackend),
    Http(HttpAuthBackend),
}

impl AuthBackend {
    /// Selects and builds the backend from deployment configuration.
    pub fn from_config(config: &AppConfig, store: Arc<dyn KvStore>) -> Result<Self> {
        if config.use_mock_api {
            debug!("using mock auth backend");
            Ok(Self::Mock(MockAuthBackend::new(store)))
        } else {
            debug!(base_url = %config.api_base_url, "using remote auth backend");
            Ok(Self::Http(HttpAuthBackend::new(&config.api_base_url)?))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Mock(_) => "mock",
            Self::Http(_) => "http",
        }
    }

    /// Authenticates an existing account. Validation short-circuits before
    /// any backend work: invalid email format, then empty password, then the
    /// backend's own account-not-found / wrong-password checks.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        validate_login(email, password)?;
        match self {
            Self::Mock(backend) => backend.login(email, password).await,
            Self::Http(backend) => backend.login(email, password).await,
        }
    }

    /// Registers a new account. Validation short-circuits in order:
    /// empty name, invalid email, weak password, then the backend's
    /// duplicate-email check.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        validate_signup(name, email, password)?;
        match self {
            Self::Mock(backend) => backend.register(name, email, password).await,
            Self::Http(backend) => backend.register(name, email, password).await,
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    !email.is_empty() && email.contains('@')
}

fn validate_login(email: &str, password: &str) -> Result<(), AuthError> {
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmailFormat);
    }
    if password.is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    Ok(())
}

fn validate_signup(name: &str, email: &str, password: &str) -> Result<(), AuthError> {
    if name.trim().is_empty() {
        return Err(AuthError::MissingField("name"));
    }
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmailFormat);
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::WeakPassword);
    }
    Ok(())
}
