//! Error types for the client domain.
//!
//! Every variant here is recoverable: auth and subscription failures are
//! surfaced to the user as messages attached to session state, never
//! propagated as process-fatal errors. Infrastructure failures (I/O,
//! serialization) travel as `anyhow::Error` with context instead.

use thiserror::Error;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Failures produced by the auth service, for either backend.
///
/// The mock directory and the remote HTTP backend both normalize into this
/// taxonomy so the session machine never branches on which one is active.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("enter a valid email address")]
    InvalidEmailFormat,
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,
    #[error("this email is already registered")]
    DuplicateEmail,
    #[error("no account found for this email")]
    AccountNotFound,
    #[error("invalid email or password")]
    InvalidCredentials,
    /// Remote backend unreachable, timed out, or replied non-2xx without a
    /// structured message.
    #[error("network error: {0}")]
    Network(String),
    /// Remote backend rejected the request with a structured message that
    /// does not map onto a more specific variant.
    #[error("{0}")]
    Server(String),
    /// The mock directory's backing store failed.
    #[error("credential storage error: {0}")]
    Storage(String),
}

/// Failures produced by subscription quota accounting.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    #[error("no analyses remaining on the current plan; upgrade to continue")]
    QuotaExceeded,
    #[error("unknown plan: {0}")]
    InvalidPlan(String),
}

/// Failures on the analysis trigger path.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("sign in before requesting an analysis")]
    NotSignedIn,
    #[error(transparent)]
    Quota(#[from] SubscriptionError),
    /// The analysis collaborator itself failed, after quota was consumed.
    #[error("analysis failed: {0}")]
    Failed(#[from] anyhow::Error),
}

/// Upload rejected before it reaches the analysis trigger.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("unsupported image format; accepted formats are JPEG, PNG, GIF, and WEBP")]
    UnsupportedFormat,
    #[error("image is {size} bytes; the maximum is {max}")]
    TooLarge { size: u64, max: u64 },
}
