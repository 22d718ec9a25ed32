//! Session state owned by the session state machine.

use serde::{Deserialize, Serialize};

/// The authenticated user's public profile record.
///
/// Issued by the auth service and immutable afterwards; destroyed on logout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Authentication lifecycle phase.
///
/// `AuthFailed` is transient: it keeps the rejection message visible until
/// the caller clears it, at which point the session collapses back to
/// `SignedOut`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    SignedOut,
    Authenticating,
    SignedIn,
    AuthFailed,
}

/// Live authentication status of the running client.
///
/// Exactly one of these exists per client. Invariant: `token` and `identity`
/// are either both present (SignedIn) or both absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub token: Option<String>,
    pub request_in_flight: bool,
    pub last_error: Option<String>,
}

impl SessionState {
    pub fn signed_out() -> Self {
        Self {
            phase: SessionPhase::SignedOut,
            identity: None,
            token: None,
            request_in_flight: false,
            last_error: None,
        }
    }

    /// Builds the startup state from the persisted credential record, if any.
    pub fn from_credentials(record: Option<(Identity, String)>) -> Self {
        match record {
            Some((identity, token)) => Self {
                phase: SessionPhase::SignedIn,
                identity: Some(identity),
                token: Some(token),
                request_in_flight: false,
                last_error: None,
            },
            None => Self::signed_out(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.phase == SessionPhase::SignedIn
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
