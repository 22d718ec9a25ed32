//! Read-only snapshot of session state for observers.
//!
//! The CLI (or any other view layer) never mutates this; it receives new
//! snapshots via the watch channel.

use crate::session::{Identity, SessionPhase, SessionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub identity: Option<Identity>,
    pub request_in_flight: bool,
    pub last_error: Option<String>,
}

impl From<&SessionState> for SessionSnapshot {
    fn from(state: &SessionState) -> Self {
        // The token is deliberately absent: observers render identity and
        // status, never the raw credential.
        Self {
            phase: state.phase,
            identity: state.identity.clone(),
            request_in_flight: state.request_in_flight,
            last_error: state.last_error.clone(),
        }
    }
}
