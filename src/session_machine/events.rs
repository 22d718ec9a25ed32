//! Events emitted by the session state machine after processing commands.
//!
//! These are for logging and notification purposes only; observers get state
//! updates via the watch channel's SessionSnapshot.

use serde::Serialize;

/// Which kind of auth submission started a request.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthRequestKind {
    Login,
    Signup,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// An auth request went in flight.
    AuthStarted { kind: AuthRequestKind, email: String },
    /// Authentication succeeded and the session is now SignedIn.
    SignedIn { user_id: String, email: String },
    /// Authentication failed; the session holds the error until cleared.
    AuthRejected { error: String },
    /// The session was torn down.
    SignedOut,
    /// The last error was cleared.
    ErrorCleared,
}
