//! Commands that can mutate session state.
//!
//! All session mutations go through the state machine's `apply()` method.
//! Passwords never appear here: the effect runner hands credentials straight
//! to the auth service and only the outcome flows back as a command.

use crate::session::Identity;
use serde_json::Value;

#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// User submitted the login form; transitions to Authenticating.
    SubmitLogin { email: String },
    /// User submitted the signup form; transitions to Authenticating.
    SubmitSignup { email: String },
    /// The auth service resolved with a fresh identity and token.
    AuthSucceeded { identity: Identity, token: String },
    /// The auth service rejected the request.
    AuthRejected { error: String },
    /// User signed out; clears identity and token.
    Logout,
    /// Clear the last error. Idempotent, valid in any phase.
    ClearError,
}

impl SessionCommand {
    /// Redacted representation for the event log. The bearer token in
    /// `AuthSucceeded` must not be written to disk, so only the user id is.
    pub fn summary(&self) -> Value {
        match self {
            SessionCommand::SubmitLogin { email } => {
                serde_json::json!({"name": "SubmitLogin", "email": email})
            }
            SessionCommand::SubmitSignup { email } => {
                serde_json::json!({"name": "SubmitSignup", "email": email})
            }
            SessionCommand::AuthSucceeded { identity, .. } => {
                serde_json::json!({"name": "AuthSucceeded", "user_id": identity.id})
            }
            SessionCommand::AuthRejected { error } => {
                serde_json::json!({"name": "AuthRejected", "error": error})
            }
            SessionCommand::Logout => serde_json::json!({"name": "Logout"}),
            SessionCommand::ClearError => serde_json::json!({"name": "ClearError"}),
        }
    }
}
