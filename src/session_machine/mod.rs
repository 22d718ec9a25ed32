//! Centralized state machine for the authentication session.
//!
//! This module is the ONLY place session transitions happen. The machine owns
//! the state, validates commands, emits events, and broadcasts snapshots to
//! observers via a watch channel. It is a pure transition core: the
//! asynchronous auth service call lives in the effect runner (`client`),
//! which feeds the outcome back in as a command.

mod commands;
mod events;
mod snapshot;

pub use commands::SessionCommand;
pub use events::{AuthRequestKind, SessionEvent};
pub use snapshot::SessionSnapshot;

use crate::session::{SessionPhase, SessionState};
use crate::structured_logger::StructuredLogger;
use anyhow::{bail, Result};
use std::sync::Arc;
use tokio::sync::watch;

/// The ONLY place session transitions happen.
pub struct SessionStateMachine {
    state: SessionState,
    snapshot_tx: watch::Sender<SessionSnapshot>,
    logger: Arc<StructuredLogger>,
    seq: u64,
}

impl SessionStateMachine {
    /// Creates a new machine with the given initial state.
    ///
    /// Returns the machine and a watch receiver for state snapshots; the
    /// view layer polls the receiver for updates.
    pub fn new(
        initial_state: SessionState,
        logger: Arc<StructuredLogger>,
    ) -> (Self, watch::Receiver<SessionSnapshot>) {
        let snapshot = SessionSnapshot::from(&initial_state);
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot);

        let machine = Self {
            state: initial_state,
            snapshot_tx,
            logger,
            seq: 0,
        };

        (machine, snapshot_rx)
    }

    /// All session mutations go through this single method.
    ///
    /// Returns the emitted events; broadcasts a fresh snapshot automatically.
    /// An `Err` means the command was rejected outright and the state did not
    /// change (for example a second submission while a request is in flight).
    pub fn apply(&mut self, command: SessionCommand) -> Result<Vec<SessionEvent>> {
        self.seq += 1;
        self.logger.log_command(self.seq, &command);

        let events = self.apply_internal(command)?;

        for event in &events {
            self.logger.log_event(self.seq, event);
        }

        let snapshot = SessionSnapshot::from(&self.state);
        let _ = self.snapshot_tx.send(snapshot);

        Ok(events)
    }

    fn apply_internal(&mut self, command: SessionCommand) -> Result<Vec<SessionEvent>> {
        use SessionCommand::*;

        match command {
            SubmitLogin { email } => self.start_auth(AuthRequestKind::Login, email),
            SubmitSignup { email } => self.start_auth(AuthRequestKind::Signup, email),

            AuthSucceeded { identity, token } => {
                if self.state.phase != SessionPhase::Authenticating {
                    bail!(
                        "AuthSucceeded is only valid while authenticating, not in {:?}",
                        self.state.phase
                    );
                }
                let event = SessionEvent::SignedIn {
                    user_id: identity.id.clone(),
                    email: identity.email.clone(),
                };
                self.state.phase = SessionPhase::SignedIn;
                self.state.identity = Some(identity);
                self.state.token = Some(token);
                self.state.request_in_flight = false;
                self.state.last_error = None;
                Ok(vec![event])
            }

            AuthRejected { error } => {
                if self.state.phase != SessionPhase::Authenticating {
                    bail!(
                        "AuthRejected is only valid while authenticating, not in {:?}",
                        self.state.phase
                    );
                }
                // Identity and token stay untouched: they were null going
                // into Authenticating and remain null.
                self.state.phase = SessionPhase::AuthFailed;
                self.state.request_in_flight = false;
                self.state.last_error = Some(error.clone());
                Ok(vec![SessionEvent::AuthRejected { error }])
            }

            Logout => {
                if self.state.phase != SessionPhase::SignedIn {
                    bail!("Cannot log out from phase {:?}", self.state.phase);
                }
                self.state.phase = SessionPhase::SignedOut;
                self.state.identity = None;
                self.state.token = None;
                self.state.last_error = None;
                Ok(vec![SessionEvent::SignedOut])
            }

            ClearError => {
                // Idempotent and valid from any phase; AuthFailed collapses
                // back to SignedOut once its error is gone.
                self.state.last_error = None;
                if self.state.phase == SessionPhase::AuthFailed {
                    self.state.phase = SessionPhase::SignedOut;
                }
                Ok(vec![SessionEvent::ErrorCleared])
            }
        }
    }

    fn start_auth(&mut self, kind: AuthRequestKind, email: String) -> Result<Vec<SessionEvent>> {
        if self.state.request_in_flight {
            bail!("an authentication request is already in flight");
        }
        match self.state.phase {
            SessionPhase::SignedOut | SessionPhase::AuthFailed => {}
            SessionPhase::SignedIn => bail!("already signed in; log out first"),
            SessionPhase::Authenticating => {
                bail!("an authentication request is already in flight")
            }
        }

        self.state.phase = SessionPhase::Authenticating;
        self.state.request_in_flight = true;
        self.state.last_error = None;
        Ok(vec![SessionEvent::AuthStarted { kind, email }])
    }

    /// Returns an immutable reference to current state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }
}
