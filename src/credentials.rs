//! Persisted credential record for the signed-in identity.
//!
//! The record is keyed separately for `user` (JSON-encoded [`Identity`]) and
//! `token` (raw string). Both keys are written on sign-in and removed on
//! logout; a record missing either half reads as signed out.

use crate::session::Identity;
use crate::storage::KvStore;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::warn;

const USER_KEY: &str = "user";
const TOKEN_KEY: &str = "token";

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KvStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Loads the persisted identity and token, if a complete record exists.
    ///
    /// A half-written or unparseable record is treated as absent rather than
    /// an error so a corrupt store never locks the user out of the client.
    pub fn load(&self) -> Result<Option<(Identity, String)>> {
        let user = self.store.get(USER_KEY)?;
        let token = self.store.get(TOKEN_KEY)?;

        match (user, token) {
            (Some(user_json), Some(token)) => match serde_json::from_str(&user_json) {
                Ok(identity) => Ok(Some((identity, token))),
                Err(err) => {
                    warn!(error = %err, "discarding unparseable persisted identity");
                    Ok(None)
                }
            },
            _ => Ok(None),
        }
    }

    /// Persists the credential record after a successful authentication.
    pub fn save(&self, identity: &Identity, token: &str) -> Result<()> {
        let user_json =
            serde_json::to_string(identity).context("Failed to serialize identity")?;
        self.store.set(USER_KEY, &user_json)?;
        self.store.set(TOKEN_KEY, token)?;
        Ok(())
    }

    /// Removes both halves of the record. Idempotent.
    pub fn clear(&self) -> Result<()> {
        self.store.remove(USER_KEY)?;
        self.store.remove(TOKEN_KEY)?;
        Ok(())
    }
}
