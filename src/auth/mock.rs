//! Locally persisted mock auth backend.
//!
//! Stands in for the remote service when no backend is configured. Accounts
//! live in the injected key-value store under one JSON-encoded map keyed by
//! email (case-sensitive exact match), durable across process restarts.
//! Records are created by registration and never deleted or mutated.

use crate::auth::AuthSession;
use crate::errors::AuthError;
use crate::session::Identity;
use crate::storage::KvStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

const ACCOUNTS_KEY: &str = "accounts";

/// A registered account in the mock directory. The password is stored in the
/// clear; this backend is a development stand-in, not a credential vault.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct AccountRecord {
    id: String,
    name: String,
    email: String,
    password: String,
}

impl AccountRecord {
    fn identity(&self) -> Identity {
        Identity {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

pub struct MockAuthBackend {
    store: Arc<dyn KvStore>,
}

impl MockAuthBackend {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub(crate) async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let accounts = self.load_accounts()?;
        let account = accounts.get(email).ok_or(AuthError::AccountNotFound)?;
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(AuthSession {
            identity: account.identity(),
            token: mint_token(),
        })
    }

    pub(crate) async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let mut accounts = self.load_accounts()?;
        if accounts.contains_key(email) {
            return Err(AuthError::DuplicateEmail);
        }

        let record = AccountRecord {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let identity = record.identity();
        accounts.insert(email.to_string(), record);
        self.save_accounts(&accounts)?;

        Ok(AuthSession {
            identity,
            token: mint_token(),
        })
    }

    fn load_accounts(&self) -> Result<BTreeMap<String, AccountRecord>, AuthError> {
        let raw = self
            .store
            .get(ACCOUNTS_KEY)
            .map_err(|err| AuthError::Storage(err.to_string()))?;
        match raw {
            Some(json) => serde_json::from_str(&json)
                .map_err(|err| AuthError::Storage(format!("account table is corrupt: {}", err))),
            None => Ok(BTreeMap::new()),
        }
    }

    fn save_accounts(&self, accounts: &BTreeMap<String, AccountRecord>) -> Result<(), AuthError> {
        let json = serde_json::to_string(accounts)
            .map_err(|err| AuthError::Storage(err.to_string()))?;
        self.store
            .set(ACCOUNTS_KEY, &json)
            .map_err(|err| AuthError::Storage(err.to_string()))
    }
}

/// Mints a bearer token from the current time plus a random suffix.
///
/// The suffix guarantees tokens never collide within a process lifetime even
/// when two are minted in the same millisecond.
fn mint_token() -> String {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    let mut suffix = Uuid::new_v4().simple().to_string();
    suffix.truncate(8);
    format!("tok-{}-{}", timestamp, suffix)
}

#[cfg(test)]
#[path = "tests/mock_tests.rs"]
mod tests;
