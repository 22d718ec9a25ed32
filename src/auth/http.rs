//! Remote HTTP auth backend.
//!
//! Wire contract: `POST {base}/auth/login {email, password}` and
//! `POST {base}/auth/register {name, email, password}`, both answering
//! `{user: Identity, token: string}`. Requests carry a 10-second timeout;
//! there is no retry here, resubmission is an explicit user action.

use crate::auth::AuthSession;
use crate::errors::AuthError;
use crate::session::Identity;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct AuthResponse {
    user: Identity,
    token: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

pub struct HttpAuthBackend {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthBackend {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(base_url: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub(crate) async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.post_auth(
            "/auth/login",
            &serde_json::json!({"email": email, "password": password}),
        )
        .await
    }

    pub(crate) async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        self.post_auth(
            "/auth/register",
            &serde_json::json!({"name": name, "email": email, "password": password}),
        )
        .await
    }

    async fn post_auth(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<AuthSession, AuthError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "posting auth request");

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| AuthError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let body: AuthResponse = response
                .json()
                .await
                .map_err(|err| AuthError::Network(format!("malformed auth response: {}", err)))?;
            return Ok(AuthSession {
                identity: body.user,
                token: body.token,
            });
        }

        // Known statuses map onto the shared taxonomy; anything else surfaces
        // the server's structured message when present, else a network error.
        let message = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .map(|body| body.message)
            .filter(|message| !message.is_empty());

        Err(match status.as_u16() {
            401 | 403 => AuthError::InvalidCredentials,
            404 => AuthError::AccountNotFound,
            409 => AuthError::DuplicateEmail,
            _ => match message {
                Some(message) => AuthError::Server(message),
                None => AuthError::Network(format!("server returned {}", status)),
            },
        })
    }
}
