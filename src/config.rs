//! Environment-level client configuration.
//!
//! Two knobs select the auth/analysis backend, mirroring the deployment
//! contract of the hosted service:
//! - `API_BASE_URL` - remote backend target (default `http://localhost:5000/api`)
//! - `USE_MOCK_API` - force the locally persisted mock backend on or off
//!
//! When `USE_MOCK_API` is unset, the mock backend is selected only if
//! `API_BASE_URL` is also unset, so a bare install works offline while an
//! explicitly configured deployment talks to its server.

use std::env;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL for the remote backend, without a trailing slash.
    pub api_base_url: String,
    /// When true, the locally persisted mock directory stands in for the
    /// remote backend.
    pub use_mock_api: bool,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Self {
        let base_override = env::var("API_BASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());

        let use_mock_api = match env::var("USE_MOCK_API") {
            Ok(value) => parse_bool(&value),
            Err(_) => base_override.is_none(),
        };

        let api_base_url = base_override
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Self {
            api_base_url,
            use_mock_api,
        }
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var("API_BASE_URL");
        env::remove_var("USE_MOCK_API");
    }

    #[test]
    #[serial]
    fn defaults_to_mock_when_nothing_is_configured() {
        clear_env();
        let config = AppConfig::from_env();
        assert!(config.use_mock_api);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    #[serial]
    fn base_url_selects_the_remote_backend() {
        clear_env();
        env::set_var("API_BASE_URL", "https://api.example.com/v1/");
        let config = AppConfig::from_env();
        assert!(!config.use_mock_api);
        // Trailing slash is stripped so path joins stay predictable.
        assert_eq!(config.api_base_url, "https://api.example.com/v1");
        clear_env();
    }

    #[test]
    #[serial]
    fn explicit_mock_flag_wins_over_base_url() {
        clear_env();
        env::set_var("API_BASE_URL", "https://api.example.com");
        env::set_var("USE_MOCK_API", "true");
        let config = AppConfig::from_env();
        assert!(config.use_mock_api);
        clear_env();
    }

    #[test]
    #[serial]
    fn unrecognized_flag_values_read_as_false() {
        clear_env();
        env::set_var("USE_MOCK_API", "definitely");
        let config = AppConfig::from_env();
        assert!(!config.use_mock_api);
        clear_env();
    }
}
