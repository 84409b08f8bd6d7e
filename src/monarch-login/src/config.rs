//! Environment-driven configuration.
//!
//! Values come from the process environment, after the local `.env` file
//! (which must stay out of version control) has been merged in by
//! [`load_dotenv`]. Passwords are never read from here.

use std::time::Duration;

use monarch_keyring_store::DEFAULT_SERVICE;

use crate::constants::{
    API_URL_ENV_VAR, DEFAULT_API_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_TOKEN_ACCOUNT,
    EMAIL_ENV_VAR, HTTP_TIMEOUT_ENV_VAR, KEYRING_ACCOUNT_ENV_VAR, KEYRING_SERVICE_ENV_VAR,
};

/// Resolved settings for the API client and token storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// API base URL without trailing slash.
    pub api_url: String,
    /// Keyring service name.
    pub keyring_service: String,
    /// Keyring account the token is stored under.
    pub keyring_account: String,
    /// Email to pre-fill interactive prompts with.
    pub email: Option<String>,
    /// Request timeout for API calls.
    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            keyring_service: DEFAULT_SERVICE.to_string(),
            keyring_account: DEFAULT_TOKEN_ACCOUNT.to_string(),
            email: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let http_timeout = match get(HTTP_TIMEOUT_ENV_VAR) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "Ignoring invalid {}; using {}s",
                        HTTP_TIMEOUT_ENV_VAR,
                        DEFAULT_HTTP_TIMEOUT_SECS
                    );
                    defaults.http_timeout
                }
            },
            None => defaults.http_timeout,
        };

        Self {
            api_url: get(API_URL_ENV_VAR)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_url),
            keyring_service: get(KEYRING_SERVICE_ENV_VAR).unwrap_or(defaults.keyring_service),
            keyring_account: get(KEYRING_ACCOUNT_ENV_VAR).unwrap_or(defaults.keyring_account),
            email: get(EMAIL_ENV_VAR),
            http_timeout,
        }
    }
}

/// Merge the local `.env` file into the process environment.
///
/// Returns whether a file was found. Existing variables win over the file.
pub fn load_dotenv() -> bool {
    match dotenvy::dotenv() {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "Loaded environment file");
            true
        }
        Err(e) if e.not_found() => false,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse environment file");
            false
        }
    }
}
