//! Individual authentication checks and the sequence that runs them.

use monarch_keyring_store::SecretStore;
use monarch_login::{
    ApiError, FailureKind, LoginCredentials, MonarchClient, SessionToken, TokenVault,
};
use serde::Serialize;

use crate::report::DiagnosticReport;

/// Whether a session token is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TokenPresence {
    Present { length: usize, preview: String },
    Missing,
    /// The secret store itself could not be read.
    StoreError { message: String },
}

impl TokenPresence {
    pub fn is_present(&self) -> bool {
        matches!(self, TokenPresence::Present { .. })
    }
}

/// Result of a check that talks to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed {
        accounts: usize,
    },
    Failed {
        kind: FailureKind,
        error_type: String,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        hint: Option<String>,
    },
    /// Rate limited; the check could not reach a verdict.
    Indeterminate {
        message: String,
    },
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, CheckOutcome::Passed { .. })
    }

    fn from_error(err: &ApiError, kind: FailureKind, unauthorized_hint: &str) -> Self {
        tracing::debug!(?kind, error_type = err.type_name(), "Check failed");
        match kind {
            FailureKind::RateLimited => CheckOutcome::Indeterminate {
                message: err.to_string(),
            },
            FailureKind::Unauthorized => CheckOutcome::Failed {
                kind,
                error_type: err.type_name().to_string(),
                message: err.to_string(),
                hint: Some(unauthorized_hint.to_string()),
            },
            FailureKind::Other => CheckOutcome::Failed {
                kind,
                error_type: err.type_name().to_string(),
                message: err.to_string(),
                hint: match err {
                    ApiError::MfaRequired => Some(
                        "Account requires a multi-factor code; use the interactive login"
                            .to_string(),
                    ),
                    ApiError::UnexpectedResponse(_) => {
                        Some("API returned an unexpected format".to_string())
                    }
                    _ => None,
                },
            },
        }
    }
}

/// Whether the API host answers at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Connectivity {
    Reachable { status: u16 },
    Timeout,
    Unreachable { message: String },
    Failed { message: String },
}

/// Runs authentication diagnostics against a secret store and the API.
pub struct Doctor<S> {
    vault: TokenVault<S>,
    client: MonarchClient,
}

impl<S: SecretStore> Doctor<S> {
    pub fn new(vault: TokenVault<S>, client: MonarchClient) -> Self {
        Self { vault, client }
    }

    /// Look the token up without contacting the API.
    pub fn check_token_presence(&self) -> (TokenPresence, Option<SessionToken>) {
        match self.vault.load() {
            Ok(Some(token)) => (
                TokenPresence::Present {
                    length: token.len(),
                    preview: token.preview(),
                },
                Some(token),
            ),
            Ok(None) => (TokenPresence::Missing, None),
            Err(e) => {
                tracing::warn!(error = %e, "Secret store unavailable");
                (
                    TokenPresence::StoreError {
                        message: format!("{e:#}"),
                    },
                    None,
                )
            }
        }
    }

    /// Use the token for a real accounts query.
    pub async fn check_token_validity(&self, token: &SessionToken) -> CheckOutcome {
        let client = self.client.clone().with_token(token.clone());
        match client.get_accounts().await {
            Ok(summary) => CheckOutcome::Passed {
                accounts: summary.count,
            },
            Err(e) => CheckOutcome::from_error(&e, e.kind(), "Token is expired or invalid"),
        }
    }

    /// Log in from scratch, bypassing the stored token, then query accounts.
    pub async fn check_fresh_login(&self, credentials: &LoginCredentials) -> CheckOutcome {
        let token = match self.client.login(credentials, None).await {
            Ok(token) => token,
            Err(e) => {
                return CheckOutcome::from_error(&e, e.login_kind(), "Check your credentials");
            }
        };
        self.check_token_validity(&token).await
    }

    /// Probe the API base URL.
    pub async fn check_connectivity(&self) -> Connectivity {
        match self.client.probe(self.client.base_url()).await {
            Ok(status) => Connectivity::Reachable { status },
            Err(ApiError::Timeout) => Connectivity::Timeout,
            Err(ApiError::Request(e)) if e.is_connect() => Connectivity::Unreachable {
                message: e.to_string(),
            },
            Err(e) => Connectivity::Failed {
                message: e.to_string(),
            },
        }
    }

    /// Run every check in order.
    ///
    /// Without a stored token the sequence stops after an optional fresh
    /// login; `prompt` is only called when the store answered and had no
    /// token. An unreadable store stops the sequence without prompting.
    pub async fn run<F>(&self, prompt: F) -> DiagnosticReport
    where
        F: FnOnce() -> Option<LoginCredentials>,
    {
        let (presence, token) = self.check_token_presence();
        let backend = self.vault.backend_name();

        let Some(token) = token else {
            let credentials = match presence {
                TokenPresence::Missing => prompt(),
                _ => None,
            };
            let fresh_login = match credentials {
                Some(credentials) => Some(self.check_fresh_login(&credentials).await),
                None => None,
            };
            return DiagnosticReport::new(backend, presence, None, fresh_login, None);
        };

        let validity = self.check_token_validity(&token).await;
        let connectivity = self.check_connectivity().await;

        DiagnosticReport::new(
            backend,
            presence,
            Some(validity),
            None,
            Some(connectivity),
        )
    }
}
