//! Diagnostic report, findings and the recommended next step.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::checks::{CheckOutcome, Connectivity, TokenPresence};

/// How long a rate limit typically lasts, in minutes.
pub const RATE_LIMIT_WAIT_MINUTES: (u32, u32) = (30, 60);

/// Usual reasons a stored token stops working.
pub const POSSIBLE_CAUSES: &[&str] = &[
    "Token expiration (most likely if a token exists but is refused)",
    "Rate limiting from too many API attempts",
    "API and web authentication differ",
    "Token format changes in the Monarch API",
];

/// What the user should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// No token stored: log in.
    Login,
    /// Fresh login works but nothing is stored: log in to save a session.
    SaveSession,
    /// Rate limited: wait, then log in.
    WaitThenLogin,
    /// Fresh login was refused: fix the credentials.
    CheckCredentials,
    /// Stored token is refused: log in again.
    Relogin,
    /// The secret store could not be read.
    CheckKeyring,
    /// Authentication works; the problem is elsewhere.
    InspectCallers,
}

impl Recommendation {
    pub fn message(&self) -> String {
        let (lo, hi) = RATE_LIMIT_WAIT_MINUTES;
        match self {
            Recommendation::Login => "Run: monarch-auth login".to_string(),
            Recommendation::SaveSession => {
                "Fresh login works - run: monarch-auth login to save the session".to_string()
            }
            Recommendation::WaitThenLogin => {
                format!("Rate limited - wait {lo}-{hi} minutes, then run: monarch-auth login")
            }
            Recommendation::CheckCredentials => {
                "Fresh login failed - check your credentials, then run: monarch-auth login"
                    .to_string()
            }
            Recommendation::Relogin => "Token expired - run: monarch-auth login".to_string(),
            Recommendation::CheckKeyring => {
                "Secret store unavailable - unlock or install an OS keyring, then retry"
                    .to_string()
            }
            Recommendation::InspectCallers => {
                "Token is valid - check the scripts calling the API for other issues".to_string()
            }
        }
    }
}

/// Everything one `diagnose` run learned.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub checked_at: DateTime<Local>,
    pub backend: String,
    pub presence: TokenPresence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<CheckOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fresh_login: Option<CheckOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connectivity: Option<Connectivity>,
    pub healthy: bool,
    pub findings: Vec<String>,
    pub recommendation: Recommendation,
}

impl DiagnosticReport {
    pub fn new(
        backend: impl Into<String>,
        presence: TokenPresence,
        validity: Option<CheckOutcome>,
        fresh_login: Option<CheckOutcome>,
        connectivity: Option<Connectivity>,
    ) -> Self {
        let recommendation = recommend(&presence, validity.as_ref(), fresh_login.as_ref());
        let findings = findings(
            &presence,
            validity.as_ref(),
            fresh_login.as_ref(),
            connectivity.as_ref(),
        );
        let healthy = presence.is_present() && validity.as_ref().is_some_and(|v| v.passed());

        Self {
            checked_at: Local::now(),
            backend: backend.into(),
            presence,
            validity,
            fresh_login,
            connectivity,
            healthy,
            findings,
            recommendation,
        }
    }

    /// One-line verdict on the stored token, if it was checked.
    pub fn conclusion(&self) -> Option<&'static str> {
        self.validity.as_ref().map(|v| match v {
            CheckOutcome::Passed { .. } => "Token is valid and working",
            CheckOutcome::Failed { .. } => "Token is expired or invalid",
            CheckOutcome::Indeterminate { .. } => "Rate limited - cannot determine token validity",
        })
    }
}

fn recommend(
    presence: &TokenPresence,
    validity: Option<&CheckOutcome>,
    fresh_login: Option<&CheckOutcome>,
) -> Recommendation {
    match presence {
        TokenPresence::StoreError { .. } => Recommendation::CheckKeyring,
        TokenPresence::Missing => match fresh_login {
            None => Recommendation::Login,
            Some(CheckOutcome::Passed { .. }) => Recommendation::SaveSession,
            Some(CheckOutcome::Indeterminate { .. }) => Recommendation::WaitThenLogin,
            Some(CheckOutcome::Failed { .. }) => Recommendation::CheckCredentials,
        },
        TokenPresence::Present { .. } => match validity {
            Some(CheckOutcome::Passed { .. }) => Recommendation::InspectCallers,
            Some(CheckOutcome::Indeterminate { .. }) => Recommendation::WaitThenLogin,
            Some(CheckOutcome::Failed { .. }) | None => Recommendation::Relogin,
        },
    }
}

fn findings(
    presence: &TokenPresence,
    validity: Option<&CheckOutcome>,
    fresh_login: Option<&CheckOutcome>,
    connectivity: Option<&Connectivity>,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();

    match presence {
        TokenPresence::Missing => out.push("No token stored - need initial authentication".into()),
        TokenPresence::StoreError { message } => {
            out.push(format!("Secret store could not be read: {message}"))
        }
        TokenPresence::Present { .. } => match validity {
            Some(CheckOutcome::Passed { .. }) => {
                out.push("Token exists and is valid".into());
                out.push("Authentication should work".into());
            }
            Some(CheckOutcome::Failed { .. }) => {
                out.push("Token exists but is expired/invalid".into());
                out.push("Need to re-authenticate".into());
            }
            Some(CheckOutcome::Indeterminate { .. }) => {
                out.push("Token exists but rate limited".into());
                out.push("Wait before retrying".into());
            }
            None => {}
        },
    }

    // A working fresh login rules out the usual account-side causes.
    if fresh_login.is_some_and(|f| f.passed()) {
        out.push("Fresh login works, so the credentials are correct".into());
        out.push("Account is not locked".into());
        out.push("Network connectivity to the API is fine".into());
    }

    match connectivity {
        Some(Connectivity::Reachable { status }) => {
            out.push(format!("API endpoint reachable (status {status})"))
        }
        Some(Connectivity::Timeout) => out.push("API endpoint timed out - network issue?".into()),
        Some(Connectivity::Unreachable { .. }) => {
            out.push("Cannot connect to API - network issue?".into())
        }
        Some(Connectivity::Failed { message }) => {
            out.push(format!("API connectivity check failed: {message}"))
        }
        None => {}
    }

    out
}
