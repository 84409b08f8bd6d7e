//! API errors and how they are classified.

use thiserror::Error;

/// Coarse failure category used to decide what the user should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Credentials or token were refused.
    Unauthorized,
    /// The API is throttling us; retry later.
    RateLimited,
    /// Anything else.
    Other,
}

/// Errors returned by [`crate::MonarchClient`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Multi-factor authentication code required")]
    MfaRequired,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Rate limited (429 Too Many Requests){}", retry_hint(.retry_after))]
    RateLimited { retry_after: Option<u64> },

    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    #[error("No session token configured")]
    MissingToken,

    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(seconds) => format!(", retry after {seconds} seconds"),
        None => String::new(),
    }
}

impl ApiError {
    /// Classify this error.
    ///
    /// Typed variants map directly; free text is matched the same way a
    /// human would read the message.
    pub fn kind(&self) -> FailureKind {
        self.kind_with(classify_message)
    }

    /// Classify an error returned by a fresh login.
    ///
    /// Same as [`ApiError::kind`] except that free text goes through
    /// [`classify_login_message`].
    pub fn login_kind(&self) -> FailureKind {
        self.kind_with(classify_login_message)
    }

    fn kind_with(&self, classify: fn(&str) -> FailureKind) -> FailureKind {
        match self {
            ApiError::Unauthorized(_) => FailureKind::Unauthorized,
            ApiError::RateLimited { .. } => FailureKind::RateLimited,
            ApiError::Http { status: 401, .. } => FailureKind::Unauthorized,
            ApiError::Http { status: 429, .. } => FailureKind::RateLimited,
            ApiError::MfaRequired | ApiError::MissingToken | ApiError::Timeout => {
                FailureKind::Other
            }
            other => classify(&other.to_string()),
        }
    }

    /// Short description of the error's Rust-side category for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            ApiError::MfaRequired => "MfaRequired",
            ApiError::Unauthorized(_) => "Unauthorized",
            ApiError::RateLimited { .. } => "RateLimited",
            ApiError::Http { .. } => "Http",
            ApiError::MissingToken => "MissingToken",
            ApiError::UnexpectedResponse(_) => "UnexpectedResponse",
            ApiError::GraphQl(_) => "GraphQl",
            ApiError::Timeout => "Timeout",
            ApiError::Request(_) => "Request",
            ApiError::Json(_) => "Json",
        }
    }
}

/// Classify a free-text error message.
///
/// Authentication markers are checked before rate-limit markers.
pub fn classify_message(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if ["401", "unauthorized", "authentication"]
        .iter()
        .any(|m| lower.contains(m))
    {
        FailureKind::Unauthorized
    } else if ["429", "rate limit", "too many requests"]
        .iter()
        .any(|m| lower.contains(m))
    {
        FailureKind::RateLimited
    } else {
        FailureKind::Other
    }
}

/// Classify a free-text error from a login attempt.
///
/// Rate-limit markers are checked first, and only `401` or `unauthorized`
/// mean the credentials were refused.
pub fn classify_login_message(message: &str) -> FailureKind {
    let lower = message.to_lowercase();
    if ["429", "rate limit", "too many requests"]
        .iter()
        .any(|m| lower.contains(m))
    {
        FailureKind::RateLimited
    } else if ["401", "unauthorized"].iter().any(|m| lower.contains(m)) {
        FailureKind::Unauthorized
    } else {
        FailureKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_message() {
        assert_eq!(
            classify_message("401 Client Error"),
            FailureKind::Unauthorized
        );
        assert_eq!(
            classify_message("Authentication credentials were not provided"),
            FailureKind::Unauthorized
        );
        assert_eq!(
            classify_message("Too Many Requests"),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_message("you hit a RATE LIMIT"),
            FailureKind::RateLimited
        );
        assert_eq!(classify_message("connection reset"), FailureKind::Other);
    }

    #[test]
    fn test_unauthorized_wins_over_rate_limit() {
        assert_eq!(
            classify_message("unauthorized after 429"),
            FailureKind::Unauthorized
        );
    }

    #[test]
    fn test_login_messages_check_rate_limit_first() {
        assert_eq!(
            classify_login_message("authentication rate limit exceeded"),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_login_message("unauthorized after 429"),
            FailureKind::RateLimited
        );
        assert_eq!(
            classify_login_message("Authentication service unavailable"),
            FailureKind::Other
        );
        assert_eq!(
            classify_login_message("401 Unauthorized"),
            FailureKind::Unauthorized
        );
    }

    #[test]
    fn test_login_kind_keeps_typed_variants() {
        assert_eq!(
            ApiError::Unauthorized("rate limit".into()).login_kind(),
            FailureKind::Unauthorized
        );
        assert_eq!(
            ApiError::Http {
                status: 400,
                body: "authentication rate limit exceeded".into()
            }
            .login_kind(),
            FailureKind::RateLimited
        );
        assert_eq!(
            ApiError::Http {
                status: 400,
                body: "authentication rate limit exceeded".into()
            }
            .kind(),
            FailureKind::Unauthorized
        );
    }

    #[test]
    fn test_typed_kinds() {
        assert_eq!(
            ApiError::Unauthorized("x".into()).kind(),
            FailureKind::Unauthorized
        );
        assert_eq!(
            ApiError::RateLimited { retry_after: None }.kind(),
            FailureKind::RateLimited
        );
        assert_eq!(
            ApiError::Http {
                status: 429,
                body: String::new()
            }
            .kind(),
            FailureKind::RateLimited
        );
        assert_eq!(
            ApiError::Http {
                status: 500,
                body: "boom".into()
            }
            .kind(),
            FailureKind::Other
        );
        assert_eq!(ApiError::MfaRequired.kind(), FailureKind::Other);
        assert_eq!(
            ApiError::GraphQl("Unauthorized".into()).kind(),
            FailureKind::Unauthorized
        );
    }

    #[test]
    fn test_rate_limited_display() {
        let err = ApiError::RateLimited {
            retry_after: Some(120),
        };
        assert_eq!(
            err.to_string(),
            "Rate limited (429 Too Many Requests), retry after 120 seconds"
        );
    }
}
