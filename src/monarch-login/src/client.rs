//! Monarch HTTP API client.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::Serialize;

use crate::config::Settings;
use crate::constants::{CLIENT_PLATFORM, GRAPHQL_PATH, LOGIN_PATH, PROBE_TIMEOUT_SECS, USER_AGENT};
use crate::error::{ApiError, FailureKind, classify_message};
use crate::token::SessionToken;

/// Minimal accounts query used to prove that a token works.
const ACCOUNTS_QUERY: &str = "query GetAccounts {\n  accounts {\n    id\n    displayName\n  }\n}";

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Connection settings for [`MonarchClient`].
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(crate::constants::DEFAULT_HTTP_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
        }
    }
}

impl From<&Settings> for ApiConfig {
    fn from(settings: &Settings) -> Self {
        let mut config = Self::new(&settings.api_url);
        config.timeout = settings.http_timeout;
        config
    }
}

/// Email/password pair for a fresh login.
#[derive(Clone)]
pub struct LoginCredentials {
    pub email: String,
    pub password: secrecy::SecretString,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: secrecy::SecretString::from(password.into()),
        }
    }
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
    supports_mfa: bool,
    trusted_device: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    totp: Option<&'a str>,
}

#[derive(Serialize)]
struct GraphQlRequest<'a> {
    #[serde(rename = "operationName")]
    operation_name: &'a str,
    query: &'a str,
    variables: serde_json::Value,
}

/// Outcome of a successful accounts query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountsSummary {
    pub count: usize,
}

/// Client for the Monarch API.
#[derive(Clone)]
pub struct MonarchClient {
    client: reqwest::Client,
    config: ApiConfig,
    token: Option<SessionToken>,
}

impl MonarchClient {
    /// Create a client without a session token.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            client,
            config,
            token: None,
        })
    }

    /// Use the given session token for authenticated calls.
    pub fn with_token(mut self, token: SessionToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Log in with email and password, optionally with an MFA code.
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
        mfa_code: Option<&str>,
    ) -> Result<SessionToken> {
        use secrecy::ExposeSecret;

        let body = LoginBody {
            username: &credentials.email,
            password: credentials.password.expose_secret(),
            supports_mfa: true,
            trusted_device: false,
            totp: mfa_code,
        };

        tracing::debug!(with_mfa = mfa_code.is_some(), "Sending login request");
        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .header("Client-Platform", CLIENT_PLATFORM)
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(ApiError::MfaRequired);
        }
        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let json = read_json(response).await?;
        match json.get("token").and_then(|t| t.as_str()) {
            Some(token) if !token.is_empty() => {
                tracing::info!("Login succeeded");
                Ok(SessionToken::new(token))
            }
            _ => Err(ApiError::UnexpectedResponse(
                "login response has no token".to_string(),
            )),
        }
    }

    /// Fetch the account list and report how many accounts came back.
    pub async fn get_accounts(&self) -> Result<AccountsSummary> {
        let token = self.token.as_ref().ok_or(ApiError::MissingToken)?;

        let request = GraphQlRequest {
            operation_name: "GetAccounts",
            query: ACCOUNTS_QUERY,
            variables: serde_json::json!({}),
        };

        let response = self
            .client
            .post(self.url(GRAPHQL_PATH))
            .header("Client-Platform", CLIENT_PLATFORM)
            .header("Authorization", format!("Token {}", token.expose()))
            .json(&request)
            .send()
            .await
            .map_err(map_transport)?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let json = read_json(response).await?;
        parse_accounts(&json)
    }

    /// Send a bare GET to `url` and return the status code.
    ///
    /// Any HTTP status means the endpoint is reachable.
    pub async fn probe(&self, url: &str) -> Result<u16> {
        let response = self
            .client
            .get(url)
            .timeout(Duration::from_secs(PROBE_TIMEOUT_SECS))
            .send()
            .await
            .map_err(map_transport)?;
        Ok(response.status().as_u16())
    }
}

fn map_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Request(err)
    }
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    tracing::debug!(status = status.as_u16(), "API request failed");

    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized(if body.is_empty() {
            "401 Unauthorized".to_string()
        } else {
            body
        }),
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { retry_after },
        _ => ApiError::Http {
            status: status.as_u16(),
            body,
        },
    }
}

/// Read a successful response body as JSON. A body that is not JSON is an
/// unexpected response, not a transport failure.
async fn read_json(response: Response) -> Result<serde_json::Value> {
    let body = response.text().await.map_err(map_transport)?;
    serde_json::from_str(&body)
        .map_err(|e| ApiError::UnexpectedResponse(format!("response is not JSON: {e}")))
}

fn parse_accounts(json: &serde_json::Value) -> Result<AccountsSummary> {
    let errors = json
        .get("errors")
        .and_then(|e| e.as_array())
        .filter(|e| !e.is_empty());
    if let Some(errors) = errors {
        let message = errors
            .iter()
            .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
            .collect::<Vec<_>>()
            .join("; ");
        return Err(match classify_message(&message) {
            FailureKind::Unauthorized => ApiError::Unauthorized(message),
            FailureKind::RateLimited => ApiError::RateLimited { retry_after: None },
            FailureKind::Other => ApiError::GraphQl(message),
        });
    }

    json.get("data")
        .and_then(|d| d.get("accounts"))
        .and_then(|a| a.as_array())
        .map(|accounts| AccountsSummary {
            count: accounts.len(),
        })
        .ok_or_else(|| ApiError::UnexpectedResponse("missing data.accounts".to_string()))
}
