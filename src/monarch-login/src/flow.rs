//! Interactive login with optional multi-factor authentication.

use crate::client::{LoginCredentials, MonarchClient, Result};
use crate::error::ApiError;
use crate::token::SessionToken;

/// Drives a login that may need a second factor.
pub struct LoginFlow<'a> {
    client: &'a MonarchClient,
}

impl<'a> LoginFlow<'a> {
    pub fn new(client: &'a MonarchClient) -> Self {
        Self { client }
    }

    /// Log in, asking `mfa_code` for a code only if the API demands one.
    ///
    /// The callback runs at most once. Returning `None` from it aborts
    /// with [`ApiError::MfaRequired`].
    pub async fn authenticate<F>(
        &self,
        credentials: &LoginCredentials,
        mfa_code: F,
    ) -> Result<SessionToken>
    where
        F: FnOnce() -> Option<String>,
    {
        match self.client.login(credentials, None).await {
            Err(ApiError::MfaRequired) => {
                tracing::info!("Account requires a multi-factor code");
                let code = mfa_code()
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .ok_or(ApiError::MfaRequired)?;
                self.client.login(credentials, Some(&code)).await
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiConfig;
    use std::cell::Cell;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mfa_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .and(body_partial_json(serde_json::json!({"totp": "654321"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "tok-mfa"})),
            )
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(ResponseTemplate::new(403))
            .with_priority(5)
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_mfa_retry() {
        let server = mfa_server().await;
        let client = MonarchClient::new(ApiConfig::new(server.uri())).unwrap();
        let asked = Cell::new(0);

        let token = LoginFlow::new(&client)
            .authenticate(&LoginCredentials::new("a@b.c", "pw"), || {
                asked.set(asked.get() + 1);
                Some(" 654321 ".to_string())
            })
            .await
            .expect("login");

        assert_eq!(token.expose(), "tok-mfa");
        assert_eq!(asked.get(), 1);
    }

    #[tokio::test]
    async fn test_mfa_declined() {
        let server = mfa_server().await;
        let client = MonarchClient::new(ApiConfig::new(server.uri())).unwrap();

        let err = LoginFlow::new(&client)
            .authenticate(&LoginCredentials::new("a@b.c", "pw"), || None)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MfaRequired));
    }

    #[tokio::test]
    async fn test_no_mfa_prompt_when_not_needed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "plain"})),
            )
            .mount(&server)
            .await;
        let client = MonarchClient::new(ApiConfig::new(server.uri())).unwrap();

        let token = LoginFlow::new(&client)
            .authenticate(&LoginCredentials::new("a@b.c", "pw"), || {
                panic!("MFA prompt should not run")
            })
            .await
            .unwrap();
        assert_eq!(token.expose(), "plain");
    }
}
