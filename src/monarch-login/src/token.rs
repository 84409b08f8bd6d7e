//! Session token handling and keyring persistence.

use anyhow::{Context, Result};
use monarch_keyring_store::SecretStore;
use secrecy::{ExposeSecret, SecretString};

use crate::constants::DEFAULT_TOKEN_ACCOUNT;

/// Characters shown at the start of a token preview.
const PREVIEW_HEAD: usize = 20;
/// Characters shown at the end of a token preview.
const PREVIEW_TAIL: usize = 10;

/// An opaque API session token, protected in memory.
#[derive(Clone)]
pub struct SessionToken(SecretString);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// Expose the raw token (use sparingly).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Token length in characters.
    pub fn len(&self) -> usize {
        self.expose().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    /// Masked preview: the first 20 and last 10 characters.
    ///
    /// Tokens too short for the two ends to stay disjoint preview as `***`.
    pub fn preview(&self) -> String {
        let chars: Vec<char> = self.expose().chars().collect();
        if chars.len() <= PREVIEW_HEAD + PREVIEW_TAIL {
            return "***".to_string();
        }
        let head: String = chars[..PREVIEW_HEAD].iter().collect();
        let tail: String = chars[chars.len() - PREVIEW_TAIL..].iter().collect();
        format!("{head}...{tail}")
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionToken")
            .field(&format_args!("[REDACTED; {} chars]", self.len()))
            .finish()
    }
}

/// Reads and writes the session token through a [`SecretStore`].
pub struct TokenVault<S> {
    store: S,
    account: String,
}

impl<S: SecretStore> TokenVault<S> {
    /// Vault using the default token account.
    pub fn new(store: S) -> Self {
        Self::with_account(store, DEFAULT_TOKEN_ACCOUNT)
    }

    pub fn with_account(store: S, account: impl Into<String>) -> Self {
        Self {
            store,
            account: account.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Load the stored token. An empty stored value counts as no token.
    pub fn load(&self) -> Result<Option<SessionToken>> {
        let value = self
            .store
            .get(&self.account)
            .with_context(|| format!("Failed to read '{}' from secret store", self.account))?;

        match value {
            Some(token) if !token.trim().is_empty() => {
                tracing::debug!(account = %self.account, "Loaded session token");
                Ok(Some(SessionToken::new(token.trim())))
            }
            Some(_) => {
                tracing::debug!(account = %self.account, "Stored session token is empty");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Persist a token, replacing any previous one.
    pub fn save(&self, token: &SessionToken) -> Result<()> {
        self.store
            .set(&self.account, token.expose())
            .with_context(|| format!("Failed to save '{}' to secret store", self.account))?;
        tracing::info!(
            account = %self.account,
            backend = self.store.backend_name(),
            "Session token saved"
        );
        Ok(())
    }

    /// Remove the stored token. Returns whether one existed.
    pub fn clear(&self) -> Result<bool> {
        self.store
            .delete(&self.account)
            .with_context(|| format!("Failed to delete '{}' from secret store", self.account))
    }
}
