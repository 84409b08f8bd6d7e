//! Keyring-based secret storage for monarch-auth.
//!
//! Secrets are kept in OS-native credential stores, never in files:
//! - Windows: Credential Manager
//! - macOS: Keychain
//! - Linux: Secret Service / kernel keyutils
//!
//! The [`SecretStore`] trait lets callers swap the OS keyring for the
//! process-local [`MemoryStore`] in tests and dry runs.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

/// Default service name for keyring entries.
pub const DEFAULT_SERVICE: &str = "com.mcp.monarch-mcp-server";

/// Errors that can occur during keyring operations.
#[derive(Error, Debug)]
pub enum KeyringError {
    /// Failed to access the keyring.
    #[error("Failed to access keyring: {0}")]
    AccessDenied(String),

    /// No entry found for the specified key.
    #[error("No entry found for key: {0}")]
    NotFound(String),

    /// Failed to store the secret.
    #[error("Failed to store secret: {0}")]
    StoreFailed(String),

    /// Failed to delete the secret.
    #[error("Failed to delete secret: {0}")]
    DeleteFailed(String),

    /// Platform not supported.
    #[error("Keyring not supported on this platform")]
    NotSupported,

    /// Internal keyring error.
    #[error("Keyring error: {0}")]
    Internal(String),
}

impl From<keyring::Error> for KeyringError {
    fn from(err: keyring::Error) -> Self {
        match err {
            keyring::Error::NoEntry => KeyringError::NotFound("Entry not found".to_string()),
            keyring::Error::NoStorageAccess(_) => {
                KeyringError::AccessDenied("Cannot access keyring storage".to_string())
            }
            keyring::Error::PlatformFailure(_) => {
                KeyringError::Internal("Platform-specific keyring failure".to_string())
            }
            _ => KeyringError::Internal(err.to_string()),
        }
    }
}

/// Result type for keyring operations.
pub type Result<T> = std::result::Result<T, KeyringError>;

/// Opaque key/value secret storage.
///
/// A missing key is `Ok(None)` from [`SecretStore::get`] and `Ok(false)`
/// from [`SecretStore::delete`], never an error.
pub trait SecretStore: Send + Sync {
    /// Retrieve a secret.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a secret, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a secret. Returns whether anything was removed.
    fn delete(&self, key: &str) -> Result<bool>;

    /// Check if a secret exists.
    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Human-readable backend name for diagnostics.
    fn backend_name(&self) -> &'static str;
}

/// Keyring store backed by the OS credential manager.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    /// Create a new keyring store with the default service name.
    pub fn new() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
        }
    }

    /// Create a new keyring store with a custom service name.
    pub fn with_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Service name entries are filed under.
    pub fn service(&self) -> &str {
        &self.service
    }

    fn get_entry(&self, key: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key).map_err(KeyringError::from)
    }
}

impl Default for KeyringStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for KeyringStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = self.get_entry(key)?;
        match entry.get_password() {
            Ok(value) => {
                debug!(service = %self.service, key, "Retrieved secret from keyring");
                Ok(Some(value))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(KeyringError::from(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let entry = self.get_entry(key)?;
        entry.set_password(value).map_err(|e| {
            warn!("Failed to store secret for key '{}': {}", key, e);
            KeyringError::StoreFailed(e.to_string())
        })?;
        debug!(service = %self.service, key, "Stored secret in keyring");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let entry = self.get_entry(key)?;
        match entry.delete_credential() {
            Ok(()) => {
                debug!(service = %self.service, key, "Deleted secret from keyring");
                Ok(true)
            }
            Err(keyring::Error::NoEntry) => Ok(false),
            Err(e) => Err(KeyringError::DeleteFailed(e.to_string())),
        }
    }

    fn backend_name(&self) -> &'static str {
        "os-keyring"
    }
}

/// In-process secret store. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.lock().insert(key.into(), value.into());
        store
    }
}

impl SecretStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries.lock().remove(key).is_some())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

impl<T: SecretStore + ?Sized> SecretStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        (**self).delete(key)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        (**self).exists(key)
    }

    fn backend_name(&self) -> &'static str {
        (**self).backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_missing_key() {
        let store = MemoryStore::new();
        assert!(matches!(store.get("nope"), Ok(None)));
        assert!(!store.exists("nope").unwrap());
        assert!(!store.delete("nope").unwrap());
    }

    #[test]
    fn test_memory_store_overwrite_and_delete() {
        let store = MemoryStore::with_entry("k", "first");
        store.set("k", "second").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("second"));

        assert!(store.delete("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_boxed_store_delegates() {
        let store: Box<dyn SecretStore> = Box::new(MemoryStore::with_entry("a", "b"));
        assert!(store.exists("a").unwrap());
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_keyring_store_service() {
        assert_eq!(KeyringStore::new().service(), DEFAULT_SERVICE);
        assert_eq!(KeyringStore::with_service("x").service(), "x");
    }

    // Note: These tests require a working keyring on the system.
    // They are marked as ignored by default to avoid CI failures.

    #[test]
    #[ignore]
    fn test_store_and_retrieve() {
        let store = KeyringStore::with_service("monarch-auth-test");
        let key = "test-key";
        let value = "test-value-12345";

        store.set(key, value).expect("Failed to store");

        let retrieved = store.get(key).expect("Failed to get");
        assert_eq!(retrieved, Some(value.to_string()));

        let deleted = store.delete(key).expect("Failed to delete");
        assert!(deleted);

        let after_delete = store.get(key).expect("Failed to get after delete");
        assert!(after_delete.is_none());
    }

    #[test]
    #[ignore]
    fn test_not_found() {
        let store = KeyringStore::with_service("monarch-auth-test");
        let result = store.get("nonexistent-key-12345");
        assert!(matches!(result, Ok(None)));
    }
}
