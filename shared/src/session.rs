//! Bearer token persistence contract
//!
//! The token lives in a key-value store under [`TOKEN_KEY`]. Native builds
//! persist it to disk, the browser build uses `localStorage`.

use std::sync::RwLock;

use thiserror::Error;

/// Key the bearer token is stored under
pub const TOKEN_KEY: &str = "access_token";

/// Token storage failure
#[derive(Debug, Error)]
#[error("Token storage error: {0}")]
pub struct StorageError(pub String);

/// Storage for the session bearer token
pub trait TokenStore: Send + Sync {
    /// The stored token, if any. Unreadable storage counts as "no token".
    fn load(&self) -> Option<String>;

    fn store(&self, token: &str) -> Result<(), StorageError>;

    fn clear(&self) -> Result<(), StorageError>;
}

/// Process-local token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.read().ok().and_then(|t| t.clone())
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| StorageError("token lock poisoned".to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| StorageError("token lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTokenStore::new();
        assert!(store.load().is_none());

        store.store("abc").unwrap();
        assert_eq!(store.load().as_deref(), Some("abc"));

        store.clear().unwrap();
        assert!(store.load().is_none());
    }
}
