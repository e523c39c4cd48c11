//! On-disk key-value storage for the session token
//!
//! Mirrors browser `localStorage`: a flat JSON object of string keys and
//! values, with the bearer token under [`shared::TOKEN_KEY`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shared::{StorageError, TokenStore, TOKEN_KEY};

/// JSON file backed token store
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StorageError(format!("corrupt session file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError(e.to_string())),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StorageError(e.to_string()))?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| StorageError(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| StorageError(e.to_string()))
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        match self.read_entries() {
            Ok(mut entries) => entries.remove(TOKEN_KEY).filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring unreadable session: {}", e);
                None
            }
        }
    }

    fn store(&self, token: &str) -> Result<(), StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError("session lock poisoned".to_string()))?;
        // A corrupt file is replaced rather than blocking sign-in
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_string(), token.to_string());
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<(), StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError("session lock poisoned".to_string()))?;
        let mut entries = self.read_entries().unwrap_or_default();
        if entries.remove(TOKEN_KEY).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.write_entries(&entries)
    }
}
