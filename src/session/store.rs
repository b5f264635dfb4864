//! Persisted identity state.
//!
//! Three named slots (`access_token`, `refresh_token`, `user`) live in a
//! key/value `Storage`. The CLI backs it with a JSON file; tests use the
//! in-memory map. Other keys may share the storage and are never touched
//! by `SessionStore::clear`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{AuthResponse, User};

/// Slot holding the bearer credential
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Slot holding the refresh credential (stored, never exercised)
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Slot holding the cached user profile as JSON
pub const USER_KEY: &str = "user";

/// Every slot `clear` removes
pub const IDENTITY_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

/// Errors from the backing storage
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// String key/value storage
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every key currently stored
    pub fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// JSON object file, rewritten on every change
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Session file is unreadable, starting empty"
                );
                Ok(BTreeMap::new())
            }
        }
    }

    /// Replace the file via a sibling temp file and rename
    fn write(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut tmp_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "session.json".into());
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&tmp_path, content)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.read()?;
        entries.insert(key.to_string(), value.to_string());
        self.write(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.read()?;
        if entries.remove(key).is_some() {
            self.write(&entries)?;
        }
        Ok(())
    }
}

/// Identity state loaded from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// `None` when the slot is missing or unparseable
    pub user: Option<User>,
}

/// Handle over the three identity slots
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn Storage>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// In-memory store, mostly for tests
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Load the current session; `None` without an access credential
    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        let Some(access_token) = self.access_token()? else {
            return Ok(None);
        };

        let refresh_token = non_blank(self.storage.get(REFRESH_TOKEN_KEY)?);
        let user = self.user()?;

        Ok(Some(Session {
            access_token,
            refresh_token,
            user,
        }))
    }

    /// Current bearer credential, if any
    pub fn access_token(&self) -> Result<Option<String>, StorageError> {
        Ok(non_blank(self.storage.get(ACCESS_TOKEN_KEY)?))
    }

    /// Cached profile; the literal strings `undefined` and `null` count as absent
    pub fn user(&self) -> Result<Option<User>, StorageError> {
        let Some(raw) = non_blank(self.storage.get(USER_KEY)?) else {
            return Ok(None);
        };
        if raw == "undefined" || raw == "null" {
            return Ok(None);
        }

        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                debug!(error = %e, "Stored user profile is unreadable");
                Ok(None)
            }
        }
    }

    /// Persist the outcome of a login or registration
    pub fn save(&self, auth: &AuthResponse) -> Result<(), StorageError> {
        self.storage.set(ACCESS_TOKEN_KEY, &auth.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &auth.refresh_token)?;
        self.storage
            .set(USER_KEY, &serde_json::to_string(&auth.user)?)?;
        Ok(())
    }

    /// Remove exactly the three identity slots
    pub fn clear(&self) -> Result<(), StorageError> {
        for key in IDENTITY_KEYS {
            self.storage.remove(key)?;
        }
        Ok(())
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
