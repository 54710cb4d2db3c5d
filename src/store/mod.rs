//! Key-value persistence for session and catalogue state.
//!
//! Everything the library persists — client registration, tokens, PKCE
//! exchange state, the album list, ratings — goes through [`KeyValueStore`]
//! so that all reads and writes are auditable in one place and mockable in
//! tests.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised by a [`KeyValueStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

/// Storage abstraction: synchronous string get/set/remove by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Configuration for file-backed storage.
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    pub base_dir: PathBuf,
}

impl FileStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_discolog_dir()
    }
}

/// File-backed store keeping one file per key under a base directory.
///
/// # Example
/// ```no_run
/// use discolog::store::{FileKeyValueStore, FileStoreConfig, KeyValueStore};
///
/// let store = FileKeyValueStore::new(FileStoreConfig::new(std::path::PathBuf::from("/tmp")));
/// store.set("client_id", "abc123")?;
/// # Ok::<(), discolog::store::StoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(config: FileStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_discolog_dir(),
        }
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(normalize_key(key))
    }

    fn ensure_parent(path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        Self::ensure_parent(&path)?;
        fs::write(&path, value)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::Io(err.to_string())),
        }
    }
}

fn default_discolog_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".discolog"))
        .unwrap_or_else(|| PathBuf::from(".discolog"))
}

/// Map a storage key to a safe file name.
fn normalize_key(key: &str) -> String {
    let trimmed = key.trim();
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '-' || lower == '_' {
            out.push(lower);
        } else {
            out.push('-');
        }
    }
    if out.trim_matches('-').is_empty() {
        "default".to_string()
    } else {
        out
    }
}
