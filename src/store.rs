//! Flat string key-value storage, the only persistence pollbox needs.
//!
//! Values are whole JSON documents. Callers read a key, change the decoded
//! value and write it back; there are no partial updates.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use crate::error::{PollError, PollResult};

/// Abstract string-keyed storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn load(&self, key: &str) -> PollResult<Option<String>>;

    /// Overwrite the value stored under `key`.
    fn save(&self, key: &str, value: &str) -> PollResult<()>;

    /// Delete `key`. Returns true if it existed.
    fn remove(&self, key: &str) -> PollResult<bool>;
}

/// HashMap-backed store for tests and throwaway sessions.
///
/// Clone-friendly via Arc; clones share the same map.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn load(&self, key: &str) -> PollResult<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| PollError::Storage("lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> PollResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PollError::Storage("lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> PollResult<bool> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| PollError::Storage("lock poisoned".into()))?;
        Ok(entries.remove(key).is_some())
    }
}

/// Store kept in a single JSON object file.
///
/// The file is re-read on every access and rewritten whole on every change,
/// so two stores on the same path see each other's writes (last write wins).
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file a write goes to before it replaces the store.
    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn read_entries(&self) -> PollResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> PollResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;

        // Same directory, so the rename cannot cross filesystems.
        let tmp_path = self.tmp_path();
        fs::write(&tmp_path, raw)?;
        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        tracing::debug!(path = %self.path.display(), keys = entries.len(), "store written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> PollResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> PollResult<()> {
        let mut entries = self.read_entries()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> PollResult<bool> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(false);
        }
        self.write_entries(&entries)?;
        Ok(true)
    }
}
