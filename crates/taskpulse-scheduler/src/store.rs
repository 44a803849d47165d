//! Key-value persistence — file-backed JSON blobs, plus an in-memory
//! store for tests and ephemeral hosts.
//!
//! Blobs are human-readable JSON files, one per key. Only written on
//! state changes, never on every tick.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use taskpulse_core::error::{Result, TaskpulseError};
use taskpulse_core::traits::PersistenceStore;

/// File-backed store: `<dir>/<key>.json` per key.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        std::fs::create_dir_all(dir).ok();
        Self {
            dir: dir.to_path_buf(),
        }
    }

    /// Default store directory (~/.taskpulse).
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".taskpulse")
    }

    fn file_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PersistenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        let file = self.file_for(key);
        if !file.exists() {
            return None;
        }
        match std::fs::read_to_string(&file) {
            Ok(contents) => Some(contents),
            Err(e) => {
                tracing::warn!("⚠️ Failed to read {}: {e}", file.display());
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let file = self.file_for(key);
        std::fs::write(&file, value)
            .map_err(|e| TaskpulseError::Store(format!("write {}: {e}", file.display())))?;
        tracing::debug!("💾 Saved {} bytes to {}", value.len(), file.display());
        Ok(())
    }
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStore {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().unwrap().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.map.write().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.get("missing").is_none());
        store.set("k", "{\"v\":1}").unwrap();
        assert_eq!(store.get("k").as_deref(), Some("{\"v\":1}"));
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = std::env::temp_dir().join("taskpulse-test-store");
        let store = FileStore::new(&dir);
        assert!(store.get("absent").is_none());
        store.set("ledger", "[]").unwrap();
        assert_eq!(store.get("ledger").as_deref(), Some("[]"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
