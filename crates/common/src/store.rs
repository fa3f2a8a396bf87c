//! Key-value preference storage.
//!
//! Preferences such as the last-used shape or color are read through a
//! [`ConfigStore`] passed in by the caller instead of a global.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::SnapmarkResult;

/// A small string key-value store.
pub trait ConfigStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> SnapmarkResult<()>;

    fn remove(&mut self, key: &str) -> SnapmarkResult<()>;
}

/// In-memory store (tests, embedded callers).
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    values: BTreeMap<String, String>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> SnapmarkResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> SnapmarkResult<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// Store backed by a flat JSON object on disk. Every write is flushed.
#[derive(Debug, Clone)]
pub struct JsonFileConfigStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileConfigStore {
    /// Open the store, starting empty if the file is missing or unreadable.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed preferences at {:?}: {}", path, e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    /// The standard preferences file next to `config.json`.
    pub fn open_default() -> Self {
        Self::open(crate::config::config_dir().join("prefs.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> SnapmarkResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ConfigStore for JsonFileConfigStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> SnapmarkResult<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> SnapmarkResult<()> {
        if self.values.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}
