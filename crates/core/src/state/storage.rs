//! # Key/Value Storage
//!
//! The durable storage port the catalog writes through, shaped after the
//! browser's `localStorage`: string keys, string values, whole-value
//! overwrite. Three backends are provided:
//!
//! - [`MemoryStorage`] - process-local map, used by tests and `memory` mode
//! - [`FileStorage`] - one `<key>.json` file per key in a directory
//! - [`SqliteStorage`] - the `local_storage` table of [`JustposDb`]

use super::db::JustposDb;
use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Durable string key/value storage
pub trait KeyValueStorage: Send + Sync {
    /// Value stored under `key`, or `None` when nothing was written yet
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }
}

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Directory of `<key>.json` files
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            bail!("Invalid storage key: {:?}", key);
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let value = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read storage file: {:?}", path))?;
        Ok(Some(value))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create storage directory: {:?}", self.dir))?;
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write storage file: {:?}", path))
    }
}

/// SQLite-backed storage
#[derive(Clone)]
pub struct SqliteStorage {
    db: Arc<JustposDb>,
}

impl SqliteStorage {
    pub fn new(db: Arc<JustposDb>) -> Self {
        Self { db }
    }
}

impl KeyValueStorage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.db.get_value(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.db.set_value(key, value)
    }
}
