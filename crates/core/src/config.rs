//! # Configuration
//!
//! Settings persisted at `.justpos/config.json`, with environment overrides
//! applied on top. A missing or unreadable file falls back to defaults.

use crate::state::{io, FileStorage, JustposDb, KeyValueStorage, MemoryStorage, SqliteStorage};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const STORAGE_ENV: &str = "JUSTPOS_STORAGE";
pub const PORT_ENV: &str = "JUSTPOS_PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// Subdirectory of the runtime directory used by the `file` backend
const FILE_STORAGE_DIR: &str = "storage";

/// Where the catalog is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    File,
    /// Lost on exit
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => bail!("Unknown storage backend: {}", other),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JustposConfig {
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory the config was loaded from
    #[serde(skip)]
    pub runtime_path: PathBuf,
}

impl Default for JustposConfig {
    fn default() -> Self {
        Self {
            storage: StorageBackend::default(),
            port: DEFAULT_PORT,
            runtime_path: io::get_runtime_path(),
        }
    }
}

impl JustposConfig {
    /// Load from the default runtime directory and apply environment overrides
    pub async fn load() -> Self {
        let mut config = Self::load_from(&io::get_runtime_path()).await;
        config.apply_overrides(
            std::env::var(STORAGE_ENV).ok().as_deref(),
            std::env::var(PORT_ENV).ok().as_deref(),
        );
        config
    }

    /// Load `config.json` from `runtime_path` without environment overrides
    pub async fn load_from(runtime_path: &Path) -> Self {
        let mut config = if io::file_exists(runtime_path, CONFIG_FILE_NAME).await {
            match io::read_runtime_file(runtime_path, CONFIG_FILE_NAME).await {
                Ok(content) => match serde_json::from_str::<JustposConfig>(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}, using defaults", CONFIG_FILE_NAME, e);
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!("{:#}, using defaults", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };
        config.runtime_path = runtime_path.to_path_buf();
        config
    }

    /// Apply `JUSTPOS_STORAGE` / `JUSTPOS_PORT` style values; invalid ones are ignored
    pub fn apply_overrides(&mut self, storage: Option<&str>, port: Option<&str>) {
        if let Some(raw) = storage {
            match raw.parse() {
                Ok(backend) => self.storage = backend,
                Err(e) => tracing::warn!("Ignoring {}: {}", STORAGE_ENV, e),
            }
        }
        if let Some(raw) = port {
            match raw.trim().parse() {
                Ok(port) => self.port = port,
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", PORT_ENV, raw, e),
            }
        }
    }

    /// Persist to `config.json` in the runtime directory
    pub async fn save(&self) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        io::write_runtime_file(&self.runtime_path, CONFIG_FILE_NAME, &content).await
    }

    /// Build the configured storage backend
    pub fn open_storage(&self) -> Result<Arc<dyn KeyValueStorage>> {
        let storage: Arc<dyn KeyValueStorage> = match self.storage {
            StorageBackend::Sqlite => {
                let db = JustposDb::open_in(&self.runtime_path)
                    .with_context(|| format!("Failed to open database in {:?}", self.runtime_path))?;
                Arc::new(SqliteStorage::new(Arc::new(db)))
            }
            StorageBackend::File => {
                Arc::new(FileStorage::new(self.runtime_path.join(FILE_STORAGE_DIR)))
            }
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        };
        tracing::info!(backend = ?self.storage, path = ?self.runtime_path, "Storage opened");
        Ok(storage)
    }
}
