//! # IO Utilities
//!
//! File system operations for the `.justpos` runtime directory, which holds
//! the config file, the SQLite database and the file-backed storage.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Environment variable overriding the runtime directory
pub const RUNTIME_PATH_ENV: &str = "JUSTPOS_RUNTIME_PATH";

/// Get the runtime directory path (.justpos)
pub fn get_runtime_path() -> PathBuf {
    if let Ok(path) = std::env::var(RUNTIME_PATH_ENV) {
        return PathBuf::from(path);
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".justpos")
}

/// Ensure the runtime directory exists
pub async fn ensure_runtime_dir(root: &Path) -> Result<PathBuf> {
    fs::create_dir_all(root)
        .await
        .with_context(|| format!("Failed to create runtime directory: {:?}", root))?;
    Ok(root.to_path_buf())
}

/// Read a file from the runtime directory
pub async fn read_runtime_file(root: &Path, relative_path: impl AsRef<Path>) -> Result<String> {
    let path = root.join(relative_path.as_ref());
    fs::read_to_string(&path)
        .await
        .with_context(|| format!("Failed to read file: {:?}", path))
}

/// Write a file to the runtime directory
pub async fn write_runtime_file(
    root: &Path,
    relative_path: impl AsRef<Path>,
    content: &str,
) -> Result<()> {
    let path = root.join(relative_path);

    // Ensure parent dir exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::write(&path, content)
        .await
        .with_context(|| format!("Failed to write file: {:?}", path))
}

/// Check if a runtime file exists
pub async fn file_exists(root: &Path, relative_path: impl AsRef<Path>) -> bool {
    fs::metadata(root.join(relative_path)).await.is_ok()
}
