//! Utility functions for the cache module
//!
//! This module contains shared utilities used across the cache implementation:
//! whole-file atomic writes and the single place where malformed JSON is
//! turned into "absent".

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Parse `text` as `T`, returning `None` instead of an error.
///
/// Disk and remote payloads that fail to parse are treated exactly like a
/// missing entry; the failure is only logged.
pub fn try_parse_or_absent<T: DeserializeOwned>(text: &str, what: &str) -> Option<T> {
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", what, e);
            None
        }
    }
}

/// Overwrite `path` with `contents` so readers never see a partial file.
///
/// The data is written to a temporary file in the same directory and then
/// renamed over the target.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .with_context(|| format!("Path has no parent directory: {}", path.display()))?;
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    temp.write_all(contents)
        .with_context(|| format!("Failed to write temporary file for {}", path.display()))?;
    temp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}
