use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache::constants::*;
use crate::cache::types::validate_identifier;
use crate::cache::utils::write_atomic;

/// Manages the file system layout of the documentation cache
#[derive(Debug, Clone)]
pub struct CacheStorage {
    cache_dir: PathBuf,
}

impl CacheStorage {
    /// Create a new cache storage instance
    pub fn new(custom_cache_dir: Option<PathBuf>) -> Result<Self> {
        let cache_dir = match custom_cache_dir {
            Some(dir) => {
                let raw = dir.to_string_lossy();
                let expanded = shellexpand::full(&raw)
                    .with_context(|| format!("Failed to expand path: {raw}"))?;
                PathBuf::from(expanded.as_ref())
            }
            None => dirs::home_dir()
                .context("Failed to get home directory")?
                .join(CACHE_ROOT_DIR)
                .join(CACHE_DIR),
        };

        fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Get the path of the serialized table of contents
    pub fn toc_path(&self) -> PathBuf {
        self.cache_dir.join(TOC_FILE)
    }

    /// Get the path of the cache metadata
    pub fn metadata_path(&self) -> PathBuf {
        self.cache_dir.join(METADATA_FILE)
    }

    /// Get the path of the legacy flat index
    pub fn flat_index_path(&self) -> PathBuf {
        self.cache_dir.join(FLAT_INDEX_FILE)
    }

    /// Get the path of a cached class document
    pub fn class_doc_path(&self, class_name: &str) -> Result<PathBuf> {
        validate_identifier(class_name)?;
        Ok(self
            .cache_dir
            .join(CLASSES_DIR)
            .join(format!("{class_name}.json")))
    }

    /// Check if a class document is stored on disk
    pub fn has_class_doc(&self, class_name: &str) -> bool {
        self.class_doc_path(class_name)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Read and parse a JSON file; `Ok(None)` if it does not exist
    pub fn load_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let Some(text) = self.load_text(path)? else {
            return Ok(None);
        };
        let value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(value))
    }

    /// Serialize a value as pretty JSON and replace the file
    pub fn save_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        write_atomic(path, json.as_bytes())
    }

    /// Read a text file; `Ok(None)` if it does not exist
    pub fn load_text(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(text))
    }

    pub fn save_text(&self, path: &Path, text: &str) -> Result<()> {
        write_atomic(path, text.as_bytes())
    }

    /// Remove a file if present, returning whether anything was removed
    pub fn remove_file(&self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::types::CacheMetadata;
    use tempfile::TempDir;

    #[test]
    fn test_layout() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let storage = CacheStorage::new(Some(temp_dir.path().to_path_buf()))?;

        assert_eq!(storage.toc_path(), temp_dir.path().join("toc.json"));
        assert_eq!(storage.metadata_path(), temp_dir.path().join("meta.json"));
        assert_eq!(storage.flat_index_path(), temp_dir.path().join("llms.txt"));
        assert_eq!(
            storage.class_doc_path("Actor")?,
            temp_dir.path().join("classes").join("Actor.json")
        );
        assert!(storage.class_doc_path("../Actor").is_err());
        Ok(())
    }

    #[test]
    fn test_json_roundtrip_and_missing() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let storage = CacheStorage::new(Some(temp_dir.path().to_path_buf()))?;
        let path = storage.metadata_path();

        assert!(storage.load_json::<CacheMetadata>(&path)?.is_none());

        let metadata = CacheMetadata {
            version: "1.0".to_string(),
            created_at: chrono::Utc::now(),
            toc_entries: 7,
        };
        storage.save_json(&path, &metadata)?;
        assert_eq!(storage.load_json::<CacheMetadata>(&path)?, Some(metadata));

        fs::write(&path, "{ truncated")?;
        assert!(storage.load_json::<CacheMetadata>(&path).is_err());
        Ok(())
    }

    #[test]
    fn test_remove_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let storage = CacheStorage::new(Some(temp_dir.path().to_path_buf()))?;
        let path = storage.flat_index_path();

        assert!(!storage.remove_file(&path)?);
        storage.save_text(&path, "# index")?;
        assert!(storage.remove_file(&path)?);
        assert!(!path.exists());
        Ok(())
    }
}
