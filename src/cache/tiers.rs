//! Ordered cache tiers and the combinator that walks them
//!
//! A lookup tries each [`Tier`] in priority order. The first hit is written
//! back into every tier in front of it, so the next lookup stops earlier.
//! Tiers never fail: anything that goes wrong below them is logged and
//! reported as a miss.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::storage::CacheStorage;
use crate::cache::types::{ClassDocument, TableOfContents};
use crate::cache::utils::try_parse_or_absent;
use crate::index::generator;
use crate::remote::RemoteExecutor;

/// Key used for single-valued caches such as the table of contents
pub const SINGLETON_KEY: &str = "";

/// One layer of a memory, disk, remote fallback chain
#[async_trait]
pub trait Tier<V: Send + Sync>: Send {
    fn name(&self) -> &'static str;

    /// Look `key` up in this tier only
    async fn try_get(&mut self, key: &str) -> Option<V>;

    /// Store a value found in a lower tier
    async fn put(&mut self, key: &str, value: &V);
}

/// Try each tier in order, back-filling earlier tiers on a hit
pub async fn lookup_tiered<V: Send + Sync>(
    tiers: &mut [&mut dyn Tier<V>],
    key: &str,
) -> Option<V> {
    for hit in 0..tiers.len() {
        let Some(value) = tiers[hit].try_get(key).await else {
            continue;
        };

        tracing::debug!("Cache hit in {} tier for '{}'", tiers[hit].name(), key);
        for tier in tiers[..hit].iter_mut() {
            tier.put(key, &value).await;
        }
        return Some(value);
    }

    None
}

/// A single in-memory value
pub struct SlotTier<'a, V> {
    slot: &'a mut Option<V>,
}

impl<'a, V> SlotTier<'a, V> {
    pub fn new(slot: &'a mut Option<V>) -> Self {
        Self { slot }
    }
}

#[async_trait]
impl<'a, V: Clone + Send + Sync> Tier<V> for SlotTier<'a, V> {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn try_get(&mut self, _key: &str) -> Option<V> {
        self.slot.clone()
    }

    async fn put(&mut self, _key: &str, value: &V) {
        *self.slot = Some(value.clone());
    }
}

/// Keyed in-memory values
pub struct MemoryTier<'a, V> {
    entries: &'a mut HashMap<String, V>,
}

impl<'a, V> MemoryTier<'a, V> {
    pub fn new(entries: &'a mut HashMap<String, V>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl<'a, V: Clone + Send + Sync> Tier<V> for MemoryTier<'a, V> {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn try_get(&mut self, key: &str) -> Option<V> {
        self.entries.get(key).cloned()
    }

    async fn put(&mut self, key: &str, value: &V) {
        self.entries.insert(key.to_string(), value.clone());
    }
}

/// Maps a key to the file that stores it
pub type Locate = fn(&CacheStorage, &str) -> Result<PathBuf>;

/// JSON documents on disk, one file per key
pub struct JsonFileTier<'a, V> {
    storage: &'a CacheStorage,
    locate: Locate,
    _value: PhantomData<fn() -> V>,
}

impl<'a, V> JsonFileTier<'a, V> {
    pub fn new(storage: &'a CacheStorage, locate: Locate) -> Self {
        Self {
            storage,
            locate,
            _value: PhantomData,
        }
    }

    fn path(&self, key: &str) -> Option<PathBuf> {
        (self.locate)(self.storage, key)
            .inspect_err(|e| tracing::warn!("No cache file for '{}': {}", key, e))
            .ok()
    }
}

#[async_trait]
impl<'a, V> Tier<V> for JsonFileTier<'a, V>
where
    V: Serialize + DeserializeOwned + Send + Sync,
{
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn try_get(&mut self, key: &str) -> Option<V> {
        let path = self.path(key)?;
        match self.storage.load_text(&path) {
            Ok(text) => try_parse_or_absent(&text?, &path.display().to_string()),
            Err(e) => {
                tracing::warn!("{:#}", e);
                None
            }
        }
    }

    async fn put(&mut self, key: &str, value: &V) {
        let Some(path) = self.path(key) else {
            return;
        };
        if let Err(e) = self.storage.save_json(&path, value) {
            tracing::warn!("Failed to persist {}: {:#}", path.display(), e);
        }
    }
}

/// A plain text file on disk
pub struct TextFileTier<'a> {
    storage: &'a CacheStorage,
    path: PathBuf,
}

impl<'a> TextFileTier<'a> {
    pub fn new(storage: &'a CacheStorage, path: PathBuf) -> Self {
        Self { storage, path }
    }
}

#[async_trait]
impl<'a> Tier<String> for TextFileTier<'a> {
    fn name(&self) -> &'static str {
        "disk"
    }

    async fn try_get(&mut self, _key: &str) -> Option<String> {
        self.storage
            .load_text(&self.path)
            .inspect_err(|e| tracing::warn!("{:#}", e))
            .ok()
            .flatten()
    }

    async fn put(&mut self, _key: &str, value: &String) {
        if let Err(e) = self.storage.save_text(&self.path, value) {
            tracing::warn!("Failed to persist {}: {:#}", self.path.display(), e);
        }
    }
}

/// Class documents fetched from a live editor; read-only
pub struct RemoteClassDocumentTier<'a> {
    remote: &'a dyn RemoteExecutor,
}

impl<'a> RemoteClassDocumentTier<'a> {
    pub fn new(remote: &'a dyn RemoteExecutor) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl<'a> Tier<ClassDocument> for RemoteClassDocumentTier<'a> {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn try_get(&mut self, key: &str) -> Option<ClassDocument> {
        let payload = self.remote.fetch_class_document(key).await?;
        try_parse_or_absent(&payload, &format!("class document for {key}"))
    }

    async fn put(&mut self, _key: &str, _value: &ClassDocument) {}
}

/// Renders the flat index from whatever table of contents is cached
pub struct GeneratedFlatIndexTier<'a> {
    toc: &'a mut Option<Arc<TableOfContents>>,
    storage: &'a CacheStorage,
    generated_on: NaiveDate,
}

impl<'a> GeneratedFlatIndexTier<'a> {
    pub fn new(
        toc: &'a mut Option<Arc<TableOfContents>>,
        storage: &'a CacheStorage,
        generated_on: NaiveDate,
    ) -> Self {
        Self {
            toc,
            storage,
            generated_on,
        }
    }
}

#[async_trait]
impl<'a> Tier<String> for GeneratedFlatIndexTier<'a> {
    fn name(&self) -> &'static str {
        "generated"
    }

    async fn try_get(&mut self, _key: &str) -> Option<String> {
        let toc = load_toc(self.toc, self.storage).await?;
        Some(generator::flat_index(&toc, self.generated_on))
    }

    async fn put(&mut self, _key: &str, _value: &String) {}
}

/// The table of contents from memory, else from `toc.json`
///
/// Never consults a remote source; that only happens on explicit refresh.
pub async fn load_toc(
    slot: &mut Option<Arc<TableOfContents>>,
    storage: &CacheStorage,
) -> Option<Arc<TableOfContents>> {
    let mut memory = SlotTier::new(slot);
    let mut disk: JsonFileTier<'_, Arc<TableOfContents>> =
        JsonFileTier::new(storage, |storage, _| Ok(storage.toc_path()));
    let mut tiers: [&mut dyn Tier<Arc<TableOfContents>>; 2] = [&mut memory, &mut disk];
    lookup_tiered(&mut tiers, SINGLETON_KEY).await
}
