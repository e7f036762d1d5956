use anyhow::Result;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::storage::CacheStorage;
use crate::cache::tiers::{
    self, GeneratedFlatIndexTier, JsonFileTier, MemoryTier, RemoteClassDocumentTier, SINGLETON_KEY,
    SlotTier, TextFileTier, Tier, lookup_tiered,
};
use crate::cache::types::{
    CacheMetadata, Category, ClassBasicInfo, ClassDocument, ClassOverview, MemberDetail,
    TableOfContents, validate_identifier,
};
use crate::cache::utils::try_parse_or_absent;
use crate::index::generator::{self, ModuleIndex, UNINITIALIZED};
use crate::remote::{RemoteError, RemoteExecutor};
use crate::search;

/// Categories consulted by [`CacheManager::get_class_overview`], first match wins
const OVERVIEW_LOOKUP_ORDER: [Category; 4] = [
    Category::Class,
    Category::Struct,
    Category::Enum,
    Category::Native,
];

/// Memory, disk and remote tiers for the API documentation
///
/// Read operations never fail: missing or malformed data degrades to `None`
/// or placeholder text. Only [`CacheManager::refresh_from_remote`] reports
/// errors, since its purpose is to surface connectivity problems.
#[derive(Debug)]
pub struct CacheManager {
    pub(crate) storage: CacheStorage,
    remote: Option<Arc<dyn RemoteExecutor>>,
    toc: Option<Arc<TableOfContents>>,
    flat_index: Option<String>,
    class_docs: HashMap<String, ClassDocument>,
}

impl CacheManager {
    /// Create a cache manager rooted at `cache_dir` (or the default location)
    pub fn new(
        cache_dir: Option<PathBuf>,
        remote: Option<Arc<dyn RemoteExecutor>>,
    ) -> Result<Self> {
        let storage = CacheStorage::new(cache_dir)?;
        tracing::debug!("Using cache directory {}", storage.cache_dir().display());

        Ok(Self {
            storage,
            remote,
            toc: None,
            flat_index: None,
            class_docs: HashMap::new(),
        })
    }

    pub fn remote(&self) -> Option<&Arc<dyn RemoteExecutor>> {
        self.remote.as_ref()
    }

    /// Cached table of contents, read through from disk on first use
    pub async fn load_table_of_contents(&mut self) -> Option<Arc<TableOfContents>> {
        tiers::load_toc(&mut self.toc, &self.storage).await
    }

    /// Replace the table of contents in memory and on disk
    ///
    /// The flat index is derived from the old contents, so both its memory
    /// and disk copies are dropped and regenerated on next access.
    pub fn save_table_of_contents(&mut self, toc: TableOfContents) -> Result<()> {
        let toc = Arc::new(toc);
        self.toc = Some(Arc::clone(&toc));
        self.flat_index = None;

        self.storage.save_json(&self.storage.toc_path(), toc.as_ref())?;
        self.storage
            .save_json(&self.storage.metadata_path(), &CacheMetadata::for_toc(&toc))?;
        if self.storage.remove_file(&self.storage.flat_index_path())? {
            tracing::debug!("Discarded stale flat index");
        }
        Ok(())
    }

    /// The legacy flat index: memory, disk, generated, or a placeholder
    pub async fn get_flat_index(&mut self) -> String {
        let path = self.storage.flat_index_path();
        let mut memory = SlotTier::new(&mut self.flat_index);
        let mut disk = TextFileTier::new(&self.storage, path);
        let mut generated = GeneratedFlatIndexTier::new(&mut self.toc, &self.storage, today());

        let mut tiers: [&mut dyn Tier<String>; 3] = [&mut memory, &mut disk, &mut generated];
        lookup_tiered(&mut tiers, SINGLETON_KEY)
            .await
            .unwrap_or_else(generator::placeholder_flat_index)
    }

    pub async fn search_index(&mut self, query: &str, max_results: usize) -> Vec<String> {
        match self.load_table_of_contents().await {
            Some(toc) => search::search(&toc, query, max_results),
            None => vec![UNINITIALIZED.to_string()],
        }
    }

    /// Full class documentation: memory, then disk, then the remote editor
    ///
    /// A document fetched remotely is persisted before it is returned.
    pub async fn get_class_document(&mut self, class_name: &str) -> Option<ClassDocument> {
        if let Err(e) = validate_identifier(class_name) {
            tracing::debug!("Rejecting class document lookup: {}", e);
            return None;
        }

        let mut memory = MemoryTier::new(&mut self.class_docs);
        let mut disk: JsonFileTier<'_, ClassDocument> =
            JsonFileTier::new(&self.storage, CacheStorage::class_doc_path);
        let mut remote = self.remote.as_deref().map(RemoteClassDocumentTier::new);

        let mut tiers: Vec<&mut dyn Tier<ClassDocument>> = vec![&mut memory, &mut disk];
        if let Some(remote) = remote.as_mut() {
            tiers.push(remote);
        }
        lookup_tiered(&mut tiers, class_name).await
    }

    pub fn save_class_document(&mut self, class_name: &str, doc: ClassDocument) -> Result<()> {
        let path = self.storage.class_doc_path(class_name)?;
        self.storage.save_json(&path, &doc)?;
        self.class_docs.insert(class_name.to_string(), doc);
        Ok(())
    }

    /// Fetch a fresh table of contents and replace everything derived from it
    ///
    /// On failure nothing on disk is touched. The returned error wraps the
    /// [`RemoteError`] unchanged when the remote side is at fault.
    pub async fn refresh_from_remote(&mut self, remote: &dyn RemoteExecutor) -> Result<usize> {
        tracing::info!("Refreshing API cache from remote editor");

        let payload = remote.fetch_table_of_contents().await?;
        let toc: TableOfContents = serde_json::from_str(&payload)
            .map_err(|e| RemoteError::MalformedPayload(format!("table of contents: {e}")))?;
        let entries = toc.total_entries();

        self.save_table_of_contents(toc)?;
        self.class_docs.clear();

        tracing::info!("Cached table of contents with {} entries", entries);
        Ok(entries)
    }

    /// Module name to class names; empty when uninitialized
    pub async fn get_module_map(&mut self) -> ModuleIndex {
        self.load_table_of_contents()
            .await
            .map(|toc| generator::module_map(&toc))
            .unwrap_or_default()
    }

    pub async fn get_summary(&mut self) -> String {
        match self.load_table_of_contents().await {
            Some(toc) => generator::summary(&toc, today()),
            None => generator::placeholder_summary(),
        }
    }

    pub async fn get_module_detail(&mut self, module_name: &str) -> String {
        self.render(|toc| generator::module_detail(toc, module_name))
            .await
    }

    pub async fn get_enum_index(&mut self) -> String {
        self.render(generator::enum_index).await
    }

    pub async fn get_struct_index(&mut self) -> String {
        self.render(generator::struct_index).await
    }

    pub async fn get_delegate_index(&mut self) -> String {
        self.render(generator::delegate_index).await
    }

    pub async fn get_module_listing(&mut self) -> String {
        self.render(generator::module_listing).await
    }

    async fn render(&mut self, view: impl FnOnce(&TableOfContents) -> String) -> String {
        match self.load_table_of_contents().await {
            Some(toc) => view(&toc),
            None => UNINITIALIZED.to_string(),
        }
    }

    /// Member name lists straight from the table of contents
    ///
    /// With `include_detail`, one remote call adds the docstring and base
    /// classes; if that call fails the overview is returned without them.
    pub async fn get_class_overview(
        &mut self,
        class_name: &str,
        include_detail: bool,
    ) -> Option<ClassOverview> {
        let mut overview = self.find_class_overview(class_name).await?;
        if include_detail {
            if let Some(remote) = self.remote.as_deref() {
                attach_basic_info(remote, &mut overview).await;
            }
        }
        Some(overview)
    }

    /// Overview from the table of contents alone, without contacting the editor
    pub async fn find_class_overview(&mut self, class_name: &str) -> Option<ClassOverview> {
        let toc = self.load_table_of_contents().await?;
        OVERVIEW_LOOKUP_ORDER.into_iter().find_map(|category| {
            toc.get(category, class_name)
                .map(|entry| ClassOverview::from_entry(class_name, category, entry))
        })
    }

    /// Live documentation for one member; never cached
    pub async fn get_member_detail(
        &self,
        class_name: &str,
        member_name: &str,
    ) -> Option<MemberDetail> {
        member_detail(self.remote.as_deref()?, class_name, member_name).await
    }

    /// [`Self::get_member_detail`] per name, skipping members that resolve to nothing
    pub async fn get_members_detail(
        &self,
        class_name: &str,
        member_names: &[String],
    ) -> Vec<MemberDetail> {
        match self.remote.as_deref() {
            Some(remote) => members_detail(remote, class_name, member_names).await,
            None => Vec::new(),
        }
    }
}

/// Fill in the docstring and bases of an overview; left untouched on failure
pub async fn attach_basic_info(remote: &dyn RemoteExecutor, overview: &mut ClassOverview) {
    let Some(payload) = remote.fetch_class_basic_info(&overview.name).await else {
        return;
    };
    let info: Option<ClassBasicInfo> =
        try_parse_or_absent(&payload, &format!("basic info for {}", overview.name));
    if let Some(info) = info {
        overview.doc = Some(info.doc);
        overview.bases = Some(info.bases);
    }
}

pub async fn member_detail(
    remote: &dyn RemoteExecutor,
    class_name: &str,
    member_name: &str,
) -> Option<MemberDetail> {
    let payload = remote.fetch_member_info(class_name, member_name).await?;
    try_parse_or_absent(&payload, &format!("member info for {class_name}.{member_name}"))
}

pub async fn members_detail(
    remote: &dyn RemoteExecutor,
    class_name: &str,
    member_names: &[String],
) -> Vec<MemberDetail> {
    let mut details = Vec::with_capacity(member_names.len());
    for member_name in member_names {
        if let Some(detail) = member_detail(remote, class_name, member_name).await {
            details.push(detail);
        }
    }
    details
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
