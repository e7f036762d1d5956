use std::sync::Arc;
use tokio::sync::Mutex;

use rmcp::schemars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cache::CacheManager;
use crate::search::config::{DEFAULT_MAX_RESULTS, MAX_RESULTS_LIMIT};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchApiParams {
    #[schemars(
        description = "Search query, matched against class, enum, struct and function names (case-insensitive regex or substring)"
    )]
    pub query: String,
    #[schemars(description = "Maximum number of results to return (default 20)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SearchTools {
    cache: Arc<Mutex<CacheManager>>,
}

impl SearchTools {
    pub fn new(cache: Arc<Mutex<CacheManager>>) -> Self {
        Self { cache }
    }

    pub async fn search_unreal_api(&self, params: SearchApiParams) -> String {
        let limit = params
            .limit
            .unwrap_or(DEFAULT_MAX_RESULTS)
            .min(MAX_RESULTS_LIMIT);

        let results = {
            let mut cache = self.cache.lock().await;
            cache.search_index(&params.query, limit).await
        };

        if results.is_empty() {
            return format!("No results found for '{}'", params.query);
        }
        results.join("\n")
    }
}
