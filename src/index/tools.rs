use std::sync::Arc;
use tokio::sync::Mutex;

use rmcp::schemars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::cache::CacheManager;
use crate::cache::outputs::{ErrorOutput, pretty_json};
use crate::index::resources::ApiResource;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModuleIndexParams {
    #[schemars(description = "Module name as listed by list_modules (e.g., 'Engine', 'UnrealEd')")]
    pub module_name: String,
}

/// Read-only views over the cached table of contents
#[derive(Debug, Clone)]
pub struct IndexTools {
    cache: Arc<Mutex<CacheManager>>,
}

impl IndexTools {
    pub fn new(cache: Arc<Mutex<CacheManager>>) -> Self {
        Self { cache }
    }

    pub async fn list_modules(&self) -> String {
        self.cache.lock().await.get_module_listing().await
    }

    pub async fn get_module_index(&self, params: ModuleIndexParams) -> String {
        self.read(&ApiResource::Module(params.module_name)).await
    }

    /// Render a resource as text
    pub async fn read(&self, resource: &ApiResource) -> String {
        let mut cache = self.cache.lock().await;
        match resource {
            ApiResource::Summary => cache.get_summary().await,
            ApiResource::Module(name) => cache.get_module_detail(name).await,
            ApiResource::Enums => cache.get_enum_index().await,
            ApiResource::Structs => cache.get_struct_index().await,
            ApiResource::Delegates => cache.get_delegate_index().await,
            ApiResource::FlatIndex => cache.get_flat_index().await,
            ApiResource::Class(name) => match cache.get_class_document(name).await {
                Some(doc) => pretty_json(&doc),
                None => ErrorOutput::new(format!("Class '{name}' not found")).to_json(),
            },
        }
    }
}
