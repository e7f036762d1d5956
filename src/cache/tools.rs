use std::sync::Arc;
use tokio::sync::Mutex;

use rmcp::schemars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::CacheManager;
use crate::cache::outputs::{ErrorOutput, MembersInfoOutput, RefreshOutput, pretty_json};
use crate::cache::service::{attach_basic_info, member_detail, members_detail};
use crate::remote::{RemoteError, RemoteExecutor};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetClassParams {
    #[schemars(description = "Exact class name (e.g., 'Actor', 'EditorAssetLibrary')")]
    pub class_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetClassOverviewParams {
    #[schemars(description = "Exact class, struct or enum name")]
    pub class_name: String,
    #[schemars(
        description = "Also fetch the docstring and base classes from the running editor (default: false)"
    )]
    pub include_doc: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetMemberInfoParams {
    #[schemars(description = "The class that owns the member")]
    pub class_name: String,
    #[schemars(description = "Method, property or constant name")]
    pub member_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetMembersInfoParams {
    #[schemars(description = "The class that owns the members")]
    pub class_name: String,
    #[schemars(description = "Member names to fetch, e.g. [\"get_actor_location\", \"set_actor_location\"]")]
    pub member_names: Vec<String>,
}

/// Printed with refresh failures caused by an unreachable editor
pub const REFRESH_CHECKLIST: &str = "Make sure:\n  1. Unreal Editor is running\n  2. Python Editor Script Plugin is enabled\n  3. Remote Execution is enabled in Project Settings > Plugins > Python";

#[derive(Debug, Clone)]
pub struct CacheTools {
    cache: Arc<Mutex<CacheManager>>,
}

impl CacheTools {
    pub fn new(cache: Arc<Mutex<CacheManager>>) -> Self {
        Self { cache }
    }

    pub async fn get_unreal_class(&self, params: GetClassParams) -> String {
        let mut cache = self.cache.lock().await;
        match cache.get_class_document(&params.class_name).await {
            Some(doc) => pretty_json(&doc),
            None => ErrorOutput::new(format!(
                "Class '{}' not found. Use search_unreal_api to find the correct name.",
                params.class_name
            ))
            .to_json(),
        }
    }

    pub async fn get_class_overview(&self, params: GetClassOverviewParams) -> String {
        let (overview, remote) = {
            let mut cache = self.cache.lock().await;
            (
                cache.find_class_overview(&params.class_name).await,
                cache.remote().cloned(),
            )
        };

        let Some(mut overview) = overview else {
            return ErrorOutput::new(format!(
                "Class '{}' not found in the API index. Use search_unreal_api to find the correct name.",
                params.class_name
            ))
            .to_json();
        };
        if params.include_doc.unwrap_or(false) {
            if let Some(remote) = remote {
                attach_basic_info(remote.as_ref(), &mut overview).await;
            }
        }
        pretty_json(&overview)
    }

    pub async fn get_member_info(&self, params: GetMemberInfoParams) -> String {
        let detail = match self.remote().await {
            Some(remote) => {
                member_detail(remote.as_ref(), &params.class_name, &params.member_name).await
            }
            None => None,
        };

        match detail {
            Some(detail) => pretty_json(&detail),
            None => ErrorOutput::new(format!(
                "Member '{}.{}' not found or Unreal Editor is not reachable.",
                params.class_name, params.member_name
            ))
            .to_json(),
        }
    }

    pub async fn get_members_info(&self, params: GetMembersInfoParams) -> String {
        let members = match self.remote().await {
            Some(remote) => {
                members_detail(remote.as_ref(), &params.class_name, &params.member_names).await
            }
            None => Vec::new(),
        };

        MembersInfoOutput {
            class_name: params.class_name,
            members,
            requested: params.member_names.len(),
        }
        .to_json()
    }

    /// Remote executor, cloned out so live queries run without holding the cache lock
    async fn remote(&self) -> Option<Arc<dyn RemoteExecutor>> {
        self.cache.lock().await.remote().cloned()
    }

    pub async fn refresh_api_cache(&self) -> String {
        self.refresh().await.to_json()
    }

    /// Refresh from the configured remote executor
    pub async fn refresh(&self) -> RefreshOutput {
        let mut cache = self.cache.lock().await;
        let Some(remote) = cache.remote().cloned() else {
            return RefreshOutput::Error {
                error: format!("Failed to refresh cache: {}", RemoteError::NotConfigured),
            };
        };

        match cache.refresh_from_remote(remote.as_ref()).await {
            Ok(toc_entries) => RefreshOutput::Success {
                message: "Cache refreshed successfully".to_string(),
                toc_entries,
            },
            Err(e) => {
                tracing::warn!("Cache refresh failed: {:#}", e);
                let error = match e.downcast_ref::<RemoteError>() {
                    Some(RemoteError::Unavailable(_) | RemoteError::TimedOut(_)) => {
                        format!("Failed to refresh cache: {e:#}\n{REFRESH_CHECKLIST}")
                    }
                    _ => format!("Failed to refresh cache: {e:#}"),
                };
                RefreshOutput::Error { error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::types::{ClassDocument, ClassOverview};
    use crate::remote::testing::ScriptedExecutor;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn tools(temp_dir: &TempDir, remote: Option<Arc<ScriptedExecutor>>) -> CacheTools {
        let remote = remote.map(|r| r as Arc<dyn RemoteExecutor>);
        let cache = CacheManager::new(Some(temp_dir.path().to_path_buf()), remote).unwrap();
        CacheTools::new(Arc::new(Mutex::new(cache)))
    }

    #[tokio::test]
    async fn test_refresh_then_overview() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(ScriptedExecutor::new());
        remote.push_toc(Ok(
            r#"{"Class": {"Actor": {"module": "Engine", "func": ["destroy"]}}}"#.to_string(),
        ));
        let tools = tools(&temp_dir, Some(remote));

        let refreshed = tools.refresh().await;
        assert_eq!(
            refreshed,
            RefreshOutput::Success {
                message: "Cache refreshed successfully".to_string(),
                toc_entries: 1,
            }
        );

        let json = tools
            .get_class_overview(GetClassOverviewParams {
                class_name: "Actor".to_string(),
                include_doc: None,
            })
            .await;
        let overview: ClassOverview = serde_json::from_str(&json).unwrap();
        assert_eq!(overview.methods, vec!["destroy"]);

        let json = tools
            .get_class_overview(GetClassOverviewParams {
                class_name: "Pawn".to_string(),
                include_doc: Some(true),
            })
            .await;
        let error: ErrorOutput = serde_json::from_str(&json).unwrap();
        assert!(error.error.contains("'Pawn' not found"));
    }

    #[tokio::test]
    async fn test_refresh_failures() {
        let temp_dir = TempDir::new().unwrap();
        let offline = tools(&temp_dir, None);
        match offline.refresh().await {
            RefreshOutput::Error { error } => assert!(error.contains("no remote executor")),
            other => panic!("expected error, got {other:?}"),
        }

        let remote = Arc::new(ScriptedExecutor::new());
        remote.push_toc(Err(RemoteError::Unavailable("connection refused".to_string())));
        let tools = tools(&temp_dir, Some(remote));
        match tools.refresh().await {
            RefreshOutput::Error { error } => {
                assert!(error.contains("connection refused"));
                assert!(error.contains("Unreal Editor is running"));
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_unreal_class() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(ScriptedExecutor::new());
        remote.set_class_document(
            "Actor",
            r#"{"name": "Actor", "doc": "Base actor", "bases": [], "is_class": true, "members": {}}"#,
        );
        let tools = tools(&temp_dir, Some(remote));

        let json = tools
            .get_unreal_class(GetClassParams {
                class_name: "Actor".to_string(),
            })
            .await;
        let doc: ClassDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(doc.doc, "Base actor");

        let json = tools
            .get_unreal_class(GetClassParams {
                class_name: "Nope".to_string(),
            })
            .await;
        let error: ErrorOutput = serde_json::from_str(&json).unwrap();
        assert!(error.error.starts_with("Class 'Nope' not found."));
    }

    #[tokio::test]
    async fn test_members_info_skips_missing() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(ScriptedExecutor::new());
        remote.set_member_info(
            "Actor",
            "tags",
            r#"{"name": "tags", "type": "property", "doc": "Actor tags"}"#,
        );
        let tools = tools(&temp_dir, Some(remote));

        let json = tools
            .get_members_info(GetMembersInfoParams {
                class_name: "Actor".to_string(),
                member_names: vec!["tags".to_string(), "missing".to_string()],
            })
            .await;
        let output: MembersInfoOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output.requested, 2);
        assert_eq!(output.members.len(), 1);
        assert_eq!(output.members[0].name, "tags");

        let json = tools
            .get_member_info(GetMemberInfoParams {
                class_name: "Actor".to_string(),
                member_name: "missing".to_string(),
            })
            .await;
        assert!(json.contains("'Actor.missing' not found"));
    }

    #[tokio::test]
    async fn test_member_queries_release_the_cache() {
        let temp_dir = TempDir::new().unwrap();
        let remote = Arc::new(ScriptedExecutor::new().with_delay(Duration::from_millis(300)));
        std::fs::write(
            temp_dir.path().join("toc.json"),
            r#"{"Class": {"Actor": {"module": "Engine", "func": ["destroy"]}}}"#,
        )
        .unwrap();
        let cache = CacheManager::new(
            Some(temp_dir.path().to_path_buf()),
            Some(remote.clone() as Arc<dyn RemoteExecutor>),
        )
        .unwrap();
        let shared = Arc::new(Mutex::new(cache));
        let tools = CacheTools::new(shared.clone());

        let members = tokio::spawn({
            let tools = tools.clone();
            async move {
                tools
                    .get_members_info(GetMembersInfoParams {
                        class_name: "Actor".to_string(),
                        member_names: ["a", "b", "c", "d"].iter().map(|s| s.to_string()).collect(),
                    })
                    .await
            }
        });
        let overview = tokio::spawn({
            let tools = tools.clone();
            async move {
                tools
                    .get_class_overview(GetClassOverviewParams {
                        class_name: "Actor".to_string(),
                        include_doc: Some(true),
                    })
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        let summary = shared.lock().await.get_summary().await;
        assert!(
            started.elapsed() < Duration::from_millis(200),
            "summary waited {:?}",
            started.elapsed()
        );
        assert!(summary.contains("- **Engine**: 1 classes"));

        let output: MembersInfoOutput = serde_json::from_str(&members.await.unwrap()).unwrap();
        assert_eq!(output.requested, 4);
        let overview: ClassOverview = serde_json::from_str(&overview.await.unwrap()).unwrap();
        assert_eq!(overview.methods, vec!["destroy"]);
        assert_eq!(remote.member_info_calls(), 4);
        assert_eq!(remote.basic_info_calls(), 1);
    }
}
