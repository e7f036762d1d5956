use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use anyhow::Result;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        AnnotateAble, Implementation, ListResourcesResult, PaginatedRequestParam, RawResource,
        ReadResourceRequestParam, ReadResourceResult, ResourceContents, ServerCapabilities,
        ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_handler, tool_router,
};

use crate::cache::{
    CacheManager,
    outputs::RefreshOutput,
    tools::{
        CacheTools, GetClassOverviewParams, GetClassParams, GetMemberInfoParams,
        GetMembersInfoParams,
    },
};
use crate::index::{
    ApiResource, IndexTools,
    tools::ModuleIndexParams,
};
use crate::remote::{
    RemoteExecutor,
    tools::{ExecPythonParams, RemoteTools},
};
use crate::search::tools::{SearchApiParams, SearchTools};

#[derive(Debug, Clone)]
pub struct UnrealPythonService {
    cache_tools: CacheTools,
    index_tools: IndexTools,
    search_tools: SearchTools,
    remote_tools: RemoteTools,
    tool_router: ToolRouter<Self>,
}

impl UnrealPythonService {
    pub fn new(
        cache_dir: Option<PathBuf>,
        remote: Option<Arc<dyn RemoteExecutor>>,
    ) -> Result<Self> {
        let cache = Arc::new(Mutex::new(CacheManager::new(cache_dir, remote.clone())?));

        Ok(Self {
            cache_tools: CacheTools::new(cache.clone()),
            index_tools: IndexTools::new(cache.clone()),
            search_tools: SearchTools::new(cache),
            remote_tools: RemoteTools::new(remote),
            tool_router: Self::tool_router(),
        })
    }

    /// Text of a resource URI, or `None` if the URI is not recognised
    pub async fn read_resource_text(&self, uri: &str) -> Option<String> {
        let resource = ApiResource::parse(uri)?;
        Some(self.index_tools.read(&resource).await)
    }

    /// Refresh the cache outside of an MCP session
    pub async fn refresh(&self) -> RefreshOutput {
        self.cache_tools.refresh().await
    }
}

#[tool_router]
impl UnrealPythonService {
    // Search and class documentation
    #[tool(
        description = "Search the Unreal Python API by name. The query is a case-insensitive regex (falls back to substring matching if it is not a valid regex). Returns one line per match with member counts, e.g. '[Class] Actor (120 methods, 40 props)'. Use this to find the exact name before calling get_class_overview."
    )]
    pub async fn search_unreal_api(&self, params: Parameters<SearchApiParams>) -> String {
        self.search_tools.search_unreal_api(params.0).await
    }

    #[tool(
        description = "Get the full documentation of an Unreal Python class, including every method, property and constant with docstrings. Fetched from the running editor on first use and cached on disk. WARNING: large classes produce large responses; prefer get_class_overview and get_member_info."
    )]
    pub async fn get_unreal_class(&self, params: Parameters<GetClassParams>) -> String {
        self.cache_tools.get_unreal_class(params.0).await
    }

    #[tool(
        description = "Get a lightweight overview of a class, struct or enum: its module and the names of its methods, class methods, properties and constants. Served from the local index without contacting the editor. Set include_doc to also fetch the docstring and base classes."
    )]
    pub async fn get_class_overview(
        &self,
        params: Parameters<GetClassOverviewParams>,
    ) -> String {
        self.cache_tools.get_class_overview(params.0).await
    }

    #[tool(
        description = "Get detailed documentation (type, docstring, signature or value) for one member of a class. Always queried live from the running editor."
    )]
    pub async fn get_member_info(&self, params: Parameters<GetMemberInfoParams>) -> String {
        self.cache_tools.get_member_info(params.0).await
    }

    #[tool(
        description = "Get detailed documentation for several members of one class in a single call. Members that cannot be resolved are left out of the result."
    )]
    pub async fn get_members_info(&self, params: Parameters<GetMembersInfoParams>) -> String {
        self.cache_tools.get_members_info(params.0).await
    }

    // Index views
    #[tool(
        description = "List all modules of the Unreal Python API with their class counts, largest first. Use a module name with get_module_index or the unreal-python://index/module/{name} resource."
    )]
    pub async fn list_modules(&self) -> String {
        self.index_tools.list_modules().await
    }

    #[tool(
        description = "List the classes of one module with their method and property counts."
    )]
    pub async fn get_module_index(&self, params: Parameters<ModuleIndexParams>) -> String {
        self.index_tools.get_module_index(params.0).await
    }

    // Remote editor
    #[tool(
        description = "Execute Python code inside the running Unreal Editor and return its output. The code is not sandboxed."
    )]
    pub async fn exec_unreal_python(&self, params: Parameters<ExecPythonParams>) -> String {
        self.remote_tools.exec_unreal_python(params.0).await
    }

    #[tool(
        description = "List Unreal Editor instances that answer remote execution discovery."
    )]
    pub async fn list_unreal_instances(&self) -> String {
        self.remote_tools.list_unreal_instances().await
    }

    #[tool(
        description = "Fetch a fresh table of contents of the Unreal Python API from the running editor and rebuild the local index. Run this once before using the other tools, and again after enabling new plugins."
    )]
    pub async fn refresh_api_cache(&self) -> String {
        self.cache_tools.refresh_api_cache().await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for UnrealPythonService {
    fn get_info(&self) -> ServerInfo {
        let templates: Vec<String> = ApiResource::templates()
            .into_iter()
            .map(|(uri, name, _)| format!("{uri} ({name})"))
            .collect();

        ServerInfo {
            server_info: Implementation::from_build_env(),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            instructions: Some(format!(
                "MCP server for the Unreal Editor Python API. Start with the unreal-python://index/summary resource for category counts and the largest modules, then drill down with list_modules, get_module_index or search_unreal_api. Use get_class_overview for member names and get_member_info for details on specific members. If the cache is empty, run refresh_api_cache with Unreal Editor running. Resource templates: {}.",
                templates.join(", ")
            )),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resources = ApiResource::listed()
            .into_iter()
            .map(|(resource, name, description)| {
                let mut raw = RawResource::new(resource.uri(), name.to_string());
                raw.description = Some(description.to_string());
                raw.mime_type = Some("text/markdown".to_string());
                raw.no_annotation()
            })
            .collect();

        Ok(ListResourcesResult {
            resources,
            next_cursor: None,
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        let uri = request.uri;
        match self.read_resource_text(&uri).await {
            Some(text) => Ok(ReadResourceResult {
                contents: vec![ResourceContents::text(text, uri)],
            }),
            None => Err(McpError::resource_not_found(
                format!("Unknown resource: {uri}"),
                Some(serde_json::json!({ "uri": uri })),
            )),
        }
    }
}
