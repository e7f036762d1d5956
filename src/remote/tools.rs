use std::sync::Arc;

use rmcp::schemars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::remote::{RemoteError, RemoteExecutor, RemoteInstance};

const ENABLE_REMOTE_EXECUTION_HINT: &str = "Make sure:\n  - Unreal Editor is running\n  - Python plugin is enabled\n  - 'Enable Remote Execution' is checked in Editor Preferences > Plugins > Python";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExecPythonParams {
    #[schemars(description = "Python code to execute in Unreal Editor")]
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct RemoteTools {
    remote: Option<Arc<dyn RemoteExecutor>>,
}

impl RemoteTools {
    pub fn new(remote: Option<Arc<dyn RemoteExecutor>>) -> Self {
        Self { remote }
    }

    pub async fn exec_unreal_python(&self, params: ExecPythonParams) -> String {
        let Some(remote) = &self.remote else {
            return render_execution_error(&RemoteError::NotConfigured);
        };

        match remote.execute_code(&params.code, remote.default_timeout()).await {
            Ok(output) => output.to_string(),
            Err(e) => {
                tracing::warn!("Remote execution failed: {}", e);
                render_execution_error(&e)
            }
        }
    }

    pub async fn list_unreal_instances(&self) -> String {
        let instances = match &self.remote {
            Some(remote) => remote.discover_instances().await,
            None => Vec::new(),
        };
        render_instances(&instances)
    }
}

fn render_execution_error(error: &RemoteError) -> String {
    match error {
        RemoteError::NotConfigured => "Error: Remote execution is not configured.\nStart the server with --exec-command (or UNREAL_PYTHON_MCP_EXEC_COMMAND) pointing at a remote execution helper.".to_string(),
        RemoteError::Unavailable(reason) => {
            format!("Error: Could not connect to Unreal Editor ({reason}).\n{ENABLE_REMOTE_EXECUTION_HINT}")
        }
        RemoteError::TimedOut(timeout) => format!(
            "Error: Execution timed out after {} seconds.",
            timeout.as_secs_f64()
        ),
        RemoteError::ExecutionFailed(output) => output.clone(),
        RemoteError::MalformedPayload(reason) => format!("Error during execution: {reason}"),
    }
}

fn render_instances(instances: &[RemoteInstance]) -> String {
    if instances.is_empty() {
        return format!("No Unreal Editor instances found.\n{ENABLE_REMOTE_EXECUTION_HINT}");
    }

    let mut lines = vec![format!("Found {} instance(s):", instances.len())];
    lines.extend(instances.iter().map(|instance| {
        format!(
            "  - {} (Unreal {})",
            instance.project_name, instance.engine_version
        )
    }));
    lines.join("\n")
}
