//! The contract every remote execution backend fulfils
//!
//! Only [`RemoteExecutor::execute_code`] and
//! [`RemoteExecutor::discover_instances`] are transport specific. The
//! documentation fetches are built on top of code execution: each one runs a
//! fixed snippet from [`scripts`](super::scripts) and extracts the JSON object
//! it prints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use super::scripts;

/// Default bound for a single remote execution
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(5);

/// How long discovery waits for instances to answer
pub const DEFAULT_DISCOVERY_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no remote executor is configured")]
    NotConfigured,

    #[error("could not connect to Unreal Editor: {0}")]
    Unavailable(String),

    #[error("execution timed out after {} seconds", .0.as_secs_f64())]
    TimedOut(Duration),

    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

/// Result of code that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutput {
    Output(String),
    NoOutput,
}

impl ExecutionOutput {
    pub fn from_lines(lines: Vec<String>) -> Self {
        if lines.is_empty() {
            ExecutionOutput::NoOutput
        } else {
            ExecutionOutput::Output(lines.join("\n"))
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            ExecutionOutput::Output(text) => Some(text),
            ExecutionOutput::NoOutput => None,
        }
    }
}

impl fmt::Display for ExecutionOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionOutput::Output(text) => f.write_str(text),
            ExecutionOutput::NoOutput => f.write_str("(no output)"),
        }
    }
}

/// One log entry produced while a command ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEntry {
    #[serde(rename = "type", default = "default_output_type")]
    pub kind: String,
    #[serde(default)]
    pub output: String,
}

fn default_output_type() -> String {
    "Info".to_string()
}

/// Structured result of a remote command as reported by the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub output: Vec<OutputEntry>,
}

impl CommandResult {
    /// Render log entries and the result value, one per line.
    ///
    /// Warnings and errors are prefixed; a `None` result is dropped. A failed
    /// command becomes [`RemoteError::ExecutionFailed`] carrying everything
    /// that was printed before the failure.
    pub fn into_output(self) -> Result<ExecutionOutput, RemoteError> {
        let mut lines: Vec<String> = self
            .output
            .into_iter()
            .map(|entry| match entry.kind.as_str() {
                "Warning" => format!("Warning: {}", entry.output),
                "Error" => format!("Error: {}", entry.output),
                _ => entry.output,
            })
            .collect();

        let result = self.result.filter(|value| !value.is_empty() && value != "None");

        if self.success {
            lines.extend(result);
            Ok(ExecutionOutput::from_lines(lines))
        } else {
            if let Some(message) = result {
                lines.push(format!("Execution failed: {message}"));
            }
            Err(RemoteError::ExecutionFailed(lines.join("\n")))
        }
    }
}

/// A running editor instance that answered discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteInstance {
    #[serde(alias = "node_id")]
    pub identifier: String,
    #[serde(default = "unknown")]
    pub project_name: String,
    #[serde(default = "unknown")]
    pub engine_version: String,
}

fn unknown() -> String {
    "Unknown".to_string()
}

/// Extract the JSON object embedded in command output.
///
/// Takes everything from the first `{` to the last `}` and returns it only if
/// it parses as JSON. Output starting with `Error` is never a payload.
pub fn extract_json_object(output: &str) -> Option<&str> {
    if output.starts_with("Error") {
        return None;
    }
    let start = output.find('{')?;
    let end = output.rfind('}')?;
    if end < start {
        return None;
    }
    let candidate = &output[start..=end];
    serde_json::from_str::<serde_json::Value>(candidate).ok()?;
    Some(candidate)
}

/// Runs code inside, and queries, a live editor instance
#[async_trait]
pub trait RemoteExecutor: Send + Sync + fmt::Debug {
    /// Run `source` and collect its output, giving up after `timeout`
    async fn execute_code(
        &self,
        source: &str,
        timeout: Duration,
    ) -> Result<ExecutionOutput, RemoteError>;

    /// Best-effort discovery; empty when nothing answers in time
    async fn discover_instances(&self) -> Vec<RemoteInstance>;

    /// Timeout used by the documentation fetches
    fn default_timeout(&self) -> Duration {
        DEFAULT_EXECUTION_TIMEOUT
    }

    /// Fetch the full table of contents as JSON text
    async fn fetch_table_of_contents(&self) -> Result<String, RemoteError> {
        let output = self
            .execute_code(scripts::TABLE_OF_CONTENTS, self.default_timeout())
            .await?;
        output
            .text()
            .and_then(extract_json_object)
            .map(str::to_string)
            .ok_or_else(|| {
                RemoteError::MalformedPayload(
                    "table of contents output did not contain a JSON object".to_string(),
                )
            })
    }

    /// Fetch `{name, doc, bases}` for a class
    async fn fetch_class_basic_info(&self, class_name: &str) -> Option<String> {
        let source = scripts::class_basic_info(class_name)?;
        self.fetch_json(&source).await
    }

    /// Fetch documentation for one member of a class
    async fn fetch_member_info(&self, class_name: &str, member_name: &str) -> Option<String> {
        let source = scripts::member_info(class_name, member_name)?;
        self.fetch_json(&source).await
    }

    /// Fetch the full class document
    async fn fetch_class_document(&self, class_name: &str) -> Option<String> {
        let source = scripts::class_document(class_name)?;
        self.fetch_json(&source).await
    }

    /// Run a snippet and return the JSON object it printed, if any
    async fn fetch_json(&self, source: &str) -> Option<String> {
        match self.execute_code(source, self.default_timeout()).await {
            Ok(output) => output.text().and_then(extract_json_object).map(str::to_string),
            Err(e) => {
                tracing::debug!("Remote fetch failed: {}", e);
                None
            }
        }
    }
}
