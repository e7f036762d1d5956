//! Remote execution through an external helper process
//!
//! The editor's remote-execution protocol is spoken by a separate helper
//! program. For every execution the helper is spawned, receives the Python
//! source on stdin and prints what the editor produced on stdout:
//!
//! - exit status 0: the code ran; stdout is either plain text or a JSON
//!   [`CommandResult`] (`{"success", "result", "output": [...]}`)
//! - exit status 3: no editor instance could be reached
//! - any other status: the code failed to run; stderr carries the reason
//!
//! Discovery uses an optional second helper that prints the answering
//! instances as a JSON array or as one JSON object per line.

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::executor::{
    CommandResult, DEFAULT_DISCOVERY_WINDOW, DEFAULT_EXECUTION_TIMEOUT, ExecutionOutput,
    RemoteError, RemoteExecutor, RemoteInstance,
};

/// Exit status a helper uses to report that no editor answered
pub const EXIT_UNREACHABLE: i32 = 3;

/// A program plus its fixed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a whitespace-separated command line, expanding `~` and
    /// environment variables in the program path
    ///
    /// Quoting is not supported; use [`Self::with_args`] for paths or
    /// arguments that contain spaces.
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(program) = parts.next() else {
            bail!("Command line cannot be empty");
        };
        let program = shellexpand::full(program)?.into_owned();
        Ok(Self {
            program,
            args: parts.map(String::from).collect(),
        })
    }

    /// Take `program` verbatim (apart from `~` and variable expansion) with
    /// explicit arguments
    pub fn with_args(program: &str, args: Vec<String>) -> Result<Self> {
        if program.trim().is_empty() {
            bail!("Command line cannot be empty");
        }
        Ok(Self {
            program: shellexpand::full(program)?.into_owned(),
            args,
        })
    }

    /// [`Self::parse`] when no explicit arguments are given, otherwise
    /// [`Self::with_args`]
    pub fn from_parts(command: &str, args: &[String]) -> Result<Self> {
        if args.is_empty() {
            Self::parse(command)
        } else {
            Self::with_args(command, args.to_vec())
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        command
    }
}

/// [`RemoteExecutor`] backed by helper processes
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    exec: CommandLine,
    discover: Option<CommandLine>,
    timeout: Duration,
    discovery_window: Duration,
}

impl CommandExecutor {
    pub fn new(exec: CommandLine) -> Self {
        Self {
            exec,
            discover: None,
            timeout: DEFAULT_EXECUTION_TIMEOUT,
            discovery_window: DEFAULT_DISCOVERY_WINDOW,
        }
    }

    pub fn with_discovery(mut self, discover: CommandLine) -> Self {
        self.discover = Some(discover);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_discovery_window(mut self, window: Duration) -> Self {
        self.discovery_window = window;
        self
    }

    async fn run(&self, source: &str) -> Result<Output, RemoteError> {
        let mut child = self
            .exec
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                RemoteError::Unavailable(format!(
                    "failed to start '{}': {e}",
                    self.exec.program
                ))
            })?;

        // Feed stdin while draining stdout/stderr; the exit status decides the outcome
        let stdin = child.stdin.take();
        let send = async move {
            match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()).await,
                None => Ok(()),
            }
        };
        let (sent, output) = tokio::join!(send, child.wait_with_output());
        let output = output.map_err(|e| RemoteError::ExecutionFailed(e.to_string()))?;

        match sent {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                tracing::debug!("Helper exited before reading all of the code");
            }
            Err(e) => tracing::warn!("Failed to send code to helper: {}", e),
            Ok(()) => {}
        }
        Ok(output)
    }
}

/// Map a finished helper process onto the execution contract
fn interpret_output(output: Output) -> Result<ExecutionOutput, RemoteError> {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    match output.status.code() {
        Some(0) => {
            let text = stdout.trim_end();
            if let Ok(result) = serde_json::from_str::<CommandResult>(text) {
                return result.into_output();
            }
            if text.trim().is_empty() {
                Ok(ExecutionOutput::NoOutput)
            } else {
                Ok(ExecutionOutput::Output(text.to_string()))
            }
        }
        Some(EXIT_UNREACHABLE) => Err(RemoteError::Unavailable(
            non_empty(&stderr).unwrap_or("no editor instance answered").to_string(),
        )),
        code => {
            let reason = non_empty(&stderr)
                .or_else(|| non_empty(&stdout))
                .map(str::to_string)
                .unwrap_or_else(|| match code {
                    Some(code) => format!("helper exited with status {code}"),
                    None => "helper was terminated by a signal".to_string(),
                });
            Err(RemoteError::ExecutionFailed(reason))
        }
    }
}

fn non_empty(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Parse discovery output, dropping duplicates and entries without an id
fn parse_instances(text: &str) -> Vec<RemoteInstance> {
    let candidates: Vec<RemoteInstance> = match serde_json::from_str(text.trim()) {
        Ok(instances) => instances,
        Err(_) => text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect(),
    };

    let mut instances: Vec<RemoteInstance> = Vec::with_capacity(candidates.len());
    for instance in candidates {
        if instance.identifier.is_empty()
            || instances
                .iter()
                .any(|seen| seen.identifier == instance.identifier)
        {
            continue;
        }
        instances.push(instance);
    }
    instances
}

#[async_trait]
impl RemoteExecutor for CommandExecutor {
    async fn execute_code(
        &self,
        source: &str,
        timeout: Duration,
    ) -> Result<ExecutionOutput, RemoteError> {
        tracing::debug!(
            "Executing {} bytes of Python via {}",
            source.len(),
            self.exec.program
        );
        let output = tokio::time::timeout(timeout, self.run(source))
            .await
            .map_err(|_| RemoteError::TimedOut(timeout))??;
        interpret_output(output)
    }

    async fn discover_instances(&self) -> Vec<RemoteInstance> {
        let Some(discover) = &self.discover else {
            tracing::debug!("No discovery command configured");
            return Vec::new();
        };

        let mut command = discover.command();
        command.stdin(Stdio::null());

        match tokio::time::timeout(self.discovery_window, command.output()).await {
            Ok(Ok(output)) if output.status.success() => {
                parse_instances(&String::from_utf8_lossy(&output.stdout))
            }
            Ok(Ok(output)) => {
                tracing::debug!("Discovery helper exited with {}", output.status);
                Vec::new()
            }
            Ok(Err(e)) => {
                tracing::debug!("Failed to run discovery helper: {}", e);
                Vec::new()
            }
            Err(_) => {
                tracing::debug!(
                    "No discovery answer within {:?}",
                    self.discovery_window
                );
                Vec::new()
            }
        }
    }

    fn default_timeout(&self) -> Duration {
        self.timeout
    }
}
