use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rmcp::{ServiceExt, transport::stdio};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use unreal_python_mcp::UnrealPythonService;
use unreal_python_mcp::cache::outputs::RefreshOutput;
use unreal_python_mcp::cache::tools::REFRESH_CHECKLIST;
use unreal_python_mcp::remote::{CommandExecutor, CommandLine, RemoteExecutor};

/// MCP server for the Unreal Editor Python API with an offline documentation cache
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom cache directory path (defaults to ~/.unreal-python-mcp/cache)
    #[arg(long, env = "UNREAL_PYTHON_MCP_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Helper command that runs Python source from stdin inside Unreal Editor,
    /// split on whitespace (no quoting)
    #[arg(long, env = "UNREAL_PYTHON_MCP_EXEC_COMMAND")]
    exec_command: Option<String>,

    /// Argument for the exec helper, repeatable. When given, --exec-command is
    /// taken as the program path verbatim instead of being split on whitespace
    #[arg(long = "exec-arg", value_name = "ARG", allow_hyphen_values = true)]
    exec_args: Vec<String>,

    /// Helper command that prints discovered editor instances as JSON
    #[arg(long, env = "UNREAL_PYTHON_MCP_DISCOVER_COMMAND")]
    discover_command: Option<String>,

    /// Argument for the discovery helper, repeatable; see --exec-arg
    #[arg(long = "discover-arg", value_name = "ARG", allow_hyphen_values = true)]
    discover_args: Vec<String>,

    /// Remote execution timeout in seconds
    #[arg(long, env = "UNREAL_PYTHON_MCP_TIMEOUT", default_value_t = 5.0)]
    timeout: f64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the API table of contents from a running editor and rebuild the cache
    Refresh,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing to stderr to avoid conflicts with stdio transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let remote = build_remote(&args)?;
    if remote.is_none() {
        tracing::info!("No exec command configured; remote execution is disabled");
    }
    if let Some(ref cache_dir) = args.cache_dir {
        tracing::info!("Using custom cache directory: {}", cache_dir.display());
    }

    let service = UnrealPythonService::new(args.cache_dir, remote)?;

    if let Some(command) = args.command {
        return handle_command(command, &service).await;
    }

    tracing::info!("Starting Unreal Python MCP server on stdio...");

    let running = service.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    running.waiting().await?;
    Ok(())
}

fn build_remote(args: &Args) -> Result<Option<Arc<dyn RemoteExecutor>>> {
    let Some(exec_command) = args.exec_command.as_deref() else {
        return Ok(None);
    };

    if !args.timeout.is_finite() || args.timeout <= 0.0 {
        bail!("--timeout must be a positive number of seconds");
    }

    let exec =
        CommandLine::from_parts(exec_command, &args.exec_args).context("Invalid --exec-command")?;
    let mut executor =
        CommandExecutor::new(exec).with_timeout(Duration::from_secs_f64(args.timeout));
    if let Some(discover_command) = args.discover_command.as_deref() {
        let discover = CommandLine::from_parts(discover_command, &args.discover_args)
            .context("Invalid --discover-command")?;
        executor = executor.with_discovery(discover);
    }

    let executor: Arc<dyn RemoteExecutor> = Arc::new(executor);
    Ok(Some(executor))
}

async fn handle_command(command: Commands, service: &UnrealPythonService) -> Result<()> {
    match command {
        Commands::Refresh => match service.refresh().await {
            RefreshOutput::Success {
                message,
                toc_entries,
            } => {
                println!("{message} ({toc_entries} entries)");
                Ok(())
            }
            RefreshOutput::Error { error } => {
                eprintln!("{error}");
                if !error.contains(REFRESH_CHECKLIST) {
                    eprintln!("{REFRESH_CHECKLIST}");
                }
                process::exit(1);
            }
        },
    }
}
