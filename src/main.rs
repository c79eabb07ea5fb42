//! wesign-mcp: MCP gateway for the WeSign document-signing API.
//!
//! Runs either the stdio MCP server (default) or the HTTP adapters.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use wesign_mcp::config::{self, Config};
use wesign_mcp::http::{self, AppState};
use wesign_mcp::mcp::{McpHandler, McpServer, ResourceCatalog};
use wesign_mcp::tools::{auth, ToolRegistry};
use wesign_mcp::wesign::WeSignClient;

/// MCP gateway for the WeSign document-signing API.
///
/// Exposes WeSign operations as MCP tools over stdio, or over HTTP as
/// JSON-RPC, server-sent events and a plain REST endpoint.
#[derive(Parser, Debug)]
#[command(name = "wesign-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Mode {
    /// Serve MCP over stdin/stdout (default)
    Stdio,
    /// Serve the JSON-RPC, SSE and REST adapters over HTTP
    Http {
        /// Interface to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides server.port and PORT)
        #[arg(long)]
        port: Option<u16>,
    },
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. Logs go to stderr; stdout carries
/// the stdio protocol.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the shared handler and runs the selected front door.
async fn run(cfg: Config, mode: Mode) -> std::io::Result<()> {
    let client = WeSignClient::new(
        &cfg.api_url,
        Duration::from_secs(cfg.request_timeout_secs),
    )
    .map_err(std::io::Error::other)?;
    let client = Arc::new(client);
    info!(api = client.base_url(), "WeSign client ready");

    let credentials = cfg.credentials();
    if let Some(credentials) = &credentials {
        match auth::auto_login(&client, credentials).await {
            Ok(outcome) if outcome.success => info!("Auto-login successful"),
            Ok(outcome) => error!(message = %outcome.message, "Auto-login failed"),
            Err(e) => error!(error = %e, "Auto-login error"),
        }
    }

    let registry = Arc::new(ToolRegistry::new(client));
    info!(tools = registry.definitions().len(), "Tool catalog loaded");
    let handler = McpHandler::new(
        registry,
        Arc::new(ResourceCatalog::new(cfg.resources_dir.clone())),
    );

    match mode {
        Mode::Stdio => {
            info!("MCP server ready on stdio, waiting for client connection...");
            McpServer::stdio(handler).run().await
        }
        Mode::Http { host, port } => {
            let host = host.unwrap_or(cfg.server.host);
            let port = port.unwrap_or(cfg.server.port);
            http::serve(&host, port, AppState::new(handler, credentials)).await
        }
    }
}

/// Entry point for the wesign-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let config_path = args.config.as_deref();
    let cfg = match config::load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            if config_path.is_none() {
                if let Some(default_path) = config::default_config_path() {
                    eprintln!("\nDefault config location: {}", default_path.display());
                    eprintln!("Create one based on config/example-config.json");
                }
            }
            return ExitCode::FAILURE;
        }
    };

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting wesign-mcp server"
    );

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let mode = args.mode.unwrap_or(Mode::Stdio);
    match runtime.block_on(run(cfg, mode)) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_quiet_wins() {
        assert_eq!(get_log_level(3, true, "trace"), Level::ERROR);
    }

    #[test]
    fn log_level_from_verbosity() {
        assert_eq!(get_log_level(1, false, "error"), Level::INFO);
        assert_eq!(get_log_level(2, false, "error"), Level::DEBUG);
        assert_eq!(get_log_level(5, false, "error"), Level::TRACE);
    }

    #[test]
    fn log_level_from_config() {
        assert_eq!(get_log_level(0, false, "DEBUG"), Level::DEBUG);
        assert_eq!(get_log_level(0, false, "loud"), Level::WARN);
    }

    #[test]
    fn default_mode_is_stdio() {
        let args = Args::parse_from(["wesign-mcp"]);
        assert!(args.mode.is_none());
    }

    #[test]
    fn http_mode_takes_overrides() {
        let args = Args::parse_from(["wesign-mcp", "-v", "http", "--port", "8080"]);
        assert_eq!(args.verbose, 1);
        assert_eq!(
            args.mode,
            Some(Mode::Http {
                host: None,
                port: Some(8080)
            })
        );
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
