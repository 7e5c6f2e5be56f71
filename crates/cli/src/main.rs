//! LocalSearch CLI - ripgrep-backed code search over local repositories
//!
//! This binary provides the command-line interface for the localsearch
//! system: the HTTP API server and the MCP stdio adapter.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use localsearch_core::config::{McpConfig, ServerConfig};

#[derive(Parser)]
#[command(name = "localsearch")]
#[command(about = "Local code search API and MCP adapter")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Listen port (overrides LOCALSEARCH_PORT)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Start the MCP stdio adapter
    Mcp {
        /// Base URL of the API server (overrides LOCALSEARCH_API_URL)
        #[arg(long)]
        api_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Some(Commands::Serve { port }) => serve(port).await,
        Some(Commands::Mcp { api_url }) => mcp(api_url).await,
        None => {
            println!(
                "Run 'localsearch serve' to start the API server, \
                'localsearch mcp' for the MCP adapter, or --help for more options"
            );
            Ok(())
        }
    }
}

/// Initialize logging system
///
/// Logs go to stderr because the MCP adapter owns stdout for the
/// protocol stream. `RUST_LOG` overrides the default filter.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        format!(
            "localsearch={level},localsearch_core={level},localsearch_files={level},\
            localsearch_search={level},localsearch_server={level},localsearch_mcp_server={level}"
        )
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Start the HTTP API server
async fn serve(port_override: Option<u16>) -> Result<()> {
    let mut config = ServerConfig::from_env().context("Failed to load server configuration")?;
    if let Some(port) = port_override {
        config.port = port;
    }

    localsearch_server::run_server(config)
        .await
        .map_err(|e| anyhow!("Server error: {e}"))
}

/// Start the MCP stdio adapter
async fn mcp(api_url_override: Option<String>) -> Result<()> {
    let mut config = McpConfig::from_env();
    if let Some(api_url) = api_url_override {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }

    localsearch_mcp_server::run_mcp_server(config)
        .await
        .map_err(|e| anyhow!("MCP server error: {e}"))
}
