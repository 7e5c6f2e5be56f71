//! HTTP server for local code search
//!
//! This crate provides the REST API that fronts ripgrep-backed search and
//! bounded file reads over the configured repository roots.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod metrics;
mod rest_server;

// Re-export error types from core
pub use localsearch_core::error::{Error, Result};

/// Run the REST API server with the given configuration.
///
/// This is the only public function in this crate. It:
/// 1. Probes for a usable ripgrep binary and warns if none is found
/// 2. Builds the router over the configured repository roots
/// 3. Binds the listener and serves until SIGINT or SIGTERM
///
/// # Arguments
///
/// * `config` - Server configuration with repository roots and port
///
/// # Returns
///
/// Returns `Ok(())` on clean shutdown, or an error if startup fails.
pub async fn run_server(config: localsearch_core::config::ServerConfig) -> Result<()> {
    rest_server::run_server_impl(config).await
}
