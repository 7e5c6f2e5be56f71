//! MCP Server for LocalSearch
//!
//! Provides a Model Context Protocol server exposing code search, file
//! reading, and file inspection tools backed by the LocalSearch REST API.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod client;
mod error;
mod server;
mod tool;

pub use error::{McpError, Result};
pub use server::run_mcp_server;
