//! Core types for the localsearch code-search proxy
//!
//! This crate provides the foundations shared by the HTTP facade, the file
//! and search subsystems, and the MCP adapter:
//!
//! - **Access control**: path containment checks against the allowed roots
//! - **Models**: the wire-level search and file types
//! - **Configuration**: environment-driven process configuration
//! - **Error handling**: the unified error taxonomy
//!

pub mod access;
pub mod config;
pub mod error;
pub mod models;

// Re-export main types for convenience
pub use access::{is_path_allowed, normalize_path};
pub use config::{McpConfig, ServerConfig};
pub use error::{Error, Result, ResultExt};
pub use models::{FileInfo, FileSnippet, SearchMatch};
