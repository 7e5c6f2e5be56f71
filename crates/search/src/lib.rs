#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! Ripgrep-backed code search across the allowed repository roots
//!
//! [`search_code`] runs one `rg` invocation per configured root,
//! streams the JSON event output, and aggregates `match` events up to
//! a result cap. A failing root is logged and skipped so the aggregate
//! search degrades instead of aborting. [`is_ripgrep_installed`] is the
//! liveness probe the health endpoint reports on.

mod engine;
mod probe;

pub use engine::{sanitize_query, search_code, SearchOptions};
pub use probe::is_ripgrep_installed;

// Re-export error types from core
pub use localsearch_core::error::{Error, Result};
