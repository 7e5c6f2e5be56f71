//! File access for the localsearch proxy
//!
//! Two operations over the allowed repository roots: [`read_snippet`]
//! extracts a bounded 1-based line range from a text file, and
//! [`file_info`] probes metadata without returning content. Both consult
//! the path guard before touching the filesystem.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod info;
mod read;

pub use info::file_info;
pub use read::{read_snippet, MAX_SNIPPET_LINES};

// Re-export error types from core
pub use localsearch_core::error::{Error, Result};
