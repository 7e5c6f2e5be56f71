//! Configuration for the localsearch processes
//!
//! The environment is the whole configuration surface: `REPO_ROOTS` and
//! `LOCALSEARCH_PORT` for the HTTP facade, `LOCALSEARCH_API_URL` for the
//! MCP adapter. There are no configuration files.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default listen port for the HTTP facade
pub const DEFAULT_PORT: u16 = 3001;

/// Default facade base URL used by the MCP adapter
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Configuration for the HTTP facade process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Allowed repository roots; the entire accessible filesystem surface
    pub repo_roots: Vec<PathBuf>,
    /// Listen port, bound on 0.0.0.0
    pub port: u16,
}

impl ServerConfig {
    /// Load the facade configuration from the environment.
    ///
    /// Fails when `REPO_ROOTS` is unset or empty, or when
    /// `LOCALSEARCH_PORT` is not a valid port number.
    pub fn from_env() -> Result<Self> {
        let roots_raw = std::env::var("REPO_ROOTS").unwrap_or_default();
        let port_raw = std::env::var("LOCALSEARCH_PORT").ok();
        Self::from_values(&roots_raw, port_raw.as_deref())
    }

    fn from_values(roots_raw: &str, port_raw: Option<&str>) -> Result<Self> {
        let repo_roots = parse_repo_roots(roots_raw);
        if repo_roots.is_empty() {
            return Err(Error::config(
                "REPO_ROOTS environment variable is not set or empty",
            ));
        }

        let port = match port_raw {
            None => DEFAULT_PORT,
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::config(format!("invalid LOCALSEARCH_PORT value: {raw}")))?,
        };

        Ok(Self { repo_roots, port })
    }
}

/// Configuration for the MCP adapter process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpConfig {
    /// Base URL of the HTTP facade, without a trailing slash
    pub api_url: String,
}

impl McpConfig {
    /// Load the adapter configuration from the environment.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var("LOCALSEARCH_API_URL").ok().as_deref())
    }

    fn from_value(raw: Option<&str>) -> Self {
        let api_url = raw
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_API_URL);
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Split a raw `REPO_ROOTS` value into individual root paths.
///
/// Uses `;` as the separator when one is present (the Windows path-list
/// convention) and `:` otherwise. Entries are trimmed and empties dropped.
pub fn parse_repo_roots(raw: &str) -> Vec<PathBuf> {
    let separator = if raw.contains(';') { ';' } else { ':' };
    raw.split(separator)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect()
}
