//! Error types for the MCP server

use thiserror::Error;

/// Result type alias for MCP operations
pub type Result<T> = std::result::Result<T, McpError>;

/// Errors that can occur in the MCP server
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API request failed: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("MCP transport error: {0}")]
    Transport(String),
}

impl McpError {
    /// Convert to MCP tool error format (isError: true response)
    pub fn to_tool_error_message(&self) -> String {
        match self {
            McpError::Config(msg) => {
                format!("Configuration error: {msg}\n\nPlease check your LocalSearch configuration.")
            }
            McpError::Api(msg) => {
                format!("Error: {msg}")
            }
            McpError::Http(e) => {
                format!(
                    "Could not reach the LocalSearch API: {e}\n\n\
                    Hint: start the API server with 'localsearch serve' first."
                )
            }
            McpError::Serialization(e) => {
                format!("Failed to format results: {e}")
            }
            McpError::Transport(msg) => {
                format!("Transport error: {msg}")
            }
        }
    }
}
