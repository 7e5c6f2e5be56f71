//! MCP tool definitions for LocalSearch
//!
//! Defines the input schemas for the search and file-access tools.

use schemars::JsonSchema;
use serde::Deserialize;

/// Request schema for the search_code MCP tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchCodeInput {
    /// Text or pattern to look for.
    /// Examples: "getUserInfo", "function.*Login", "TODO"
    #[schemars(description = "Search query (text or regex pattern)")]
    pub query: String,

    /// Cap on returned matches, 1 to 100. Defaults to 30 when omitted.
    #[schemars(description = "Maximum number of results to return (default: 30, max: 100)")]
    pub max_results: Option<u32>,
}

/// Request schema for the read_file MCP tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadFileInput {
    #[schemars(description = "Absolute file path from search results")]
    pub path: String,

    /// 1-based first line of the range.
    #[schemars(description = "Start line number (1-based)")]
    pub start: u64,

    /// 1-based last line of the range, inclusive. At most 200 lines per call.
    #[schemars(description = "End line number (max 200 lines per request)")]
    pub end: u64,
}

/// Request schema for the get_file_info MCP tool
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetFileInfoInput {
    #[schemars(description = "Absolute path of the file to inspect")]
    pub path: String,
}
