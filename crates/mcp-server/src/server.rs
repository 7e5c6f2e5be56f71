//! MCP server implementation for LocalSearch
//!
//! Implements the MCP server with the search_code, read_file,
//! get_file_info, and health_check tools using the rmcp SDK with
//! stdio transport.

use crate::client::ApiClient;
use crate::error::McpError;
use crate::tool::{GetFileInfoInput, ReadFileInput, SearchCodeInput};
use localsearch_core::config::McpConfig;
use localsearch_core::models::{FileSnippet, SearchMatch};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorData, Implementation, ProtocolVersion, ServerCapabilities,
        ServerInfo,
    },
    tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use tracing::info;

/// MCP server bridging LLM tool calls to the LocalSearch REST API
#[derive(Clone)]
pub struct LocalSearchMcpServer {
    tool_router: ToolRouter<Self>,
    client: ApiClient,
}

impl std::fmt::Debug for LocalSearchMcpServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSearchMcpServer")
            .field("client", &self.client)
            .finish()
    }
}

impl LocalSearchMcpServer {
    /// Create a new MCP server instance
    pub(crate) fn new(client: ApiClient) -> Self {
        Self {
            tool_router: Self::tool_router(),
            client,
        }
    }
}

#[tool_router]
impl LocalSearchMcpServer {
    /// Search for code across the configured repository roots.
    #[tool(
        name = "search_code",
        description = "Search for code across local repositories using text or regex patterns. Returns file paths, line numbers, and matching text. Use this to find functions, classes, error messages, or any code pattern."
    )]
    async fn search_code(
        &self,
        Parameters(input): Parameters<SearchCodeInput>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("Executing search_code: query={}", input.query);

        match self.client.search(&input.query, input.max_results).await {
            Ok(response) => Ok(CallToolResult::success(vec![Content::text(
                render_search_results(&response.query, response.count, &response.results),
            )])),
            Err(err) => Ok(tool_error(&err)),
        }
    }

    /// Read a line range from a file found through search_code.
    #[tool(
        name = "read_file",
        description = "Read a specific file snippet by line range. Use this after search_code to get more context around the code you found. Provide the exact file path from search results."
    )]
    async fn read_file(
        &self,
        Parameters(input): Parameters<ReadFileInput>,
    ) -> Result<CallToolResult, ErrorData> {
        info!(
            "Executing read_file: path={}, lines {}-{}",
            input.path, input.start, input.end
        );

        match self
            .client
            .read_file(&input.path, input.start, input.end)
            .await
        {
            Ok(snippet) => Ok(CallToolResult::success(vec![Content::text(
                render_snippet(&snippet),
            )])),
            Err(err) => Ok(tool_error(&err)),
        }
    }

    /// Inspect a file without reading its content.
    #[tool(
        name = "get_file_info",
        description = "Get metadata about a file (existence, size, line count, binary flag) without reading its content. Use this to check a file before requesting a snippet."
    )]
    async fn get_file_info(
        &self,
        Parameters(input): Parameters<GetFileInfoInput>,
    ) -> Result<CallToolResult, ErrorData> {
        info!("Executing get_file_info: path={}", input.path);

        match self.client.file_info(&input.path).await {
            Ok(file_info) => match serde_json::to_string_pretty(&file_info) {
                Ok(rendered) => Ok(CallToolResult::success(vec![Content::text(rendered)])),
                Err(err) => Ok(tool_error(&McpError::Serialization(err))),
            },
            Err(err) => Ok(tool_error(&err)),
        }
    }

    /// Probe the REST API for liveness and ripgrep availability.
    #[tool(
        name = "health_check",
        description = "Check if the LocalSearch API is running and available"
    )]
    async fn health_check(&self) -> Result<CallToolResult, ErrorData> {
        info!("Executing health_check");

        match self.client.health().await {
            Ok(health) => Ok(CallToolResult::success(vec![Content::text(format!(
                "LocalSearch API Status: {}\nRipgrep installed: {}\nRepositories: {}",
                health.status, health.ripgrep_installed, health.repo_count
            ))])),
            Err(err) => Ok(CallToolResult::error(vec![Content::text(format!(
                "LocalSearch API is not available: {err}"
            ))])),
        }
    }
}

#[tool_handler]
impl ServerHandler for LocalSearchMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "localsearch-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            instructions: Some(
                "Local code search over the configured repositories. \
                Use search_code to find functions, strings, and keywords, \
                read_file to inspect the lines around a match, and \
                get_file_info to check a file before reading it."
                    .to_string(),
            ),
        }
    }
}

/// Tool failures surface as isError results so the model can read and
/// react to them instead of the call dying in the transport.
fn tool_error(err: &McpError) -> CallToolResult {
    CallToolResult::error(vec![Content::text(err.to_tool_error_message())])
}

fn render_search_results(query: &str, count: usize, results: &[SearchMatch]) -> String {
    if results.is_empty() {
        return format!("No results found for query: \"{query}\"");
    }

    let formatted: Vec<String> = results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "{}. {}:{}\n   {}",
                i + 1,
                result.path,
                result.line,
                result.text
            )
        })
        .collect();

    format!("Found {count} results:\n\n{}", formatted.join("\n\n"))
}

/// Renders the effective range, so a clamped `end` shows what was
/// actually returned rather than what was asked for.
fn render_snippet(snippet: &FileSnippet) -> String {
    format!(
        "File: {}\nLines: {}-{} (total: {})\n\n{}",
        snippet.path, snippet.start, snippet.end, snippet.total_lines, snippet.snippet
    )
}

/// Run the MCP server with stdio transport
///
/// This is the main entry point for the `localsearch mcp` command.
/// It serves tool calls against the configured REST API until the
/// client disconnects.
pub async fn run_mcp_server(config: McpConfig) -> crate::Result<()> {
    info!("Starting MCP server against {}", config.api_url);

    let client = ApiClient::new(config.api_url)?;
    let server = LocalSearchMcpServer::new(client);

    // Start server with stdio transport
    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| McpError::Transport(e.to_string()))?;

    info!("MCP server started, waiting for client requests");

    // Wait for the server to complete (client disconnect or error)
    service
        .waiting()
        .await
        .map_err(|e| McpError::Transport(e.to_string()))?;

    info!("MCP server shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn search_rendering_numbers_matches() {
        let results = vec![
            SearchMatch {
                path: "/repo/a.ts".to_string(),
                line: 10,
                text: "function getUserInfo() {".to_string(),
            },
            SearchMatch {
                path: "/repo/b.ts".to_string(),
                line: 3,
                text: "getUserInfo();".to_string(),
            },
        ];

        let rendered = render_search_results("getUserInfo", 2, &results);

        assert_eq!(
            rendered,
            "Found 2 results:\n\n\
             1. /repo/a.ts:10\n   function getUserInfo() {\n\n\
             2. /repo/b.ts:3\n   getUserInfo();"
        );
    }

    #[test]
    fn search_rendering_reports_empty_result() {
        let rendered = render_search_results("nothing", 0, &[]);
        assert_eq!(rendered, "No results found for query: \"nothing\"");
    }

    #[test]
    fn snippet_rendering_shows_effective_range() {
        let snippet = FileSnippet {
            path: "/repo/a.ts".to_string(),
            start: 48,
            end: 50,
            snippet: "line 48\nline 49\nline 50".to_string(),
            total_lines: 50,
        };

        let rendered = render_snippet(&snippet);

        assert_eq!(
            rendered,
            "File: /repo/a.ts\nLines: 48-50 (total: 50)\n\nline 48\nline 49\nline 50"
        );
    }
}
