//! HTTP client for the LocalSearch REST API

use crate::error::{McpError, Result};
use localsearch_core::models::{FileInfo, FileSnippet, SearchMatch};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Budget for one API round trip. The server's per-root search timeout
/// normally fires first, but a sequential scan over many roots can
/// outlast it.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Response payload of `POST /search`
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub query: String,
    pub count: usize,
    pub results: Vec<SearchMatch>,
}

/// Response payload of `GET /health`
#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub status: String,
    pub ripgrep_installed: bool,
    pub repo_count: usize,
}

/// Thin client over the REST API endpoints used by the MCP tools
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the API at `base_url`
    pub(crate) fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| McpError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub(crate) async fn search(
        &self,
        query: &str,
        max_results: Option<u32>,
    ) -> Result<SearchResponse> {
        let mut body = json!({ "query": query });
        if let Some(max_results) = max_results {
            body["max_results"] = json!(max_results);
        }
        self.post("/search", &body).await
    }

    pub(crate) async fn read_file(&self, path: &str, start: u64, end: u64) -> Result<FileSnippet> {
        self.post("/file", &json!({ "path": path, "start": start, "end": end }))
            .await
    }

    pub(crate) async fn file_info(&self, path: &str) -> Result<FileInfo> {
        self.post("/file-info", &json!({ "path": path })).await
    }

    pub(crate) async fn health(&self) -> Result<HealthResponse> {
        let url = format!("{}/health", self.base_url);
        debug!("GET {url}");

        let response = self.client.get(&url).send().await?;
        Self::parse(response).await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &serde_json::Value,
    ) -> Result<T> {
        let url = format!("{}{endpoint}", self.base_url);
        debug!("POST {url}");

        let response = self.client.post(&url).json(body).send().await?;
        Self::parse(response).await
    }

    async fn parse<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(McpError::Api(format!(
                "{status}: {}",
                extract_error_message(&error_text)
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Pulls the `error` field (plus any validation detail messages) out of
/// an API error body, falling back to the raw body when it is not the
/// expected JSON shape.
fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.to_string();
    };
    let Some(error) = value.get("error").and_then(|e| e.as_str()) else {
        return body.to_string();
    };

    match value.get("details").and_then(|d| d.as_array()) {
        Some(details) => {
            let messages: Vec<&str> = details
                .iter()
                .filter_map(|detail| detail.get("message").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                error.to_string()
            } else {
                format!("{error}: {}", messages.join("; "))
            }
        }
        None => error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_message_uses_the_error_field() {
        let body = r#"{"success":false,"error":"Access denied: path is outside allowed repositories"}"#;
        assert_eq!(
            extract_error_message(body),
            "Access denied: path is outside allowed repositories"
        );
    }

    #[test]
    fn error_message_appends_validation_details() {
        let body = r#"{
            "success": false,
            "error": "Validation error",
            "details": [
                {"field": "start", "message": "start must be >= 1"},
                {"field": "end", "message": "end must be between 1 and 1000"}
            ]
        }"#;
        assert_eq!(
            extract_error_message(body),
            "Validation error: start must be >= 1; end must be between 1 and 1000"
        );
    }

    #[test]
    fn error_message_falls_back_to_raw_body() {
        assert_eq!(extract_error_message("boom"), "boom");
        assert_eq!(extract_error_message(r#"{"status":500}"#), r#"{"status":500}"#);
    }
}
