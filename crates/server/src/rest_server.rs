//! REST API server implementation using Axum
//!
//! This module wires the search and file-access layers into the HTTP
//! endpoints, applies the CORS and body-size policy, and records
//! per-request metrics through a middleware layer.

use crate::metrics::Metrics;
use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use localsearch_core::config::ServerConfig;
use localsearch_core::error::{Error, Result, ResultExt};
use localsearch_core::models::{FileInfo, FileSnippet, SearchMatch};
use localsearch_files::{file_info, read_snippet};
use localsearch_search::{is_ripgrep_installed, search_code, SearchOptions};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected before parsing.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Wall-clock budget for each per-root ripgrep invocation.
const SEARCH_TIMEOUT: Duration = Duration::from_millis(5000);

/// Browser origins allowed to call the API.
const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:5678", "http://localhost:3978"];

/// Shared application state
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) repo_roots: Arc<Vec<PathBuf>>,
    pub(crate) metrics: Arc<Metrics>,
}

/// Build the Axum router with all endpoints and middleware
pub(crate) fn build_router(state: AppState) -> Router {
    Router::new()
        // Service information and health
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        // Search and file access
        .route("/search", post(search_handler))
        .route("/file", post(file_handler))
        .route("/file-info", post(file_info_handler))
        .layer(middleware::from_fn_with_state(state.clone(), track_requests))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            ALLOWED_ORIGINS.map(HeaderValue::from_static),
        ))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_max_results")]
    max_results: i64,
}

fn default_max_results() -> i64 {
    30
}

#[derive(Debug, Deserialize)]
struct FileRequest {
    path: String,
    start: i64,
    end: i64,
}

#[derive(Debug, Deserialize)]
struct FileInfoRequest {
    path: String,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
    success: bool,
    query: String,
    count: usize,
    results: Vec<SearchMatch>,
}

#[derive(Debug, Serialize)]
struct FileResponse {
    success: bool,
    #[serde(flatten)]
    snippet: FileSnippet,
}

#[derive(Debug, Serialize)]
struct FileInfoResponse {
    success: bool,
    #[serde(flatten)]
    info: FileInfo,
}

/// Turns a body-level rejection (malformed JSON, wrong types, missing
/// fields) into the same 400 shape as the field-level checks.
fn parse_body<T>(
    payload: std::result::Result<Json<T>, JsonRejection>,
) -> std::result::Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ApiError::validation("body", rejection.body_text())),
    }
}

/// POST /search
async fn search_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> std::result::Result<Json<SearchResponse>, ApiError> {
    let request = parse_body(payload)?;
    tracing::info!(
        "Search request: query='{}', max_results={}",
        request.query,
        request.max_results
    );

    let mut details = Vec::new();
    if !(1..=500).contains(&request.query.chars().count()) {
        details.push(ValidationDetail::new(
            "query",
            "query must be 1 to 500 characters",
        ));
    }
    if !(1..=100).contains(&request.max_results) {
        details.push(ValidationDetail::new(
            "max_results",
            "max_results must be between 1 and 100",
        ));
    }
    if !details.is_empty() {
        return Err(ApiError::Validation(details));
    }

    let options = SearchOptions {
        query: request.query.clone(),
        max_results: request.max_results as usize,
        timeout: SEARCH_TIMEOUT,
    };

    let started = Instant::now();
    match search_code(&state.repo_roots, &options).await {
        Ok(results) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            state
                .metrics
                .record_search(elapsed_ms, results.len(), true)
                .await;
            Ok(Json(SearchResponse {
                success: true,
                query: request.query,
                count: results.len(),
                results,
            }))
        }
        Err(Error::InvalidQuery(message)) => Err(ApiError::validation("query", message)),
        Err(err) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            state.metrics.record_search(elapsed_ms, 0, false).await;
            state.metrics.record_error(&err.to_string(), "/search").await;
            Err(ApiError::internal("Search failed", err))
        }
    }
}

/// POST /file
async fn file_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FileRequest>, JsonRejection>,
) -> std::result::Result<Json<FileResponse>, ApiError> {
    let request = parse_body(payload)?;
    tracing::info!(
        "File request: path='{}', lines {}-{}",
        request.path,
        request.start,
        request.end
    );

    let mut details = Vec::new();
    if request.path.is_empty() {
        details.push(ValidationDetail::new("path", "path must not be empty"));
    }
    if request.start < 1 {
        details.push(ValidationDetail::new("start", "start must be >= 1"));
    }
    if !(1..=1000).contains(&request.end) {
        details.push(ValidationDetail::new(
            "end",
            "end must be between 1 and 1000",
        ));
    }
    if !details.is_empty() {
        return Err(ApiError::Validation(details));
    }

    let started = Instant::now();
    match read_snippet(
        &state.repo_roots,
        &request.path,
        request.start as u64,
        request.end as u64,
    )
    .await
    {
        Ok(snippet) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            state.metrics.record_file_read(elapsed_ms, true).await;
            Ok(Json(FileResponse {
                success: true,
                snippet,
            }))
        }
        Err(Error::InvalidRequest(message)) => Err(ApiError::validation("request", message)),
        Err(err) => {
            let elapsed_ms = started.elapsed().as_millis() as u64;
            state.metrics.record_file_read(elapsed_ms, false).await;
            state.metrics.record_error(&err.to_string(), "/file").await;
            match err {
                Error::AccessDenied(message) => {
                    Err(ApiError::AccessDenied(format!("Access denied: {message}")))
                }
                other => Err(ApiError::internal("File read failed", other)),
            }
        }
    }
}

/// POST /file-info
async fn file_info_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<FileInfoRequest>, JsonRejection>,
) -> std::result::Result<Json<FileInfoResponse>, ApiError> {
    let request = parse_body(payload)?;
    tracing::info!("File info request: path='{}'", request.path);

    if request.path.is_empty() {
        return Err(ApiError::validation("path", "path must not be empty"));
    }

    match file_info(&state.repo_roots, &request.path).await {
        Ok(info) => Ok(Json(FileInfoResponse { success: true, info })),
        Err(err) => {
            state
                .metrics
                .record_error(&err.to_string(), "/file-info")
                .await;
            match err {
                Error::AccessDenied(message) => {
                    Err(ApiError::AccessDenied(format!("Access denied: {message}")))
                }
                other => Err(ApiError::internal("Failed to get file info", other)),
            }
        }
    }
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let ripgrep_installed = is_ripgrep_installed().await;
    let status = if ripgrep_installed { "ok" } else { "degraded" };
    let repos: Vec<String> = state
        .repo_roots
        .iter()
        .map(|root| root.display().to_string())
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "status": status,
            "ripgrep_installed": ripgrep_installed,
            "repo_count": state.repo_roots.len(),
            "repos": repos,
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        })),
    )
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = state.metrics.snapshot().await;
    let health = state.metrics.health_status().await;
    Json(json!({
        "metrics": metrics,
        "health": health,
    }))
}

/// GET /
async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "name": "LocalSearch API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "POST /search": "Search code across the configured repositories",
            "POST /file": "Read a line range from a file",
            "POST /file-info": "Get file metadata without content",
            "GET /health": "Service health and ripgrep status",
            "GET /metrics": "Request, search, and error metrics",
        },
    }))
}

/// Logs each request and feeds the request counters once the response
/// has been produced.
async fn track_requests(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    tracing::info!(
        "{method} {path} {status} {}ms",
        started.elapsed().as_millis()
    );
    state.metrics.record_request(&path, status).await;

    response
}

pub(crate) async fn run_server_impl(config: ServerConfig) -> Result<()> {
    let ripgrep_installed = is_ripgrep_installed().await;
    if !ripgrep_installed {
        tracing::warn!("ripgrep (rg) is not installed or not in PATH");
        tracing::warn!("Search functionality will not work properly");
        tracing::warn!("Install ripgrep: https://github.com/BurntSushi/ripgrep#installation");
    }

    let repo_count = config.repo_roots.len();
    let roots = config
        .repo_roots
        .iter()
        .map(|root| root.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    tracing::info!("Configured repository roots: {roots}");

    let state = AppState {
        repo_roots: Arc::new(config.repo_roots),
        metrics: Arc::new(Metrics::new()),
    };
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to {addr}: {e}")))?;

    tracing::info!(
        "LocalSearch API server running on http://localhost:{}",
        config.port
    );
    tracing::info!("Monitoring {repo_count} repository root(s)");
    tracing::info!(
        "Ripgrep status: {}",
        if ripgrep_installed {
            "installed"
        } else {
            "NOT FOUND"
        }
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shut down");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Error setting up signal handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Error setting up signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("SIGINT received, shutting down gracefully"),
        _ = terminate => tracing::info!("SIGTERM received, shutting down gracefully"),
    }
}

#[derive(Debug, Serialize)]
struct ValidationDetail {
    field: &'static str,
    message: String,
}

impl ValidationDetail {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Error handling for API endpoints
#[derive(Debug)]
enum ApiError {
    /// 400 with a list of per-field problems
    Validation(Vec<ValidationDetail>),
    /// 403 for paths outside the allowed roots
    AccessDenied(String),
    /// 500 with a generic message; the cause is logged, not returned
    Internal {
        context: &'static str,
        source: anyhow::Error,
    },
}

impl ApiError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![ValidationDetail::new(field, message)])
    }

    fn internal(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Internal {
            context,
            source: source.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(details) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "error": "Validation error",
                    "details": details,
                })),
            )
                .into_response(),
            Self::AccessDenied(message) => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "success": false,
                    "error": message,
                })),
            )
                .into_response(),
            Self::Internal { context, source } => {
                tracing::error!("{context}: {source:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": context,
                    })),
                )
                    .into_response()
            }
        }
    }
}
