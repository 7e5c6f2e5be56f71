use thiserror::Error;

/// Result type for localsearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for localsearch operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed or out-of-bounds request input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Path outside the allowed repository roots
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// File missing or unreadable
    #[error("Not found: {0}")]
    NotFound(String),

    /// Binary or otherwise unservable file content
    #[error("Unsupported content: {0}")]
    UnsupportedContent(String),

    /// File exceeds the serving size limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    /// Requested start line lies beyond the end of the file
    #[error("Start line {start} exceeds file length {total_lines}")]
    OutOfRange { start: u64, total_lines: u64 },

    /// Empty or unusable search query
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// External search tool missing or broken
    #[error("Search tool unavailable: {0}")]
    ToolUnavailable(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Any other error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Creates an access denied error
    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    /// Creates a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Creates an unsupported content error
    pub fn unsupported_content(msg: impl Into<String>) -> Self {
        Self::UnsupportedContent(msg.into())
    }

    /// Creates an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Creates a tool unavailable error
    pub fn tool_unavailable(msg: impl Into<String>) -> Self {
        Self::ToolUnavailable(msg.into())
    }

    /// Adds context to any error
    pub fn with_context<E>(context: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::WithContext {
            context: context.into(),
            source: Box::new(source),
        }
    }
}

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::with_context(context, e))
    }
}
