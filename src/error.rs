//! Application error types with MCP tool-response conversion.

use rmcp::model::{CallToolResult, Content};
use thiserror::Error;

use crate::config::ConfigError;

/// Application-level errors for the Cypher MCP server.
///
/// Every variant maps to a stable error kind that is returned to the
/// calling agent inside the tool response. Nothing here is retried
/// locally; retry is the caller's decision.
#[derive(Error, Debug)]
pub enum AppError {
    /// Connection configuration is missing or invalid. Fatal to the
    /// requesting call, not to the process - the next call re-reads
    /// the configuration source.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A write query was attempted while the server runs in read-only mode.
    #[error("server is in read-only mode; write queries are disabled")]
    ReadOnly,

    /// Malformed tool input, rejected before any database call.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The database rejected the query (syntax error, constraint
    /// violation, ...). Carries the underlying message.
    #[error("query failed: {message}")]
    Query { message: String },

    /// The query exceeded the configured timeout. The server stops
    /// waiting; the database-side execution is not cancelled.
    #[error("query timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Connectivity lost or the binding is unusable.
    #[error("database unavailable: {0}")]
    Unavailable(String),

    /// Internal serialization or plumbing failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable kind for the tool-response error object.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIGURATION_ERROR",
            Self::ReadOnly => "PERMISSION_DENIED",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Query { .. } => "QUERY_ERROR",
            Self::Timeout { .. } => "QUERY_TIMEOUT",
            Self::Unavailable(_) => "DATABASE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Converts the error into a structured tool-response error.
    ///
    /// Tool calls never surface as protocol faults: the caller gets a
    /// single error object with a kind and a human-readable message.
    pub fn into_tool_result(self) -> CallToolResult {
        let body = serde_json::json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        CallToolResult::error(vec![Content::text(body.to_string())])
    }
}

impl From<neo4rs::Error> for AppError {
    fn from(err: neo4rs::Error) -> Self {
        match err {
            neo4rs::Error::ConnectionError => {
                Self::Unavailable("connection refused or lost".to_string())
            }
            neo4rs::Error::AuthenticationError(detail) => {
                Self::Unavailable(format!("authentication failed: {detail}"))
            }
            // Socket and protocol breakdowns mid-query are connectivity
            // failures, not query failures.
            e @ neo4rs::Error::IOError { .. } => Self::Unavailable(e.to_string()),
            neo4rs::Error::UnexpectedMessage(detail) => {
                Self::Unavailable(format!("unexpected protocol message: {detail}"))
            }
            neo4rs::Error::UnsupportedVersion(detail) => {
                Self::Unavailable(format!("unsupported protocol version: {detail}"))
            }
            other => Self::Query {
                message: other.to_string(),
            },
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {err}"))
    }
}
