//! Error types for the assistant pipeline.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `From` implementations.

use thiserror::Error;

/// Convenient result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AssistantError>;

/// Comprehensive error type for all pipeline stages.
///
/// Each stage of the pipeline (connect, introspect, embed, retrieve,
/// generate, execute) maps to its own variant so the CLI can tell the
/// user exactly where a question failed.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// Database connection could not be established or verified
    #[error("Connection error: {0}")]
    Connection(String),

    /// Schema extraction failed or produced an empty catalog
    #[error("Schema extraction failed: {0}")]
    Schema(String),

    /// Embedding generation failed
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// No tables matched the question above the similarity threshold
    #[error("No relevant tables found for: {0}")]
    NoRelevantTables(String),

    /// LLM transport or response parsing failed
    #[error("LLM error: {0}")]
    Llm(String),

    /// Generated SQL failed sanitization or validation
    #[error("SQL validation failed: {0}")]
    SqlValidation(String),

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    Query(String),

    /// Result export failed
    #[error("Export failed: {0}")]
    Export(String),

    /// Configuration error (missing env vars, bad connection string)
    #[error("Configuration error: {0}")]
    Config(String),

    /// PostgreSQL driver error
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client error (LLM and embedding APIs)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssistantError {
    /// Create a configuration error with context.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a SQL validation error with context.
    pub fn sql(msg: impl Into<String>) -> Self {
        Self::SqlValidation(msg.into())
    }

    /// Create an LLM error with context.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AssistantError::config("DB_HOST not set");
        assert_eq!(err.to_string(), "Configuration error: DB_HOST not set");

        let err = AssistantError::sql("must start with SELECT");
        assert_eq!(err.to_string(), "SQL validation failed: must start with SELECT");

        let err = AssistantError::NoRelevantTables("who is on call".to_string());
        assert!(err.to_string().contains("who is on call"));
    }

    #[test]
    fn test_error_from_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AssistantError = parse_err.into();
        assert!(matches!(err, AssistantError::Json(_)));
    }
}
