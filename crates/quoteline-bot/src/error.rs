//! Error types for bot operations

use quoteline_llm::LlmError;
use thiserror::Error;

/// Bot-specific errors
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// LLM call failed
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// LINE messaging API error
    #[error("LINE API error: {0}")]
    LineApiError(String),

    /// I/O error (server bind, shutdown)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

impl From<tokio_postgres::Error> for BotError {
    fn from(err: tokio_postgres::Error) -> Self {
        BotError::Database(err.to_string())
    }
}

impl From<deadpool_postgres::PoolError> for BotError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        BotError::Database(err.to_string())
    }
}

impl From<deadpool_postgres::CreatePoolError> for BotError {
    fn from(err: deadpool_postgres::CreatePoolError) -> Self {
        BotError::Database(err.to_string())
    }
}
