//! Common error types for songlib

use thiserror::Error;

/// Common result type for songlib operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across songlib crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Data received from an external collaborator could not be used
    #[error("Upstream error: {0}")]
    Upstream(String),
}
