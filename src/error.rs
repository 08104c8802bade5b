//! Error types for the mediator service
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Wiki Error Enum ==
/// Unified error type for the mediator service.
#[derive(Error, Debug)]
pub enum WikiError {
    /// Cache lookup miss. Internal only: drives the fallback-to-backend
    /// path and is never written to a client.
    #[error("Not in cache: {0}")]
    NotFound(String),

    /// Malformed structured query (unknown field or selector)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Request exceeded its client-specified budget
    #[error("Operation timed out")]
    Timeout,

    /// The wiki backend raised an error
    #[error("Backend error: {0}")]
    Backend(String),

    /// I/O failure on a client socket
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the mediator service.
pub type Result<T> = std::result::Result<T, WikiError>;
