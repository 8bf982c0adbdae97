//! Error taxonomy for connection management
//!
//! Construction-time failures are deferred rather than propagated, a
//! single failed open attempt is retried, and budget exhaustion is
//! surfaced to the caller as fatal for that operation.

use thiserror::Error;

/// Errors produced while opening or using managed connections
#[derive(Debug, Clone, Error)]
pub enum ConnectError {
    /// A single attempt to open a connection failed
    #[error("connection attempt failed: {details}")]
    Attempt {
        /// Driver-reported failure detail
        details: String,
    },

    /// The open call returned but the session did not report open
    #[error("the database connection did not open")]
    NotOpen,

    /// All open attempts failed
    #[error("database connection failed after {attempts} attempts")]
    RetryExhausted {
        /// Attempts spent when the budget ran out
        attempts: u32,
    },

    /// The eagerly opened primary connection was never established
    #[error("primary connection unavailable: {details}")]
    PrimaryUnavailable {
        /// Failure detail recorded at registry construction
        details: String,
    },

    /// A query on an open connection failed
    #[error("query failed: {details}")]
    Query {
        /// Driver-reported failure detail
        details: String,
    },
}

impl ConnectError {
    /// Check if a retry may succeed
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Attempt { .. } | Self::NotOpen)
    }
}

/// Result type for connection operations
pub type ConnectResult<T> = Result<T, ConnectError>;
