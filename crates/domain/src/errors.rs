//! Error types used throughout the client

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for calbridge operations.
///
/// Every public client operation either returns a typed result or one of
/// these variants; retry, backoff, and bisection mechanics are never visible
/// to callers.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ClientError {
    /// Malformed request construction. Never retried.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The impersonation principal was rejected by the service. Recovered by
    /// re-resolving the principal, otherwise fatal.
    #[error("Invalid principal: {0}")]
    InvalidPrincipal(String),

    /// The service's throttling policy refused to return the full result set.
    /// Recovered by date-range bisection for range finds, fatal elsewhere.
    #[error("Exceeded find count limit: {0}")]
    ExceededCountLimit(String),

    /// The remote call itself timed out server-side. Never retried.
    #[error("Remote timeout: {0}")]
    Timeout(String),

    /// The target item cannot be deleted. Never retried.
    #[error("Cannot delete: {0}")]
    CannotDelete(String),

    /// The target item does not exist. Never retried.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Anything transient or unclassified, including transport faults.
    /// Retried with exponential backoff up to the depth ceiling.
    #[error("Transient service error: {0}")]
    Transient(String),

    /// Terminal wrapper produced once the depth ceiling is exceeded.
    #[error("{operation} gave up after {attempts} attempts (last error: {last_kind})")]
    RetriesExhausted { operation: String, attempts: u32, last_kind: ErrorKind },
}

/// Classification tag attached to a failure, used to select a recovery
/// strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidPrincipal,
    ExceededCountLimit,
    Timeout,
    CannotDelete,
    ItemNotFound,
    Transient,
    RetriesExhausted,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidArgument => "invalid-argument",
            Self::InvalidPrincipal => "invalid-principal",
            Self::ExceededCountLimit => "exceeded-count-limit",
            Self::Timeout => "timeout",
            Self::CannotDelete => "cannot-delete",
            Self::ItemNotFound => "item-not-found",
            Self::Transient => "transient",
            Self::RetriesExhausted => "retries-exhausted",
        };
        f.write_str(name)
    }
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidPrincipal(_) => ErrorKind::InvalidPrincipal,
            Self::ExceededCountLimit(_) => ErrorKind::ExceededCountLimit,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::CannotDelete(_) => ErrorKind::CannotDelete,
            Self::ItemNotFound(_) => ErrorKind::ItemNotFound,
            Self::Transient(_) => ErrorKind::Transient,
            Self::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transient(message.into())
    }
}

/// Result type alias for calbridge operations
pub type Result<T> = std::result::Result<T, ClientError>;
