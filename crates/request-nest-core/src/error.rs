//! Domain error types.

use thiserror::Error;

use crate::model::{BinId, EventId};

/// Top-level domain error type.
///
/// Store errors propagate through the bounded contexts unchanged; only the
/// capture orchestrator rewrites `ReferentialIntegrity` into `BinNotFound`.
#[derive(Debug, Error)]
pub enum DomainError {
    /// No bin exists with the given ID.
    #[error("bin '{0}' not found")]
    BinNotFound(BinId),

    /// No event exists with the given ID.
    #[error("event '{0}' not found")]
    EventNotFound(EventId),

    /// A captured body exceeds the configured maximum.
    #[error("request body size ({actual} bytes) exceeds maximum allowed ({limit} bytes)")]
    PayloadTooLarge {
        /// Configured maximum body size in bytes.
        limit: usize,
        /// Observed body size in bytes.
        actual: usize,
    },

    /// An event insert referenced a bin that does not exist.
    #[error("event references missing bin '{0}'")]
    ReferentialIntegrity(BinId),

    /// The store timed out or could not be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A validation error in caller-supplied input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Any other infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
