//! Command abstractions.
//!
//! Every write entering the system (creating a bin, capturing a request) is
//! expressed as a command carrying a correlation ID, so the log lines of one
//! HTTP request can be joined across the handler, the orchestrator and the
//! store.

use uuid::Uuid;

/// Trait that all commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// The type name for this command, e.g. `bins.create_bin`.
    fn command_type(&self) -> &'static str;

    /// Correlation ID to trace this command through the system.
    fn correlation_id(&self) -> Uuid;
}

/// Generates a fresh correlation ID for a command issued at the HTTP edge.
#[must_use]
pub fn new_correlation_id() -> Uuid {
    Uuid::new_v4()
}
