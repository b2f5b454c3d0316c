//! Repository abstractions for bins and events.
//!
//! Each repository exclusively owns its table. Implementations must release
//! any pooled connection on every exit path and surface storage timeouts as
//! `DomainError::Unavailable`.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::model::{Bin, BinId, Event, EventId, EventSummary, ListLimit};

/// Persistence for bin records.
#[async_trait]
pub trait BinRepository: Send + Sync {
    /// Persists a fully-formed bin and returns it as stored.
    async fn create(&self, bin: Bin) -> Result<Bin, DomainError>;

    /// Loads a bin by ID.
    ///
    /// Fails with `DomainError::BinNotFound` if no row matches.
    async fn get(&self, id: &BinId) -> Result<Bin, DomainError>;

    /// Lists all bins, newest first (ties broken by ID, descending).
    async fn list(&self) -> Result<Vec<Bin>, DomainError>;

    /// Reports whether a bin exists. Consistent with [`BinRepository::get`].
    async fn exists(&self, id: &BinId) -> Result<bool, DomainError>;
}

/// Persistence for captured events.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Persists a fully-formed event.
    ///
    /// Fails with `DomainError::ReferentialIntegrity` if `event.bin_id` does
    /// not reference an existing bin, regardless of any earlier check made
    /// by the caller.
    async fn create(&self, event: Event) -> Result<Event, DomainError>;

    /// Loads an event by ID.
    ///
    /// Fails with `DomainError::EventNotFound` if absent.
    async fn get(&self, id: &EventId) -> Result<Event, DomainError>;

    /// Lists at most `limit` event summaries for a bin, newest first.
    async fn list_for_bin(
        &self,
        bin_id: &BinId,
        limit: ListLimit,
    ) -> Result<Vec<EventSummary>, DomainError>;
}
