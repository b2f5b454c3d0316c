//! Test repositories — in-memory and failing implementations of the
//! `BinRepository` and `EventRepository` traits.

use std::cmp::Reverse;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use request_nest_core::error::DomainError;
use request_nest_core::model::{Bin, BinId, Event, EventId, EventSummary, ListLimit};
use request_nest_core::repository::{BinRepository, EventRepository};

/// A bin repository backed by a `Vec`, ordered like the `PostgreSQL` store
/// (newest first, ties broken by ID descending).
#[derive(Debug, Default)]
pub struct InMemoryBinRepository {
    bins: Mutex<Vec<Bin>>,
}

impl InMemoryBinRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored bins.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn len(&self) -> usize {
        self.bins.lock().unwrap().len()
    }

    /// Returns `true` if no bins are stored.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: &BinId) -> bool {
        self.bins.lock().unwrap().iter().any(|b| &b.id == id)
    }
}

#[async_trait]
impl BinRepository for InMemoryBinRepository {
    async fn create(&self, bin: Bin) -> Result<Bin, DomainError> {
        let mut bins = self.bins.lock().unwrap();
        if bins.iter().any(|b| b.id == bin.id) {
            return Err(DomainError::Infrastructure(format!(
                "duplicate key value violates unique constraint: {}",
                bin.id
            )));
        }
        bins.push(bin.clone());
        Ok(bin)
    }

    async fn get(&self, id: &BinId) -> Result<Bin, DomainError> {
        self.bins
            .lock()
            .unwrap()
            .iter()
            .find(|b| &b.id == id)
            .cloned()
            .ok_or_else(|| DomainError::BinNotFound(id.clone()))
    }

    async fn list(&self) -> Result<Vec<Bin>, DomainError> {
        let mut bins = self.bins.lock().unwrap().clone();
        bins.sort_by_key(|b| Reverse((b.created_at, b.id.clone())));
        Ok(bins)
    }

    async fn exists(&self, id: &BinId) -> Result<bool, DomainError> {
        Ok(self.contains(id))
    }
}

/// An event repository backed by a `Vec`. Enforces the bin foreign key
/// against the `InMemoryBinRepository` it was built with.
#[derive(Debug)]
pub struct InMemoryEventRepository {
    bins: Arc<InMemoryBinRepository>,
    events: Mutex<Vec<Event>>,
}

impl InMemoryEventRepository {
    /// Create an empty repository whose inserts are checked against `bins`.
    #[must_use]
    pub fn new(bins: Arc<InMemoryBinRepository>) -> Self {
        Self {
            bins,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of every stored event in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored_events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn create(&self, event: Event) -> Result<Event, DomainError> {
        if !self.bins.contains(&event.bin_id) {
            return Err(DomainError::ReferentialIntegrity(event.bin_id));
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(event)
    }

    async fn get(&self, id: &EventId) -> Result<Event, DomainError> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| &e.id == id)
            .cloned()
            .ok_or_else(|| DomainError::EventNotFound(id.clone()))
    }

    async fn list_for_bin(
        &self,
        bin_id: &BinId,
        limit: ListLimit,
    ) -> Result<Vec<EventSummary>, DomainError> {
        let mut events: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| &e.bin_id == bin_id)
            .cloned()
            .collect();
        events.sort_by_key(|e| Reverse((e.created_at, e.id.clone())));
        Ok(events
            .iter()
            .take(limit.get() as usize)
            .map(Event::summary)
            .collect())
    }
}

/// A bin repository that reports every bin as existing but stores none.
/// Models a bin vanishing between the existence check and the event insert.
#[derive(Debug)]
pub struct PhantomBinRepository;

#[async_trait]
impl BinRepository for PhantomBinRepository {
    async fn create(&self, bin: Bin) -> Result<Bin, DomainError> {
        Ok(bin)
    }

    async fn get(&self, id: &BinId) -> Result<Bin, DomainError> {
        Err(DomainError::BinNotFound(id.clone()))
    }

    async fn list(&self) -> Result<Vec<Bin>, DomainError> {
        Ok(vec![])
    }

    async fn exists(&self, _id: &BinId) -> Result<bool, DomainError> {
        Ok(true)
    }
}

/// A bin repository that always returns an unavailable error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingBinRepository;

#[async_trait]
impl BinRepository for FailingBinRepository {
    async fn create(&self, _bin: Bin) -> Result<Bin, DomainError> {
        Err(DomainError::Unavailable("connection refused".into()))
    }

    async fn get(&self, _id: &BinId) -> Result<Bin, DomainError> {
        Err(DomainError::Unavailable("connection refused".into()))
    }

    async fn list(&self) -> Result<Vec<Bin>, DomainError> {
        Err(DomainError::Unavailable("connection refused".into()))
    }

    async fn exists(&self, _id: &BinId) -> Result<bool, DomainError> {
        Err(DomainError::Unavailable("connection refused".into()))
    }
}

/// An event repository that always returns an unavailable error.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn create(&self, _event: Event) -> Result<Event, DomainError> {
        Err(DomainError::Unavailable("connection refused".into()))
    }

    async fn get(&self, _id: &EventId) -> Result<Event, DomainError> {
        Err(DomainError::Unavailable("connection refused".into()))
    }

    async fn list_for_bin(
        &self,
        _bin_id: &BinId,
        _limit: ListLimit,
    ) -> Result<Vec<EventSummary>, DomainError> {
        Err(DomainError::Unavailable("connection refused".into()))
    }
}
