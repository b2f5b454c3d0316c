//! Sequential `IdGenerator` for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use request_nest_core::id::IdGenerator;
use request_nest_core::model::{BinId, EventId};

/// Hands out `b_000001`, `b_000002`, ... and `e_000001`, `e_000002`, ...
/// from independent counters.
#[derive(Debug, Default)]
pub struct SequenceIdGenerator {
    bins: AtomicU64,
    events: AtomicU64,
}

impl SequenceIdGenerator {
    /// Create a generator whose first IDs end in `000001`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequenceIdGenerator {
    fn next_bin_id(&self) -> BinId {
        let n = self.bins.fetch_add(1, Ordering::SeqCst) + 1;
        BinId::from(format!("{}{n:06}", BinId::PREFIX))
    }

    fn next_event_id(&self) -> EventId {
        let n = self.events.fetch_add(1, Ordering::SeqCst) + 1;
        EventId::from(format!("{}{n:06}", EventId::PREFIX))
    }
}
