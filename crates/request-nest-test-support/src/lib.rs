//! Shared test doubles and utilities for request-nest.

mod clock;
mod id;
mod repository;

pub use clock::FixedClock;
pub use id::SequenceIdGenerator;
pub use repository::{
    FailingBinRepository, FailingEventRepository, InMemoryBinRepository, InMemoryEventRepository,
    PhantomBinRepository,
};
