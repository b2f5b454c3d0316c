//! request-nest store — `PostgreSQL` persistence for bins and events.
//!
//! The `events.bin_id → bins.id` foreign key is the authoritative guard
//! against orphaned events; repositories surface its violation as
//! `DomainError::ReferentialIntegrity`.

mod error;
pub mod pg_bin_repository;
pub mod pg_event_repository;

pub use error::DEFAULT_OPERATION_TIMEOUT;
pub use pg_bin_repository::PgBinRepository;
pub use pg_event_repository::PgEventRepository;
