//! Shared application state.

use std::sync::Arc;

use request_nest_core::clock::{Clock, SystemClock};
use request_nest_core::id::{IdGenerator, RandomIdGenerator};
use request_nest_core::repository::{BinRepository, EventRepository};
use request_nest_store::{PgBinRepository, PgEventRepository};
use sqlx::PgPool;

use crate::config::ApiSettings;

/// Application state shared across all request handlers.
///
/// The connection pool is the only shared mutable resource; everything else
/// is immutable or internally synchronized.
#[derive(Clone)]
pub struct AppState {
    /// `PostgreSQL` connection pool, used directly by the readiness probe.
    pub db_pool: PgPool,
    /// Source of `created_at` timestamps.
    pub clock: Arc<dyn Clock>,
    /// Source of bin and event IDs.
    pub ids: Arc<dyn IdGenerator>,
    /// Bin store.
    pub bin_repository: Arc<dyn BinRepository>,
    /// Event store.
    pub event_repository: Arc<dyn EventRepository>,
    /// Handler-facing settings.
    pub settings: Arc<ApiSettings>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        db_pool: PgPool,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        bin_repository: Arc<dyn BinRepository>,
        event_repository: Arc<dyn EventRepository>,
        settings: ApiSettings,
    ) -> Self {
        Self {
            db_pool,
            clock,
            ids,
            bin_repository,
            event_repository,
            settings: Arc::new(settings),
        }
    }

    /// Production wiring: `PostgreSQL` stores bounded by the configured
    /// timeout, the system clock and random IDs.
    #[must_use]
    pub fn with_postgres(db_pool: PgPool, settings: ApiSettings) -> Self {
        let bin_repository =
            PgBinRepository::new(db_pool.clone()).with_timeout(settings.db_timeout);
        let event_repository =
            PgEventRepository::new(db_pool.clone()).with_timeout(settings.db_timeout);
        Self::new(
            db_pool,
            Arc::new(SystemClock),
            Arc::new(RandomIdGenerator),
            Arc::new(bin_repository),
            Arc::new(event_repository),
            settings,
        )
    }
}
