//! `PostgreSQL` implementation of the `EventRepository` trait.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::instrument;

use request_nest_core::error::DomainError;
use request_nest_core::model::{BinId, Event, EventId, EventSummary, ListLimit};
use request_nest_core::repository::EventRepository;

use crate::error::{DEFAULT_OPERATION_TIMEOUT, classify, with_timeout};

const EVENT_COLUMNS: &str =
    "id, bin_id, method, path, query_params, headers, body, remote_ip, size_bytes, created_at";

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: String,
    bin_id: String,
    method: String,
    path: String,
    query_params: Json<BTreeMap<String, String>>,
    headers: Json<BTreeMap<String, String>>,
    body: Vec<u8>,
    remote_ip: Option<String>,
    size_bytes: i64,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::from(row.id),
            bin_id: BinId::from(row.bin_id),
            method: row.method,
            path: row.path,
            query_params: row.query_params.0,
            headers: row.headers.0,
            body: row.body,
            remote_ip: row.remote_ip,
            size_bytes: row.size_bytes,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventSummaryRow {
    id: String,
    method: String,
    path: String,
    size_bytes: i64,
    created_at: DateTime<Utc>,
}

impl From<EventSummaryRow> for EventSummary {
    fn from(row: EventSummaryRow) -> Self {
        Self {
            id: EventId::from(row.id),
            method: row.method,
            path: row.path,
            size_bytes: row.size_bytes,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository` with the default operation timeout.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Overrides the per-operation timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    #[instrument(level = "debug", skip_all, fields(bin_id = %event.bin_id, event_id = %event.id), err)]
    async fn create(&self, event: Event) -> Result<Event, DomainError> {
        let bin_id = event.bin_id.clone();
        let sql = format!(
            "INSERT INTO events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {EVENT_COLUMNS}"
        );

        let row = with_timeout(
            self.timeout,
            "events.create",
            sqlx::query_as::<_, EventRow>(&sql)
                .bind(event.id.as_str())
                .bind(event.bin_id.as_str())
                .bind(&event.method)
                .bind(&event.path)
                .bind(Json(&event.query_params))
                .bind(Json(&event.headers))
                .bind(&event.body)
                .bind(event.remote_ip.as_deref())
                .bind(event.size_bytes)
                .bind(event.created_at)
                .fetch_one(&self.pool),
            |err| match err {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    DomainError::ReferentialIntegrity(bin_id)
                }
                other => classify(other),
            },
        )
        .await?;

        Ok(row.into())
    }

    #[instrument(level = "debug", skip_all, fields(event_id = %id))]
    async fn get(&self, id: &EventId) -> Result<Event, DomainError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");

        let row = with_timeout(
            self.timeout,
            "events.get",
            sqlx::query_as::<_, EventRow>(&sql)
                .bind(id.as_str())
                .fetch_optional(&self.pool),
            classify,
        )
        .await?;

        row.map(Event::from)
            .ok_or_else(|| DomainError::EventNotFound(id.clone()))
    }

    #[instrument(level = "debug", skip_all, fields(bin_id = %bin_id, limit = limit.get()))]
    async fn list_for_bin(
        &self,
        bin_id: &BinId,
        limit: ListLimit,
    ) -> Result<Vec<EventSummary>, DomainError> {
        let rows = with_timeout(
            self.timeout,
            "events.list_for_bin",
            sqlx::query_as::<_, EventSummaryRow>(
                "SELECT id, method, path, size_bytes, created_at FROM events \
                 WHERE bin_id = $1 \
                 ORDER BY created_at DESC, id DESC \
                 LIMIT $2",
            )
            .bind(bin_id.as_str())
            .bind(i64::from(limit.get()))
            .fetch_all(&self.pool),
            classify,
        )
        .await?;

        Ok(rows.into_iter().map(EventSummary::from).collect())
    }
}
