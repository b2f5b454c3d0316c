//! `PostgreSQL` implementation of the `BinRepository` trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use request_nest_core::error::DomainError;
use request_nest_core::model::{Bin, BinId};
use request_nest_core::repository::BinRepository;

use crate::error::{DEFAULT_OPERATION_TIMEOUT, classify, with_timeout};

#[derive(Debug, sqlx::FromRow)]
struct BinRow {
    id: String,
    name: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<BinRow> for Bin {
    fn from(row: BinRow) -> Self {
        Self {
            id: BinId::from(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

/// PostgreSQL-backed bin repository.
#[derive(Debug, Clone)]
pub struct PgBinRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgBinRepository {
    /// Creates a new `PgBinRepository` with the default operation timeout.
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
impl BinRepository for PgBinRepository {
    #[instrument(level = "debug", skip_all, fields(bin_id = %bin.id), err)]
    async fn create(&self, bin: Bin) -> Result<Bin, DomainError> {
        let row = with_timeout(
            self.timeout,
            "bins.create",
            sqlx::query_as::<_, BinRow>(
                "INSERT INTO bins (id, name, created_at) VALUES ($1, $2, $3) \
                 RETURNING id, name, created_at",
            )
            .bind(bin.id.as_str())
            .bind(bin.name.as_deref())
            .bind(bin.created_at)
            .fetch_one(&self.pool),
            classify,
        )
        .await?;

        Ok(row.into())
    }

    #[instrument(level = "debug", skip_all, fields(bin_id = %id))]
    async fn get(&self, id: &BinId) -> Result<Bin, DomainError> {
        let row = with_timeout(
            self.timeout,
            "bins.get",
            sqlx::query_as::<_, BinRow>("SELECT id, name, created_at FROM bins WHERE id = $1")
                .bind(id.as_str())
                .fetch_optional(&self.pool),
            classify,
        )
        .await?;

        row.map(Bin::from)
            .ok_or_else(|| DomainError::BinNotFound(id.clone()))
    }

    #[instrument(level = "debug", skip(self))]
    async fn list(&self) -> Result<Vec<Bin>, DomainError> {
        let rows = with_timeout(
            self.timeout,
            "bins.list",
            sqlx::query_as::<_, BinRow>(
                "SELECT id, name, created_at FROM bins ORDER BY created_at DESC, id DESC",
            )
            .fetch_all(&self.pool),
            classify,
        )
        .await?;

        Ok(rows.into_iter().map(Bin::from).collect())
    }

    #[instrument(level = "debug", skip_all, fields(bin_id = %id))]
    async fn exists(&self, id: &BinId) -> Result<bool, DomainError> {
        with_timeout(
            self.timeout,
            "bins.exists",
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM bins WHERE id = $1)")
                .bind(id.as_str())
                .fetch_one(&self.pool),
            classify,
        )
        .await
    }
}
