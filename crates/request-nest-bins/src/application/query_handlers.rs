//! Query handlers for the bin management context.
//!
//! Read-only composition over the bin store; store errors pass through
//! unchanged.

use chrono::{DateTime, Utc};
use request_nest_core::error::DomainError;
use request_nest_core::model::{Bin, BinId};
use request_nest_core::repository::BinRepository;
use serde::Serialize;

/// Read-only view of a bin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinView {
    /// The bin identifier.
    pub id: BinId,
    /// Optional human-readable label.
    pub name: Option<String>,
    /// Public URL that captures requests into the bin.
    pub ingest_url: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl BinView {
    /// Builds the view of `bin`, rendering its ingest URL under `base_url`.
    #[must_use]
    pub fn from_bin(bin: &Bin, base_url: &str) -> Self {
        Self {
            id: bin.id.clone(),
            name: bin.name.clone(),
            ingest_url: bin.ingest_url(base_url),
            created_at: bin.created_at,
        }
    }
}

/// Lists every bin, newest first.
///
/// # Errors
///
/// Returns `DomainError` if the store read fails.
pub async fn list_bins(
    base_url: &str,
    repo: &dyn BinRepository,
) -> Result<Vec<BinView>, DomainError> {
    let bins = repo.list().await?;
    Ok(bins.iter().map(|b| BinView::from_bin(b, base_url)).collect())
}

/// Retrieves a bin by its ID.
///
/// # Errors
///
/// Returns `DomainError::BinNotFound` if no bin matches.
pub async fn get_bin(
    bin_id: &BinId,
    base_url: &str,
    repo: &dyn BinRepository,
) -> Result<BinView, DomainError> {
    let bin = repo.get(bin_id).await?;
    Ok(BinView::from_bin(&bin, base_url))
}
