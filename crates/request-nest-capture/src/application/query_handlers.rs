//! Query handlers for the request capture context.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use request_nest_core::error::DomainError;
use request_nest_core::model::{BinId, Event, EventId, EventSummary, ListLimit};
use request_nest_core::repository::{BinRepository, EventRepository};
use serde::Serialize;

/// How `EventView::body` encodes the stored bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    /// The body is valid UTF-8 and returned as text.
    Utf8,
    /// The body is binary and returned as standard base64.
    Base64,
}

/// Full read-only view of a captured event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventView {
    /// The event identifier.
    pub id: EventId,
    /// The owning bin.
    pub bin_id: BinId,
    /// HTTP method.
    pub method: String,
    /// Captured path.
    pub path: String,
    /// Flattened query parameters.
    pub query_params: BTreeMap<String, String>,
    /// Flattened headers.
    pub headers: BTreeMap<String, String>,
    /// Body text, or base64 when `body_encoding` is `base64`.
    pub body: String,
    /// Encoding applied to `body`.
    pub body_encoding: BodyEncoding,
    /// Observed client address.
    pub remote_ip: Option<String>,
    /// Body size in bytes.
    pub size_bytes: i64,
    /// Capture timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventView {
    fn from(event: Event) -> Self {
        let (body, body_encoding) = match String::from_utf8(event.body) {
            Ok(text) => (text, BodyEncoding::Utf8),
            Err(err) => (STANDARD.encode(err.into_bytes()), BodyEncoding::Base64),
        };
        Self {
            id: event.id,
            bin_id: event.bin_id,
            method: event.method,
            path: event.path,
            query_params: event.query_params,
            headers: event.headers,
            body,
            body_encoding,
            remote_ip: event.remote_ip,
            size_bytes: event.size_bytes,
            created_at: event.created_at,
        }
    }
}

/// Lists the newest events of a bin, at most `limit` of them.
///
/// # Errors
///
/// Returns `DomainError::BinNotFound` if the bin does not exist, so an
/// unknown bin is distinguishable from an empty one.
pub async fn list_events_for_bin(
    bin_id: &BinId,
    limit: ListLimit,
    bins: &dyn BinRepository,
    events: &dyn EventRepository,
) -> Result<Vec<EventSummary>, DomainError> {
    if !bins.exists(bin_id).await? {
        return Err(DomainError::BinNotFound(bin_id.clone()));
    }
    events.list_for_bin(bin_id, limit).await
}

/// Retrieves the full view of an event.
///
/// # Errors
///
/// Returns `DomainError::EventNotFound` if no event matches.
pub async fn get_event(
    event_id: &EventId,
    events: &dyn EventRepository,
) -> Result<EventView, DomainError> {
    events.get(event_id).await.map(EventView::from)
}
