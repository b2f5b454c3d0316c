//! Bin and event model.
//!
//! A bin is a disposable ingestion endpoint; an event is one HTTP request
//! captured by a bin. Both are append-only: neither is updated nor deleted
//! after creation.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Prefix carried by every generated ID of this kind.
            pub const PREFIX: &'static str = $prefix;

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

prefixed_id!(
    /// Opaque bin identifier, e.g. `b_Xk3...`.
    ///
    /// IDs arriving from URLs are not validated against the prefix: an
    /// unknown ID simply resolves to "not found".
    BinId,
    "b_"
);

prefixed_id!(
    /// Opaque event identifier, e.g. `e_9fQ...`.
    EventId,
    "e_"
);

/// A disposable HTTP endpoint that accumulates captured requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bin {
    /// Unique identifier with `b_` prefix.
    pub id: BinId,
    /// Optional human-readable label.
    pub name: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Bin {
    /// Public URL that captures requests into this bin, e.g.
    /// `https://example.com/b/b_abc123`.
    #[must_use]
    pub fn ingest_url(&self, base_url: &str) -> String {
        format!("{}/b/{}", base_url.trim_end_matches('/'), self.id)
    }
}

/// A normalized capture that has not been persisted yet.
///
/// Produced by the capture normalizer; the orchestrator assigns `id` and
/// `created_at` to turn it into an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    /// Target bin.
    pub bin_id: BinId,
    /// HTTP method, verbatim.
    pub method: String,
    /// Path relative to the bin's ingest prefix, always starting with `/`.
    pub path: String,
    /// Flattened query parameters (last value wins).
    pub query_params: BTreeMap<String, String>,
    /// Flattened headers (lower-case names, repeated values joined by `", "`).
    pub headers: BTreeMap<String, String>,
    /// Raw request body.
    pub body: Vec<u8>,
    /// Observed client address.
    pub remote_ip: Option<String>,
}

/// A captured HTTP request, permanently associated with its bin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Unique identifier with `e_` prefix.
    pub id: EventId,
    /// Owning bin.
    pub bin_id: BinId,
    /// HTTP method, verbatim.
    pub method: String,
    /// Path relative to the bin's ingest prefix.
    pub path: String,
    /// Flattened query parameters.
    pub query_params: BTreeMap<String, String>,
    /// Flattened headers.
    pub headers: BTreeMap<String, String>,
    /// Raw request body, byte-exact.
    pub body: Vec<u8>,
    /// Observed client address.
    pub remote_ip: Option<String>,
    /// Byte length of `body`, computed at capture time.
    pub size_bytes: i64,
    /// Capture timestamp.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Stamps a normalized capture with its identity and capture time.
    #[must_use]
    pub fn from_new(id: EventId, created_at: DateTime<Utc>, new: NewEvent) -> Self {
        let size_bytes = i64::try_from(new.body.len()).unwrap_or(i64::MAX);
        Self {
            id,
            bin_id: new.bin_id,
            method: new.method,
            path: new.path,
            query_params: new.query_params,
            headers: new.headers,
            body: new.body,
            remote_ip: new.remote_ip,
            size_bytes,
            created_at,
        }
    }

    /// Returns the list-view projection of this event.
    #[must_use]
    pub fn summary(&self) -> EventSummary {
        EventSummary {
            id: self.id.clone(),
            method: self.method.clone(),
            path: self.path.clone(),
            size_bytes: self.size_bytes,
            created_at: self.created_at,
        }
    }
}

/// List-view projection of an event; headers, query and body are reserved
/// for the detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    /// Event identifier.
    pub id: EventId,
    /// HTTP method.
    pub method: String,
    /// Captured path.
    pub path: String,
    /// Body size in bytes.
    pub size_bytes: i64,
    /// Capture timestamp.
    pub created_at: DateTime<Utc>,
}

/// Bounded page size for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListLimit(u32);

impl ListLimit {
    /// Page size used when the caller does not ask for one.
    pub const DEFAULT: u32 = 50;
    /// Hard upper bound; larger requests are clamped to it.
    pub const MAX: u32 = 100;

    /// Builds a limit from an optional caller-supplied value.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `requested` is below 1.
    pub fn new(requested: Option<i64>) -> Result<Self, DomainError> {
        match requested {
            None => Ok(Self(Self::DEFAULT)),
            Some(n) if n < 1 => Err(DomainError::Validation(format!(
                "limit must be at least 1, got {n}"
            ))),
            Some(n) => Ok(Self(
                u32::try_from(n).map_or(Self::MAX, |n| n.min(Self::MAX)),
            )),
        }
    }

    /// Returns the effective limit.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for ListLimit {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}
