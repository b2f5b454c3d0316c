//! Capture normalizer.
//!
//! Converts a request as received at the ingest edge into a [`NewEvent`].
//! The transformation is pure; the only decision it makes is rejecting
//! bodies over the configured limit, before anything is written.
//!
//! Flattening policy, applied identically on every capture:
//!
//! - header names are lower-cased; repeated headers are joined with `", "`
//!   in arrival order;
//! - query parameters with repeated keys keep the last value;
//! - NUL characters in any text field become U+FFFD, since the store's
//!   text and JSONB columns cannot hold them. The body is kept byte-exact.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use request_nest_core::error::DomainError;
use request_nest_core::model::{BinId, NewEvent};

/// Default maximum accepted body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1_048_576;

/// Separator used when a header name repeats.
pub const HEADER_VALUE_SEPARATOR: &str = ", ";

/// Stand-in for NUL characters in captured text.
pub const NUL_REPLACEMENT: &str = "\u{FFFD}";

/// An inbound request, modelled as untyped pairs at the boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    /// HTTP method, verbatim.
    pub method: String,
    /// Path after the bin's ingest prefix, with or without leading `/`.
    pub path: String,
    /// Decoded query pairs in the order they appeared.
    pub query: Vec<(String, String)>,
    /// Header pairs in the order they appeared.
    pub headers: Vec<(String, String)>,
    /// Raw body bytes.
    pub body: Vec<u8>,
    /// Observed client address.
    pub remote_ip: Option<String>,
}

/// Limits enforced by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureLimits {
    /// Largest accepted body, in bytes. A body of exactly this size passes.
    pub max_body_size: usize,
}

impl Default for CaptureLimits {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }
}

impl CaptureLimits {
    /// Rejects a body of `size` bytes if it exceeds the limit.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PayloadTooLarge` when `size > max_body_size`.
    pub fn check_body_size(&self, size: usize) -> Result<(), DomainError> {
        if size > self.max_body_size {
            return Err(DomainError::PayloadTooLarge {
                limit: self.max_body_size,
                actual: size,
            });
        }
        Ok(())
    }
}

/// Normalizes `request` into an event for `bin_id`.
///
/// # Errors
///
/// Returns `DomainError::PayloadTooLarge` if the body exceeds
/// `limits.max_body_size`.
pub fn normalize(
    bin_id: &BinId,
    request: RawRequest,
    limits: CaptureLimits,
) -> Result<NewEvent, DomainError> {
    limits.check_body_size(request.body.len())?;

    Ok(NewEvent {
        bin_id: bin_id.clone(),
        method: storable_text(request.method),
        path: storable_text(normalize_path(&request.path)),
        query_params: flatten_query(request.query),
        headers: flatten_headers(request.headers),
        body: request.body,
        remote_ip: request
            .remote_ip
            .filter(|ip| !ip.is_empty())
            .map(storable_text),
    })
}

/// Anchors a captured path at `/`; the bin root captures as `/`.
fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("/{path}")
    }
}

fn storable_text(text: String) -> String {
    if text.contains('\0') {
        text.replace('\0', NUL_REPLACEMENT)
    } else {
        text
    }
}

fn flatten_query(pairs: Vec<(String, String)>) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(key, value)| (storable_text(key), storable_text(value)))
        .collect()
}

fn flatten_headers(pairs: Vec<(String, String)>) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for (name, value) in pairs {
        let value = storable_text(value);
        match headers.entry(storable_text(name.to_ascii_lowercase())) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => {
                let joined = slot.get_mut();
                joined.push_str(HEADER_VALUE_SEPARATOR);
                joined.push_str(&value);
            }
        }
    }
    headers
}
