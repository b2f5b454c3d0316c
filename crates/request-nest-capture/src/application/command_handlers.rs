//! Command handlers for the request capture context.
//!
//! `handle_capture_request` is the ingestion orchestrator. Each request
//! moves through `Received → BinResolved → Normalized → Persisted →
//! Acknowledged`; any failure is terminal for the request and nothing is
//! retried. The bin check here is an optimistic fast path: the event
//! store's foreign key remains the authoritative guard.

use std::fmt;

use request_nest_core::clock::Clock;
use request_nest_core::command::Command;
use request_nest_core::error::DomainError;
use request_nest_core::id::IdGenerator;
use request_nest_core::model::{Event, EventId};
use request_nest_core::repository::{BinRepository, EventRepository};
use tracing::{debug, info, warn};

use crate::domain::capture::{self, CaptureLimits};
use crate::domain::commands::CaptureRequest;

/// Stages of a single capture, used to label log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStage {
    /// The request arrived at the orchestrator.
    Received,
    /// The target bin was found.
    BinResolved,
    /// The request was normalized into an event.
    Normalized,
    /// The event row was written.
    Persisted,
    /// The acknowledgement was produced.
    Acknowledged,
}

impl fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Received => "received",
            Self::BinResolved => "bin_resolved",
            Self::Normalized => "normalized",
            Self::Persisted => "persisted",
            Self::Acknowledged => "acknowledged",
        })
    }
}

/// Acknowledgement returned for a persisted capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureAck {
    /// ID of the new event.
    pub event_id: EventId,
    /// Stored body size in bytes.
    pub size_bytes: i64,
}

/// Handles the `CaptureRequest` command: resolves the bin, normalizes the
/// request and persists the resulting event.
///
/// # Errors
///
/// - `DomainError::BinNotFound` if the bin does not exist, including when it
///   disappears between the existence check and the insert.
/// - `DomainError::PayloadTooLarge` if the body exceeds `limits`; nothing is
///   written.
/// - Any other store error unchanged (e.g. `DomainError::Unavailable`).
pub async fn handle_capture_request(
    command: CaptureRequest,
    limits: CaptureLimits,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    bins: &dyn BinRepository,
    events: &dyn EventRepository,
) -> Result<CaptureAck, DomainError> {
    let correlation_id = command.correlation_id();
    let command_type = command.command_type();
    let CaptureRequest {
        bin_id, request, ..
    } = command;
    let method = request.method.clone();
    debug!(%correlation_id, %bin_id, stage = %CaptureStage::Received, "capture stage");

    if !bins.exists(&bin_id).await? {
        info!(%correlation_id, %bin_id, reason = "bin_not_found", "capture rejected");
        return Err(DomainError::BinNotFound(bin_id));
    }
    debug!(%correlation_id, %bin_id, stage = %CaptureStage::BinResolved, "capture stage");

    let new_event = capture::normalize(&bin_id, request, limits).inspect_err(|err| {
        info!(%correlation_id, %bin_id, reason = %err, "capture rejected");
    })?;
    debug!(%correlation_id, %bin_id, stage = %CaptureStage::Normalized, "capture stage");

    let event = Event::from_new(ids.next_event_id(), clock.now(), new_event);
    let event = match events.create(event).await {
        Ok(event) => event,
        Err(DomainError::ReferentialIntegrity(missing)) => {
            warn!(%correlation_id, bin_id = %missing, "bin vanished before event insert");
            return Err(DomainError::BinNotFound(missing));
        }
        Err(err) => return Err(err),
    };
    debug!(%correlation_id, %bin_id, stage = %CaptureStage::Persisted, "capture stage");

    info!(
        command_type,
        %correlation_id,
        bin_id = %event.bin_id,
        event_id = %event.id,
        method = %method,
        size_bytes = event.size_bytes,
        stage = %CaptureStage::Acknowledged,
        "event captured"
    );

    Ok(CaptureAck {
        event_id: event.id,
        size_bytes: event.size_bytes,
    })
}
