//! Commands for the request capture context.

use request_nest_core::command::Command;
use request_nest_core::model::BinId;
use uuid::Uuid;

use crate::domain::capture::RawRequest;

/// Command to capture one inbound request into a bin.
#[derive(Debug, Clone)]
pub struct CaptureRequest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The target bin, as it appeared in the ingest URL.
    pub bin_id: BinId,
    /// The request as received at the HTTP edge.
    pub request: RawRequest,
}

impl Command for CaptureRequest {
    fn command_type(&self) -> &'static str {
        "capture.capture_request"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
