//! Commands for the bin management context.

use request_nest_core::command::Command;
use uuid::Uuid;

/// Command to create a new bin.
#[derive(Debug, Clone)]
pub struct CreateBin {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Optional human-readable label.
    pub name: Option<String>,
}

impl Command for CreateBin {
    fn command_type(&self) -> &'static str {
        "bins.create_bin"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
