//! Command handlers for the bin management context.

use request_nest_core::clock::Clock;
use request_nest_core::command::Command;
use request_nest_core::error::DomainError;
use request_nest_core::id::IdGenerator;
use request_nest_core::model::Bin;
use request_nest_core::repository::BinRepository;
use tracing::info;

use crate::domain::commands::CreateBin;

/// Handles the `CreateBin` command: assigns a fresh ID and creation time,
/// then persists the bin.
///
/// IDs carry 96 random bits, so collisions are not retried.
///
/// # Errors
///
/// Returns `DomainError` if the insert fails.
pub async fn handle_create_bin(
    command: &CreateBin,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn BinRepository,
) -> Result<Bin, DomainError> {
    let bin = Bin {
        id: ids.next_bin_id(),
        name: command.name.clone(),
        created_at: clock.now(),
    };

    let bin = repo.create(bin).await?;

    info!(
        command_type = command.command_type(),
        correlation_id = %command.correlation_id(),
        bin_id = %bin.id,
        "bin created"
    );

    Ok(bin)
}
