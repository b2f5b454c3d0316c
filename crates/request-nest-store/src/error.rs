//! Mapping of `sqlx` failures and timeouts onto `DomainError`.

use std::future::Future;
use std::time::Duration;

use request_nest_core::error::DomainError;
use tracing::warn;

/// Bound applied to every store operation unless overridden.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Classifies a `sqlx` error as transient (`Unavailable`) or not.
pub(crate) fn classify(err: sqlx::Error) -> DomainError {
    match err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => DomainError::Unavailable(err.to_string()),
        other => DomainError::Infrastructure(other.to_string()),
    }
}

/// Runs a store operation under `timeout`. Elapsed operations are dropped,
/// which returns their pooled connection, and surface as `Unavailable`.
pub(crate) async fn with_timeout<T, F, M>(
    timeout: Duration,
    operation: &'static str,
    fut: F,
    map_err: M,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
    M: FnOnce(sqlx::Error) -> DomainError,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(map_err),
        Err(_) => {
            warn!(operation, timeout_ms = timeout.as_millis(), "store operation timed out");
            Err(DomainError::Unavailable(format!(
                "{operation} timed out after {}ms",
                timeout.as_millis()
            )))
        }
    }
}
