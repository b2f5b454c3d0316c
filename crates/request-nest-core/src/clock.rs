//! Clock abstraction for determinism.

use chrono::{DateTime, SubsecRound, Utc};

/// Abstraction over system time for deterministic behavior.
///
/// Timestamps handed out by a clock become `created_at` values of bins and
/// events, so implementations should not produce more precision than the
/// store keeps (microseconds for `TIMESTAMPTZ`).
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system clock, truncated to microseconds.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(6)
    }
}
