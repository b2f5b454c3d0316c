//! Identifier generation for bins and events.
//!
//! In production, IDs come from the thread-local RNG. In tests, a sequential
//! implementation is injected so assertions can name the IDs up front.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

use crate::model::{BinId, EventId};

/// Number of random bytes behind every generated ID (96 bits).
pub const ID_ENTROPY_BYTES: usize = 12;

/// Abstraction over ID generation.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh bin ID (`b_` prefix).
    fn next_bin_id(&self) -> BinId;

    /// Returns a fresh event ID (`e_` prefix).
    fn next_event_id(&self) -> EventId;
}

/// Generates URL-safe random IDs, 16 characters after the prefix.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl RandomIdGenerator {
    fn token() -> String {
        let mut bytes = [0u8; ID_ENTROPY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_bin_id(&self) -> BinId {
        BinId::from(format!("{}{}", BinId::PREFIX, Self::token()))
    }

    fn next_event_id(&self) -> EventId {
        EventId::from(format!("{}{}", EventId::PREFIX, Self::token()))
    }
}
