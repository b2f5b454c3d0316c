//! request-nest — request capture bounded context.
//!
//! Responsible for turning inbound HTTP requests into events (the capture
//! normalizer and the ingestion orchestrator) and for the read side of the
//! event table.

pub mod application;
pub mod domain;
