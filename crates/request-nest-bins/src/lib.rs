//! request-nest — bin management bounded context.
//!
//! Responsible for creating bins and serving the read side of the bin
//! table to the Admin API.

pub mod application;
pub mod domain;
