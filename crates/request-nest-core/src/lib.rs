//! request-nest core — shared domain types and abstractions.
//!
//! This crate defines the bin and event model, the error taxonomy, and the
//! traits that the store and the bounded contexts depend on. It contains no
//! infrastructure code.

pub mod clock;
pub mod command;
pub mod error;
pub mod id;
pub mod model;
pub mod repository;
