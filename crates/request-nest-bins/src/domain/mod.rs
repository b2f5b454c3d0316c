//! Domain layer: commands.

pub mod commands;
