//! Domain layer: the capture normalizer and commands.

pub mod capture;
pub mod commands;
