//! Command-line interface for the geodata standardizer.

pub mod args;
pub mod commands;
