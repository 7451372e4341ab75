//! citymap CLI library.
//!
//! Subcommand handlers and output formatting for the `citymap-cli` binary.

pub mod commands;
pub mod output;
