//! Command-line interface for freedb-gateway.
//!
//! Runs the HTTP gateway, answers a single protocol command from the shell,
//! or writes a default config file.

mod commands;

pub use commands::{Cli, Commands, run_command};
