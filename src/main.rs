//! freedb-gateway - CDDB/FreeDB protocol gateway over a MusicBrainz database.
//!
//! Legacy CD players and rippers speak the CDDB text protocol over HTTP. This
//! service answers their QUERY and READ requests (plus the informational
//! commands) from a MusicBrainz PostgreSQL replica.

pub mod cddb;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod server;
pub mod store;
#[cfg(test)]
pub mod test_utils;
pub mod toc;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr so `exec` output stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("freedb_gateway=info".parse()?))
        .init();

    cli::run_command(&args)
}
