//! CLI command definitions and dispatch.
//!
//! Each subcommand is implemented in its own submodule:
//! - `serve`: run the HTTP gateway
//! - `exec`: answer one protocol command line on stdout
//! - `init`: write the default config file

mod exec;
mod init;
mod serve;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::runtime::Runtime;

use crate::config::{self, Config};

pub use exec::cmd_exec;
pub use init::cmd_init_config;
pub use serve::cmd_serve;

/// CDDB/FreeDB protocol gateway backed by a MusicBrainz database
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true, env = "FREEDB_GATEWAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// PostgreSQL URL, overrides `database.url`
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Address to bind, overrides `server.listen`
    #[arg(long, global = true)]
    pub listen: Option<String>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Serve CDDB requests over HTTP (the default)
    Serve,
    /// Answer one protocol command and print the response
    Exec {
        /// Command line, e.g. `cddb read misc 0000002a`
        #[arg(required = true, num_args = 1..)]
        cmd: Vec<String>,
        /// Protocol level
        #[arg(long, default_value = "6")]
        proto: String,
    },
    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command, or the server when none is given.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::InitConfig { force }) => cmd_init_config(cli, *force),
        Some(Commands::Exec { cmd, proto }) => {
            let rt = Runtime::new()?;
            cmd_exec(&rt, &resolve_config(cli)?, &cmd.join(" "), proto)
        }
        Some(Commands::Serve) | None => {
            let rt = Runtime::new()?;
            cmd_serve(&rt, &resolve_config(cli)?)
        }
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Load the config file and apply command-line overrides.
pub(crate) fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = config::load(cli.config.as_deref())?;
    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.database_url {
        config.database.url = url.clone();
    }
    if let Some(listen) = &cli.listen {
        config.server.listen = listen.clone();
    }
}
