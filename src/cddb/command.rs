//! Command-line parsing for the CDDB protocol.
//!
//! A request carries the whole command line as one string. It is lower-cased,
//! split on whitespace and mapped onto a closed set of [`Command`] variants.
//! Anything outside that set becomes an `Unknown` variant carrying the token.

use super::response::ProtocolError;

/// Highest protocol level this gateway speaks.
pub const MAX_PROTO_LEVEL: u8 = 6;

/// Top-level protocol command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Cddb(CddbCommand),
    Sites,
    Motd,
    Stat,
    Whom,
    Ver,
    Help,
    Unknown(String),
}

/// `CDDB <subcmd>` commands. Arguments are the tokens after the sub-command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CddbCommand {
    Query(Vec<String>),
    Read(Vec<String>),
    Lscat,
    Unknown(String),
}

impl Command {
    /// Parse a raw command line.
    ///
    /// Fails only when there is nothing to route on: a blank line, or `cddb`
    /// with no sub-command.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let mut tokens = line.split_whitespace().map(str::to_lowercase);
        let first = tokens.next().ok_or(ProtocolError::MissingArguments)?;

        let command = match first.as_str() {
            "cddb" => {
                let sub = tokens.next().ok_or(ProtocolError::MissingArguments)?;
                let args: Vec<String> = tokens.collect();
                Command::Cddb(match sub.as_str() {
                    "query" => CddbCommand::Query(args),
                    "read" => CddbCommand::Read(args),
                    "lscat" => CddbCommand::Lscat,
                    _ => CddbCommand::Unknown(sub),
                })
            }
            "sites" => Command::Sites,
            "motd" => Command::Motd,
            "stat" => Command::Stat,
            "whom" => Command::Whom,
            "ver" => Command::Ver,
            "help" => Command::Help,
            _ => Command::Unknown(first),
        };

        Ok(command)
    }

    /// Short name for logs.
    pub fn name(&self) -> &str {
        match self {
            Command::Cddb(CddbCommand::Query(_)) => "cddb query",
            Command::Cddb(CddbCommand::Read(_)) => "cddb read",
            Command::Cddb(CddbCommand::Lscat) => "cddb lscat",
            Command::Cddb(CddbCommand::Unknown(sub)) => sub,
            Command::Sites => "sites",
            Command::Motd => "motd",
            Command::Stat => "stat",
            Command::Whom => "whom",
            Command::Ver => "ver",
            Command::Help => "help",
            Command::Unknown(token) => token,
        }
    }
}

/// Protocol level negotiated by the client through the `proto` parameter.
///
/// Levels that do not parse as a number are kept as "unknown" and get the
/// most conservative output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolLevel(Option<u8>);

impl ProtocolLevel {
    pub fn parse(raw: &str) -> Self {
        Self(raw.trim().parse().ok())
    }

    pub fn level(&self) -> Option<u8> {
        self.0
    }

    /// `DYEAR`/`DGENRE` exist only at the two highest levels.
    pub fn has_year_and_genre(&self) -> bool {
        matches!(self.0, Some(level) if (MAX_PROTO_LEVEL - 1..=MAX_PROTO_LEVEL).contains(&level))
    }
}
