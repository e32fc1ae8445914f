//! Text of every protocol reply the gateway produces.
//!
//! QUERY and READ are built from store rows; the rest are fixed texts with at
//! most a couple of live values filled in.

use chrono::{DateTime, Utc};

use super::command::{MAX_PROTO_LEVEL, ProtocolLevel};
use super::response::{Response, Status};
use crate::model::{Category, DatabaseStats, DiscRef, MatchCandidate, ReleaseRecord, display_artist};
use crate::toc::ms_to_frames;

/// Name reported in VER and xmcd headers.
pub const GATEWAY_NAME: &str = "freedb-gateway";

/// Version reported in VER and xmcd headers.
pub const GATEWAY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Frame offset of the first track (the standard two-second pregap).
pub const FIRST_TRACK_OFFSET: i64 = 150;

/// Path clients post CDDB commands to.
pub const CGI_PATH: &str = "/~cddb/cddb.cgi";

/// Public identity of this server, as reported by SITES.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    pub port: u16,
}

// ============================================================================
// QUERY / READ
// ============================================================================

/// Reply to `cddb query`.
///
/// Always answers 211 "inexact matches", even for a single checksum hit:
/// clients expect a list here. TOC matches are listed before checksum matches.
pub fn query_matches(fuzzy: &[MatchCandidate], exact: &[MatchCandidate]) -> Response {
    if fuzzy.is_empty() && exact.is_empty() {
        return Response::status(Status::NoMatch, "No match found.");
    }

    let lines = fuzzy
        .iter()
        .chain(exact)
        .map(|candidate| {
            format!(
                "{} {} / {}",
                candidate.disc,
                display_artist(&candidate.artist),
                candidate.title
            )
        })
        .collect();

    Response::with_body(
        Status::InexactMatches,
        "Found inexact matches, list follows (until terminating `.')",
        lines,
    )
}

/// Reply to `cddb read`: the xmcd record for one medium.
pub fn xmcd_entry(disc: DiscRef, release: &ReleaseRecord, proto: ProtocolLevel) -> Response {
    let release_artist = display_artist(&release.artist);
    let mut lines = vec![
        "# xmcd CD database file".to_string(),
        "#".to_string(),
        "# Track frame offsets:".to_string(),
    ];

    let mut offset = FIRST_TRACK_OFFSET;
    let mut disc_length = 0;
    for track in &release.tracks {
        lines.push(format!("#\t{}", offset));
        offset += ms_to_frames(track.length_ms);
        disc_length += track.length_ms / 1000;
    }

    lines.extend([
        "#".to_string(),
        format!("# Disc length: {} seconds", disc_length),
        "#".to_string(),
        "# Revision: 1".to_string(),
        format!("# Processed by: {} {}", GATEWAY_NAME, GATEWAY_VERSION),
        format!(
            "# Submitted via: {} {} MusicBrainz FREEDB gateway",
            GATEWAY_NAME, GATEWAY_VERSION
        ),
        "#".to_string(),
        format!("DISCID={}", disc.hex_id()),
        format!("DTITLE={} / {}", release_artist, release.title),
    ]);

    if proto.has_year_and_genre() {
        let year = release.year.map(|y| y.to_string()).unwrap_or_default();
        lines.push(format!("DYEAR={}", year));
        lines.push("DGENRE=Unknown".to_string());
    }

    for (i, track) in release.tracks.iter().enumerate() {
        let track_artist = display_artist(&track.artist);
        if track_artist != release_artist {
            lines.push(format!("TTITLE{}={} / {}", i, track_artist, track.title));
        } else {
            lines.push(format!("TTITLE{}={}", i, track.title));
        }
    }

    lines.push("EXTD=".to_string());
    lines.extend((0..release.tracks.len()).map(|i| format!("EXTT{}=", i)));
    lines.push("PLAYORDER=".to_string());

    Response::with_body(
        Status::Ok,
        "OK, CDDB database entry follows (until terminating `.')",
        lines,
    )
}

// ============================================================================
// Informational commands
// ============================================================================

pub fn lscat() -> Response {
    Response::with_body(
        Status::Ok,
        "OK, category list follows (until terminating `.')",
        Category::ALL.iter().map(|c| c.to_string()).collect(),
    )
}

pub fn sites(server: &ServerInfo) -> Response {
    Response::with_body(
        Status::Ok,
        "OK, site information follows (until terminating `.')",
        vec![format!(
            "{} http {} {} N000.00 W000.00 MusicBrainz FREEDB gateway",
            server.name, server.port, CGI_PATH
        )],
    )
}

pub fn motd(last_replication: Option<DateTime<Utc>>) -> Response {
    let replicated = last_replication
        .map(|date| date.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Response::with_body(
        Status::Ok,
        "Last modified: 07/04/2006 12:00:00 MOTD follows (until terminating `.')",
        vec![
            "Welcome to the MusicBrainz FREEDB gateway.".to_string(),
            "You can find the MusicBrainz website at http://musicbrainz.org/".to_string(),
            format!("This server is running using data last replicated {}", replicated),
        ],
    )
}

pub fn stat(stats: &DatabaseStats) -> Response {
    let mut lines: Vec<String> = [
        "Server status:".to_string(),
        format!("    current proto: {}", MAX_PROTO_LEVEL),
        format!("    max proto: {}", MAX_PROTO_LEVEL),
    ]
    .into_iter()
    .chain(
        [
            "interface: http",
            "gets: no",
            "puts: no",
            "updates: no",
            "posting: no",
            "validation: accepted",
            "quotes: yes",
            "strip ext: no",
            "secure: no",
            "current users: 1",
            "max users: 1",
        ]
        .iter()
        .map(|line| format!("    {}", line)),
    )
    .collect();

    lines.push(format!("Database entries: {}", Category::ALL.len()));
    lines.push("Database entries by category:".to_string());
    lines.push(format!("    {}: {}", Category::Rock, stats.discid_count));
    lines.push(format!("    {}: {}", Category::Misc, stats.medium_count));

    Response::with_body(
        Status::Ok,
        "OK, status information follows (until terminating `.')",
        lines,
    )
}

pub fn whom() -> Response {
    Response::status(Status::NotFound, "No user information available.")
}

pub fn ver() -> Response {
    Response::status(
        Status::Version,
        format!(
            "{} {}, MusicBrainz FREEDB gateway.",
            GATEWAY_NAME, GATEWAY_VERSION
        ),
    )
}

pub fn help() -> Response {
    Response::with_body(
        Status::Ok,
        "OK, help information follows (until terminating `.')",
        [
            "The following commands are supported:",
            "",
            "CDDB <subcmd> (valid subcmds: HELLO LSCAT QUERY READ UNLINK WRITE)",
            "DISCID <ntrks> <off_1> <off_2> <...> <off_n> <nsecs>",
            "GET <file>",
            "HELP [command [subcmd]]",
            "LOG [-l lines] [get [-f flag]] [start_time [end_time]] | [day [days]]",
            "MOTD",
            "PROTO [level]",
            "PUT <file>",
            "QUIT",
            "SITES",
            "STAT",
            "UPDATE",
            "VALIDATE",
            "VER",
            "WHOM",
        ]
        .iter()
        .map(|line| line.to_string())
        .collect(),
    )
}
