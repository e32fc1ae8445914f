//! Argument parsing for `cddb query` / `cddb read` and the search requests
//! built from them.
//!
//! A QUERY turns into two independent store lookups:
//! - [`ExactQuery`] - media whose FreeDB id equals the client's disc id
//! - [`FuzzyQuery`] - media whose stored TOC lies inside a tolerance window
//!   around the client's durations (or the data-track-trimmed durations)
//!
//! Nothing here measures distances; the store evaluates containment itself.

use crate::model::{Category, DiscRef};
use crate::toc::{DurationSet, Toc};

use super::response::ProtocolError;

/// Half-width of the fuzzy search window, in the store's TOC units (ms).
pub const FUZZY_TOLERANCE: i32 = 10_000;

/// A parsed `cddb query <discid> <ntrks> <off_1> .. <off_n> <nsecs>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscQuery {
    pub discid: u32,
    pub toc: Toc,
}

impl DiscQuery {
    /// Parse the arguments following `cddb query`.
    pub fn parse(args: &[String]) -> Result<Self, ProtocolError> {
        if args.len() < 3 {
            return Err(ProtocolError::Syntax);
        }

        let discid = parse_hex_id(&args[0])?;

        let num_tracks: i32 = args[1].parse().map_err(|_| ProtocolError::Syntax)?;
        if num_tracks < 1 {
            return Err(ProtocolError::Syntax);
        }
        let num_tracks = num_tracks as usize;
        if args.len() < 3 + num_tracks {
            return Err(ProtocolError::Syntax);
        }

        let offsets = args[2..2 + num_tracks]
            .iter()
            .map(|token| token.parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ProtocolError::Syntax)?;
        let total_seconds: i64 = args[2 + num_tracks]
            .parse()
            .map_err(|_| ProtocolError::Syntax)?;

        let toc = Toc::from_cddb(offsets, total_seconds).map_err(|e| {
            tracing::debug!("Rejecting TOC: {}", e);
            ProtocolError::Syntax
        })?;

        Ok(Self { discid, toc })
    }

    /// Build both store lookups.
    pub fn plan(&self) -> QueryPlan {
        let track_count = self.toc.track_count() as i32;
        QueryPlan {
            exact: ExactQuery {
                discid: self.discid,
                track_count,
            },
            fuzzy: FuzzyQuery {
                durations: self.toc.durations(),
                trimmed: self.toc.trimmed_durations(),
                track_count,
                fuzzy: FUZZY_TOLERANCE,
            },
        }
    }
}

/// Media carrying this FreeDB id with this many tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactQuery {
    pub discid: u32,
    pub track_count: i32,
}

impl ExactQuery {
    /// The id as stored by the database (8 lowercase hex digits).
    pub fn freedb_id(&self) -> String {
        format!("{:08x}", self.discid)
    }
}

/// Media whose TOC lies within `fuzzy` of `durations` with `track_count`
/// tracks, or within `fuzzy` of `trimmed` with one track fewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyQuery {
    pub durations: DurationSet,
    pub trimmed: DurationSet,
    pub track_count: i32,
    pub fuzzy: i32,
}

impl FuzzyQuery {
    /// Track count the trimmed durations are matched against.
    pub fn trimmed_track_count(&self) -> i32 {
        self.track_count - 1
    }
}

/// The pair of lookups answering one QUERY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub exact: ExactQuery,
    pub fuzzy: FuzzyQuery,
}

/// Parse the arguments following `cddb read`: `<category> <id>`.
pub fn parse_disc_ref(args: &[String]) -> Result<DiscRef, ProtocolError> {
    if args.len() < 2 {
        return Err(ProtocolError::Syntax);
    }

    let category: Category = args[0]
        .parse()
        .map_err(|_| ProtocolError::EntryNotFound)?;
    let id = parse_hex_id(&args[1])?;

    Ok(match category {
        Category::Rock => DiscRef::FreedbId(id),
        Category::Misc => DiscRef::Medium(id),
    })
}

/// Parse a 32-bit hexadecimal disc id.
pub fn parse_hex_id(token: &str) -> Result<u32, ProtocolError> {
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ProtocolError::IdNotHex);
    }
    u32::from_str_radix(token, 16).map_err(|_| ProtocolError::IdNotHex)
}
