//! Core data models shared by the protocol and the metadata store.
//!
//! Defines the primary entities: [`MatchCandidate`] for QUERY results,
//! [`ReleaseRecord`] and [`TrackRecord`] for READ, and [`DiscRef`] which
//! ties the two together.
//!
//! # Categories
//!
//! The gateway only exposes two CDDB categories:
//! - `rock` - discs matched by their FreeDB disc ID (checksum)
//! - `misc` - discs matched by TOC geometry, keyed by the store's medium id

use std::fmt;
use std::str::FromStr;

/// Artist credit MusicBrainz uses for compilations.
pub const VARIOUS_ARTISTS: &str = "Various Artists";

/// CDDB category a disc is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Rock,
    Misc,
}

impl Category {
    /// Every category this gateway serves, in LSCAT order.
    pub const ALL: [Category; 2] = [Category::Rock, Category::Misc];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Rock => "rock",
            Category::Misc => "misc",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rock" => Ok(Category::Rock),
            "misc" => Ok(Category::Misc),
            _ => Err(()),
        }
    }
}

/// A disc as a client addresses it: category plus 32-bit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscRef {
    /// FreeDB checksum, shared by every medium with the same layout
    FreedbId(u32),
    /// Store-internal medium id (not a real FreeDB id)
    Medium(u32),
}

impl DiscRef {
    pub fn category(&self) -> Category {
        match self {
            DiscRef::FreedbId(_) => Category::Rock,
            DiscRef::Medium(_) => Category::Misc,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            DiscRef::FreedbId(id) | DiscRef::Medium(id) => *id,
        }
    }

    /// The id as the 8 lowercase hex digits the protocol uses.
    pub fn hex_id(&self) -> String {
        format!("{:08x}", self.id())
    }
}

impl fmt::Display for DiscRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:08x}", self.category(), self.id())
    }
}

/// One disc found by a QUERY.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub disc: DiscRef,
    pub artist: String,
    pub title: String,
}

/// A track of a resolved release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    /// Length in milliseconds (0 when unknown)
    pub length_ms: i64,
    pub title: String,
    pub artist: String,
}

/// The single medium a READ resolved to, with its tracks in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRecord {
    pub title: String,
    pub artist: String,
    pub year: Option<i32>,
    pub tracks: Vec<TrackRecord>,
}

/// Live counters reported by STAT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Number of media in the store
    pub medium_count: i64,
    /// Number of distinct FreeDB ids in the store
    pub discid_count: i64,
}

/// Title for one medium of a release.
///
/// Multi-disc releases get a `(disc N)` suffix so each medium reads as its
/// own CDDB entry.
pub fn medium_title(release_name: &str, position: i32, medium_count: i64) -> String {
    if medium_count > 1 {
        format!("{} (disc {})", release_name, position)
    } else {
        release_name.to_string()
    }
}

/// Artist name as CDDB clients expect it.
pub fn display_artist(name: &str) -> &str {
    if name == VARIOUS_ARTISTS { "Various" } else { name }
}
