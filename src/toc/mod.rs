//! Table-of-contents arithmetic.
//!
//! A CDDB client identifies a disc by its layout: one frame offset per track
//! plus the lead-out (total disc length). Offsets come in as CD frames
//! (1/75 second) and leave as per-track durations in milliseconds, which is
//! what the metadata store indexes for fuzzy lookups.
//!
//! # Example
//!
//! ```ignore
//! use freedb_gateway::toc::Toc;
//!
//! let toc = Toc::from_cddb(vec![150, 12345, 54321], 2162)?;
//! let full = toc.durations();
//! let trimmed = toc.trimmed_durations();
//! ```

/// CD-audio frames per second.
pub const FRAMES_PER_SECOND: i64 = 75;

/// Gap between an audio session and a trailing data session, in frames.
pub const DATA_SESSION_GAP_FRAMES: i64 = 11_400;

/// [`DATA_SESSION_GAP_FRAMES`] expressed in milliseconds.
pub const DATA_SESSION_GAP_MS: i64 = DATA_SESSION_GAP_FRAMES * 1000 / FRAMES_PER_SECOND;

/// Largest frame offset accepted from a client.
pub const MAX_FRAME_OFFSET: i64 = i32::MAX as i64;

/// Convert a frame count to milliseconds (floor).
pub fn frames_to_ms(frames: i64) -> i64 {
    frames * 1000 / FRAMES_PER_SECOND
}

/// Convert milliseconds to a frame count (floor).
pub fn ms_to_frames(ms: i64) -> i64 {
    ms * FRAMES_PER_SECOND / 1000
}

/// Reasons a set of offsets does not describe a disc.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TocError {
    #[error("a disc needs at least one track")]
    NoTracks,

    #[error("offset {value} at index {index} is out of range")]
    OutOfRange { index: usize, value: i64 },

    #[error("offsets must be strictly increasing (index {index})")]
    NotIncreasing { index: usize },
}

/// A disc layout: track start offsets followed by the lead-out, all in frames.
///
/// Always holds at least two offsets (one track plus lead-out), each within
/// `0..=MAX_FRAME_OFFSET` and strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toc {
    offsets: Vec<i64>,
}

impl Toc {
    /// Build a TOC from frame offsets whose last element is the lead-out.
    pub fn new(offsets: Vec<i64>) -> Result<Self, TocError> {
        if offsets.len() < 2 {
            return Err(TocError::NoTracks);
        }

        for (index, &value) in offsets.iter().enumerate() {
            if !(0..=MAX_FRAME_OFFSET).contains(&value) {
                return Err(TocError::OutOfRange { index, value });
            }
            if index > 0 && value <= offsets[index - 1] {
                return Err(TocError::NotIncreasing { index });
            }
        }

        Ok(Self { offsets })
    }

    /// Build a TOC the way a `cddb query` line describes it: track offsets in
    /// frames and the total disc length in whole seconds.
    pub fn from_cddb(mut track_offsets: Vec<i64>, total_seconds: i64) -> Result<Self, TocError> {
        let index = track_offsets.len();
        let leadout = total_seconds
            .checked_mul(FRAMES_PER_SECOND)
            .ok_or(TocError::OutOfRange {
                index,
                value: total_seconds,
            })?;
        track_offsets.push(leadout);
        Self::new(track_offsets)
    }

    /// Number of tracks on the disc.
    pub fn track_count(&self) -> usize {
        self.offsets.len() - 1
    }

    /// All offsets including the lead-out.
    pub fn offsets(&self) -> &[i64] {
        &self.offsets
    }

    /// Lead-out offset in frames.
    pub fn leadout(&self) -> i64 {
        self.offsets[self.offsets.len() - 1]
    }

    /// Per-track durations in milliseconds.
    pub fn durations(&self) -> DurationSet {
        DurationSet(
            self.offsets
                .windows(2)
                .map(|pair| frames_to_ms(pair[1] - pair[0]))
                .collect(),
        )
    }

    /// Durations as they would look without a trailing data track.
    ///
    /// Drops the last track and takes the session gap off the new last
    /// track. A single-track disc has nothing to drop and is returned as is.
    pub fn trimmed_durations(&self) -> DurationSet {
        let mut durations = self.durations();
        if durations.len() > 1 {
            durations.0.pop();
            if let Some(last) = durations.0.last_mut() {
                *last -= DATA_SESSION_GAP_MS;
            }
        }
        durations
    }
}

/// Ordered per-track durations in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DurationSet(Vec<i64>);

impl DurationSet {
    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<i64> {
        self.0.clone()
    }
}

impl From<Vec<i64>> for DurationSet {
    fn from(durations: Vec<i64>) -> Self {
        Self(durations)
    }
}
