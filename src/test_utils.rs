//! Test utilities and fixtures for freedb-gateway tests.
//!
//! Provides a sample disc (the same layout as a QUERY line and as a stored
//! medium) plus a gateway wired to the in-memory store.
//!
//! # Example
//!
//! ```ignore
//! use crate::test_utils::{sample_medium, sample_query_line, test_gateway};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let gateway = test_gateway(MemoryStore::new(vec![sample_medium()]));
//!     let response = gateway.respond(Some(&sample_query_line()), Some("6")).await?;
//! }
//! ```

use crate::cddb::format::ServerInfo;
use crate::cddb::Gateway;
use crate::model::{ReleaseRecord, TrackRecord};
use crate::store::mocks::{MemoryStore, StoredMedium};

/// FreeDB id of the sample disc.
pub const SAMPLE_DISCID: u32 = 0xb20c3a0d;

/// Medium id of the sample disc.
pub const SAMPLE_MEDIUM_ID: u32 = 42;

/// Arguments of `cddb query` for the sample disc.
pub fn sample_toc_args() -> Vec<String> {
    "b20c3a0d 3 150 12345 54321 2162"
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Full `cddb query` line for the sample disc.
pub fn sample_query_line() -> String {
    format!("cddb query {}", sample_toc_args().join(" "))
}

/// The release behind the sample disc.
///
/// Track lengths equal the durations derived from [`sample_toc_args`].
pub fn sample_release() -> ReleaseRecord {
    ReleaseRecord {
        title: "Sample Album".to_string(),
        artist: "Sample Artist".to_string(),
        year: Some(1999),
        tracks: vec![
            TrackRecord {
                length_ms: (12345 - 150) * 1000 / 75,
                title: "Opening".to_string(),
                artist: "Sample Artist".to_string(),
            },
            TrackRecord {
                length_ms: (54321 - 12345) * 1000 / 75,
                title: "Duet".to_string(),
                artist: "Sample Artist feat. Guest".to_string(),
            },
            TrackRecord {
                length_ms: (2162 * 75 - 54321) * 1000 / 75,
                title: "Closing".to_string(),
                artist: "Sample Artist".to_string(),
            },
        ],
    }
}

/// The sample disc as the store keeps it.
pub fn sample_medium() -> StoredMedium {
    StoredMedium {
        id: SAMPLE_MEDIUM_ID,
        freedb_id: Some(SAMPLE_DISCID),
        has_discids: None,
        release: sample_release(),
    }
}

/// Gateway over `store` with a fixed server identity.
pub fn test_gateway(store: MemoryStore) -> Gateway<MemoryStore> {
    Gateway::new(
        store,
        ServerInfo {
            name: "freedb.test".to_string(),
            port: 80,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cddb::query::DiscQuery;

    #[test]
    fn test_sample_release_matches_sample_toc() {
        let query = DiscQuery::parse(&sample_toc_args()).unwrap();
        let lengths: Vec<i64> = sample_release().tracks.iter().map(|t| t.length_ms).collect();
        assert_eq!(query.toc.durations().as_slice(), lengths.as_slice());
        assert_eq!(query.discid, SAMPLE_DISCID);
    }

    #[test]
    fn test_sample_query_line() {
        assert_eq!(
            sample_query_line(),
            "cddb query b20c3a0d 3 150 12345 54321 2162"
        );
    }
}
