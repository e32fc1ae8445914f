//! In-memory metadata store for tests.
//!
//! Applies the same matching rules as the database: a TOC matches when every
//! stored track length lies within the tolerance window of the requested
//! duration and the track counts agree.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{MetadataStore, StoreError};
use crate::cddb::query::{ExactQuery, FuzzyQuery};
use crate::model::{DatabaseStats, DiscRef, MatchCandidate, ReleaseRecord};

/// A medium as the mock store keeps it.
#[derive(Debug, Clone)]
pub struct StoredMedium {
    pub id: u32,
    pub freedb_id: Option<u32>,
    /// `None` when the medium has no format
    pub has_discids: Option<bool>,
    pub release: ReleaseRecord,
}

impl StoredMedium {
    fn candidate(&self, disc: DiscRef) -> MatchCandidate {
        MatchCandidate {
            disc,
            artist: self.release.artist.clone(),
            title: self.release.title.clone(),
        }
    }

    fn may_have_discids(&self) -> bool {
        self.has_discids != Some(false)
    }

    fn within(&self, durations: &[i64], track_count: i32, fuzzy: i32) -> bool {
        let tracks = &self.release.tracks;
        tracks.len() as i32 == track_count
            && tracks.len() == durations.len()
            && tracks
                .iter()
                .zip(durations)
                .all(|(track, &duration)| (track.length_ms - duration).abs() <= i64::from(fuzzy))
    }
}

/// Mock store holding a fixed set of media.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub media: Vec<StoredMedium>,
    pub last_replication: Option<DateTime<Utc>>,
    /// Error to return from every call (takes precedence over data)
    pub error: Option<StoreError>,
}

impl MemoryStore {
    pub fn new(media: Vec<StoredMedium>) -> Self {
        Self {
            media,
            ..Default::default()
        }
    }

    /// A store whose every call fails with `error`.
    pub fn with_error(error: StoreError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MetadataStore for MemoryStore {
    async fn find_by_discid(&self, query: &ExactQuery) -> Result<Vec<MatchCandidate>, StoreError> {
        self.check()?;
        Ok(self
            .media
            .iter()
            .find(|medium| {
                medium.may_have_discids()
                    && medium.freedb_id == Some(query.discid)
                    && medium.release.tracks.len() as i32 == query.track_count
            })
            .map(|medium| medium.candidate(DiscRef::FreedbId(query.discid)))
            .into_iter()
            .collect())
    }

    async fn find_by_toc(&self, query: &FuzzyQuery) -> Result<Vec<MatchCandidate>, StoreError> {
        self.check()?;
        Ok(self
            .media
            .iter()
            .filter(|medium| medium.may_have_discids())
            .filter(|medium| {
                medium.within(query.durations.as_slice(), query.track_count, query.fuzzy)
                    || medium.within(
                        query.trimmed.as_slice(),
                        query.trimmed_track_count(),
                        query.fuzzy,
                    )
            })
            .map(|medium| medium.candidate(DiscRef::Medium(medium.id)))
            .collect())
    }

    async fn find_release(&self, disc: DiscRef) -> Result<Option<ReleaseRecord>, StoreError> {
        self.check()?;
        let found = match disc {
            DiscRef::Medium(id) => self.media.iter().find(|medium| medium.id == id),
            DiscRef::FreedbId(id) => self
                .media
                .iter()
                .filter(|medium| medium.freedb_id == Some(id))
                .min_by_key(|medium| medium.id),
        };
        Ok(found.map(|medium| medium.release.clone()))
    }

    async fn stats(&self) -> Result<DatabaseStats, StoreError> {
        self.check()?;
        let discids: HashSet<u32> = self.media.iter().filter_map(|m| m.freedb_id).collect();
        Ok(DatabaseStats {
            medium_count: self.media.len() as i64,
            discid_count: discids.len() as i64,
        })
    }

    async fn last_replication(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        self.check()?;
        Ok(self.last_replication)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cddb::query::DiscQuery;
    use crate::test_utils::{sample_medium, sample_toc_args};

    #[tokio::test]
    async fn test_fuzzy_match_within_tolerance() {
        let store = MemoryStore::new(vec![sample_medium()]);
        let plan = DiscQuery::parse(&sample_toc_args()).unwrap().plan();

        let matches = store.find_by_toc(&plan.fuzzy).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].disc, DiscRef::Medium(sample_medium().id));
    }

    #[tokio::test]
    async fn test_trimmed_match_for_data_track() {
        // Store only knows the audio tracks; the client reports an extra data track
        let mut audio_only = sample_medium();
        audio_only.release.tracks.pop();
        if let Some(last) = audio_only.release.tracks.last_mut() {
            last.length_ms -= crate::toc::DATA_SESSION_GAP_MS;
        }
        let store = MemoryStore::new(vec![audio_only]);
        let plan = DiscQuery::parse(&sample_toc_args()).unwrap().plan();

        let matches = store.find_by_toc(&plan.fuzzy).await.unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn test_formats_without_discids_are_skipped() {
        let medium = StoredMedium {
            has_discids: Some(false),
            ..sample_medium()
        };
        let store = MemoryStore::new(vec![medium]);
        let plan = DiscQuery::parse(&sample_toc_args()).unwrap().plan();

        assert!(store.find_by_toc(&plan.fuzzy).await.unwrap().is_empty());
        assert!(store.find_by_discid(&plan.exact).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_discid_lookup_dedupes() {
        let first = sample_medium();
        let second = StoredMedium {
            id: first.id + 1,
            ..first.clone()
        };
        let store = MemoryStore::new(vec![first.clone(), second]);
        let plan = DiscQuery::parse(&sample_toc_args()).unwrap().plan();

        let matches = store.find_by_discid(&plan.exact).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].disc, DiscRef::FreedbId(first.freedb_id.unwrap()));

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.medium_count, 2);
        assert_eq!(stats.discid_count, 1);
    }

    #[tokio::test]
    async fn test_error_takes_precedence() {
        let store = MemoryStore::with_error(StoreError::Unavailable("down".into()));
        let result = store.stats().await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
