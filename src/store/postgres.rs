//! [`MetadataStore`] backed by a MusicBrainz PostgreSQL replica.
//!
//! Relies on the MusicBrainz schema as shipped with its replication
//! packages, including the `cube` extension and `create_bounding_cube()`
//! used by the fuzzy TOC index (`medium_index.toc`). Every value derived
//! from a client request is bound as a parameter.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::{MetadataStore, StoreError};
use crate::cddb::query::{ExactQuery, FuzzyQuery};
use crate::config::DatabaseConfig;
use crate::error::{self, ResultExt};
use crate::model::{
    DatabaseStats, DiscRef, MatchCandidate, ReleaseRecord, TrackRecord, medium_title,
};

// ============================================================================
// SQL
// ============================================================================

/// Media matched by TOC geometry. `$1` full durations, `$2` trimmed
/// durations, `$3` tolerance, `$4` track count.
const TOC_QUERY: &str = r#"
    SELECT DISTINCT
        m.id,
        r.name AS release_name,
        m.position,
        (SELECT count(*) FROM medium WHERE release = r.id) AS medium_count,
        ac.name AS artist
    FROM medium m
    LEFT JOIN medium_format mf ON m.format = mf.id
    JOIN release r ON m.release = r.id
    JOIN artist_credit ac ON r.artist_credit = ac.id
    JOIN medium_index mi ON mi.medium = m.id
    WHERE mf.has_discids IS DISTINCT FROM FALSE
      AND (
        (mi.toc <@ create_bounding_cube($1::integer[], $3) AND m.track_count = $4)
        OR
        (mi.toc <@ create_bounding_cube($2::integer[], $3) AND m.track_count = $4 - 1)
      )
    "#;

/// One medium per FreeDB id. `$1` freedb id, `$2` track count.
const DISCID_QUERY: &str = r#"
    SELECT DISTINCT ON (c.freedb_id)
        m.id,
        r.name AS release_name,
        m.position,
        (SELECT count(*) FROM medium WHERE release = r.id) AS medium_count,
        ac.name AS artist
    FROM medium m
    LEFT JOIN medium_format mf ON m.format = mf.id
    JOIN release r ON m.release = r.id
    JOIN artist_credit ac ON r.artist_credit = ac.id
    JOIN medium_cdtoc mc ON m.id = mc.medium
    JOIN cdtoc c ON c.id = mc.cdtoc
    WHERE mf.has_discids IS DISTINCT FROM FALSE
      AND c.freedb_id = $1
      AND m.track_count = $2
    "#;

/// One medium by internal id. `$1` medium id.
const RELEASE_BY_MEDIUM_QUERY: &str = r#"
    SELECT
        m.id,
        r.name AS release_name,
        m.position,
        (SELECT count(*) FROM medium WHERE release = r.id) AS medium_count,
        ac.name AS artist,
        (SELECT min(re.date_year) FROM release_event re WHERE re.release = r.id) AS year
    FROM medium m
    JOIN release r ON m.release = r.id
    JOIN artist_credit ac ON r.artist_credit = ac.id
    WHERE m.id = $1
    "#;

/// First medium carrying a FreeDB id. `$1` freedb id.
const RELEASE_BY_DISCID_QUERY: &str = r#"
    SELECT
        m.id,
        r.name AS release_name,
        m.position,
        (SELECT count(*) FROM medium WHERE release = r.id) AS medium_count,
        ac.name AS artist,
        (SELECT min(re.date_year) FROM release_event re WHERE re.release = r.id) AS year
    FROM medium m
    JOIN release r ON m.release = r.id
    JOIN artist_credit ac ON r.artist_credit = ac.id
    JOIN medium_cdtoc mc ON m.id = mc.medium
    JOIN cdtoc c ON c.id = mc.cdtoc
    WHERE c.freedb_id = $1
    ORDER BY m.id
    LIMIT 1
    "#;

const TRACKS_QUERY: &str = r#"
    SELECT t.length, t.name AS title, ac.name AS artist
    FROM track t
    JOIN artist_credit ac ON t.artist_credit = ac.id
    WHERE t.medium = $1
    ORDER BY t.position
    "#;

const MEDIUM_COUNT_QUERY: &str = "SELECT count(id) FROM medium";
const DISCID_COUNT_QUERY: &str = "SELECT count(DISTINCT freedb_id) FROM cdtoc";
const REPLICATION_QUERY: &str = "SELECT last_replication_date FROM replication_control";

// ============================================================================
// Row Types
// ============================================================================

/// A medium found by one of the match queries.
#[derive(Debug, sqlx::FromRow)]
struct MediumRow {
    id: i32,
    release_name: String,
    position: i32,
    medium_count: i64,
    artist: String,
}

impl MediumRow {
    fn into_candidate(self, disc: DiscRef) -> MatchCandidate {
        MatchCandidate {
            disc,
            title: medium_title(&self.release_name, self.position, self.medium_count),
            artist: self.artist,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReleaseRow {
    id: i32,
    release_name: String,
    position: i32,
    medium_count: i64,
    artist: String,
    year: Option<i16>,
}

#[derive(Debug, sqlx::FromRow)]
struct TrackRow {
    length: Option<i32>,
    title: String,
    artist: String,
}

impl From<TrackRow> for TrackRecord {
    fn from(row: TrackRow) -> Self {
        TrackRecord {
            length_ms: row.length.map(i64::from).unwrap_or(0),
            title: row.title,
            artist: row.artist,
        }
    }
}

// ============================================================================
// Store
// ============================================================================

/// PostgreSQL-backed metadata store. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Open a connection pool and make sure the database answers.
    pub async fn connect(config: &DatabaseConfig) -> error::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(&config.url)
            .await
            .with_context("connecting to the metadata database")?;

        tracing::info!(
            max_connections = config.max_connections,
            "Connected to metadata database"
        );
        Ok(Self { pool })
    }

    async fn fetch_release(&self, disc: DiscRef) -> sqlx::Result<Option<ReleaseRow>> {
        match disc {
            DiscRef::Medium(id) => {
                sqlx::query_as::<_, ReleaseRow>(RELEASE_BY_MEDIUM_QUERY)
                    .bind(i64::from(id))
                    .fetch_optional(&self.pool)
                    .await
            }
            DiscRef::FreedbId(_) => {
                sqlx::query_as::<_, ReleaseRow>(RELEASE_BY_DISCID_QUERY)
                    .bind(disc.hex_id())
                    .fetch_optional(&self.pool)
                    .await
            }
        }
    }
}

#[async_trait]
impl MetadataStore for PgStore {
    async fn find_by_discid(&self, query: &ExactQuery) -> Result<Vec<MatchCandidate>, StoreError> {
        let started = Instant::now();
        let rows = sqlx::query_as::<_, MediumRow>(DISCID_QUERY)
            .bind(query.freedb_id())
            .bind(query.track_count)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Disc id lookup"
        );
        Ok(rows
            .into_iter()
            .map(|row| row.into_candidate(DiscRef::FreedbId(query.discid)))
            .collect())
    }

    async fn find_by_toc(&self, query: &FuzzyQuery) -> Result<Vec<MatchCandidate>, StoreError> {
        let started = Instant::now();
        let rows = sqlx::query_as::<_, MediumRow>(TOC_QUERY)
            .bind(query.durations.to_vec())
            .bind(query.trimmed.to_vec())
            .bind(query.fuzzy)
            .bind(query.track_count)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            rows = rows.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "TOC lookup"
        );
        // medium ids are positive serials
        Ok(rows
            .into_iter()
            .map(|row| {
                let disc = DiscRef::Medium(row.id as u32);
                row.into_candidate(disc)
            })
            .collect())
    }

    async fn find_release(&self, disc: DiscRef) -> Result<Option<ReleaseRecord>, StoreError> {
        let Some(release) = self.fetch_release(disc).await? else {
            return Ok(None);
        };

        let tracks = sqlx::query_as::<_, TrackRow>(TRACKS_QUERY)
            .bind(release.id)
            .fetch_all(&self.pool)
            .await?;

        Ok(Some(ReleaseRecord {
            title: medium_title(&release.release_name, release.position, release.medium_count),
            artist: release.artist,
            year: release.year.map(i32::from),
            tracks: tracks.into_iter().map(TrackRecord::from).collect(),
        }))
    }

    async fn stats(&self) -> Result<DatabaseStats, StoreError> {
        // Two independent reads; the counts may come from different snapshots.
        let (medium_count,): (i64,) = sqlx::query_as(MEDIUM_COUNT_QUERY)
            .fetch_one(&self.pool)
            .await?;
        let (discid_count,): (i64,) = sqlx::query_as(DISCID_COUNT_QUERY)
            .fetch_one(&self.pool)
            .await?;

        Ok(DatabaseStats {
            medium_count,
            discid_count,
        })
    }

    async fn last_replication(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let row: Option<(Option<DateTime<Utc>>,)> = sqlx::query_as(REPLICATION_QUERY)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.and_then(|(date,)| date))
    }
}
