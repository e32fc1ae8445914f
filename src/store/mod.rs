//! Metadata store access.
//!
//! The gateway never computes disc geometry itself. It hands parameterized
//! lookups to a [`MetadataStore`] and formats whatever rows come back.
//! Production uses [`postgres::PgStore`] against a MusicBrainz replica; tests
//! substitute the in-memory store from [`mocks`].
//!
//! # Example
//!
//! ```ignore
//! use freedb_gateway::store::{MetadataStore, postgres::PgStore};
//!
//! let store = PgStore::connect(&config.database).await?;
//! let matches = store.find_by_toc(&plan.fuzzy).await?;
//! ```

#[cfg(test)]
pub mod mocks;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cddb::query::{ExactQuery, FuzzyQuery};
use crate::model::{DatabaseStats, DiscRef, MatchCandidate, ReleaseRecord};

/// Read-only view of the metadata store.
///
/// Implementations must be safe to share between concurrent requests.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Media with the given FreeDB id and track count, at most one per id.
    async fn find_by_discid(&self, query: &ExactQuery) -> Result<Vec<MatchCandidate>, StoreError>;

    /// Media whose TOC falls inside the query's tolerance window.
    async fn find_by_toc(&self, query: &FuzzyQuery) -> Result<Vec<MatchCandidate>, StoreError>;

    /// Resolve one medium with its tracks. For a FreeDB id shared by several
    /// media, the first one wins.
    async fn find_release(&self, disc: DiscRef) -> Result<Option<ReleaseRecord>, StoreError>;

    /// Medium and distinct disc id counts.
    async fn stats(&self) -> Result<DatabaseStats, StoreError>;

    /// When the replica last applied a replication packet.
    async fn last_replication(&self) -> Result<Option<DateTime<Utc>>, StoreError>;
}

/// Errors raised by a store call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store refused the parameters (bad types, out-of-range values).
    /// Only detectable after submission.
    #[error("Store rejected request: {0}")]
    InvalidInput(String),

    /// The store could not be reached or did not answer.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Whether a SQLSTATE blames the request rather than the store.
///
/// Class 22 is "data exception", class 42 is "syntax error or access rule
/// violation".
pub fn is_input_sqlstate(code: &str) -> bool {
    code.starts_with("22") || code.starts_with("42")
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.code() {
                Some(code) if is_input_sqlstate(&code) => StoreError::InvalidInput(err.to_string()),
                _ => StoreError::Unavailable(err.to_string()),
            },
            sqlx::Error::Encode(_) => StoreError::InvalidInput(err.to_string()),
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}
