//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror` ([`ProtocolError`]
//! for client mistakes, [`StoreError`] for the metadata store, [`ConfigError`]
//! for config files), while CLI/main uses `anyhow` for convenient error
//! propagation.
//!
//! [`ProtocolError`]: crate::cddb::ProtocolError
//!
//! # Example
//!
//! ```ignore
//! use freedb_gateway::error::{Result, ResultExt};
//!
//! async fn open(config: &DatabaseConfig) -> Result<PgPool> {
//!     let pool = PgPool::connect(&config.url)
//!         .await
//!         .with_context("connecting to the metadata database")?;
//!     Ok(pool)
//! }
//! ```

use crate::config::ConfigError;
use crate::store::StoreError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error (binding the listener, serving connections)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database error outside of a request (connecting the pool)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Metadata store failure surfaced to the operator
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid listen address or similar startup input
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an invalid address error.
    pub fn invalid_address(message: impl Into<String>) -> Self {
        Self::InvalidAddress(message.into())
    }

    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, StoreError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Store(e).context(ctx))
    }
}
