//! Persistent record of which (feed, guid) pairs have already been handled.
//!
//! The uniqueness constraint on the pair is the dedup mechanism: recording is
//! a single insert, and a rejected insert means the item was seen before.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Result of trying to record a (feed, guid) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    New,
    AlreadySeen,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Create the backing table if it does not exist yet.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Atomically record the pair. A duplicate is `Ok(Recorded::AlreadySeen)`,
    /// not an error.
    async fn record(&self, feed: &str, guid: &str) -> Result<Recorded, StoreError>;
}
