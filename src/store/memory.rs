use super::{Recorded, SeenStore, StoreError};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

/// In-process store with the same uniqueness semantics as the database table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<HashSet<(String, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, feed: &str, guid: &str) -> bool {
        self.rows
            .lock()
            .map(|rows| rows.contains(&(feed.to_string(), guid.to_string())))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SeenStore for MemoryStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn record(&self, feed: &str, guid: &str) -> Result<Recorded, StoreError> {
        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::Poisoned)?;
        if rows.insert((feed.to_string(), guid.to_string())) {
            Ok(Recorded::New)
        } else {
            Ok(Recorded::AlreadySeen)
        }
    }
}
