//! Per-item flow: record in the store, render, filter, then publish.
//!
//! The store insert comes first so an item is never offered twice, even if
//! its publish later fails.

use crate::config::Config;
use crate::feed::FeedItem;
use crate::nostr::NotePublisher;
use crate::store::{Recorded, SeenStore};

/// What happened to one feed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    AlreadySeen,
    StoreFailed,
    Filtered,
    DryRun,
    Published,
    PublishFailed,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl RunReport {
    pub fn count(&self, outcome: ItemOutcome) -> usize {
        self.outcomes.iter().filter(|o| **o == outcome).count()
    }
}

pub struct Pipeline<'a> {
    config: &'a Config,
    store: &'a dyn SeenStore,
    publisher: Option<&'a dyn NotePublisher>,
}

impl<'a> Pipeline<'a> {
    /// Without a publisher every item that passes the filter is handled as a
    /// dry run.
    pub fn new(
        config: &'a Config,
        store: &'a dyn SeenStore,
        publisher: Option<&'a dyn NotePublisher>,
    ) -> Self {
        Self {
            config,
            store,
            publisher,
        }
    }

    /// Process items in feed order. Item failures are logged, never returned.
    pub async fn run(&self, items: &[FeedItem]) -> RunReport {
        let mut report = RunReport::default();
        for item in items {
            report.outcomes.push(self.process_item(item).await);
        }
        report
    }

    pub async fn process_item(&self, item: &FeedItem) -> ItemOutcome {
        let feed = self.config.feed_url.as_str();
        let guid = item.guid.as_str();

        match self.store.record(feed, guid).await {
            Ok(Recorded::New) => {}
            Ok(Recorded::AlreadySeen) => {
                tracing::trace!(guid, "already seen");
                return ItemOutcome::AlreadySeen;
            }
            Err(e) => {
                tracing::warn!(guid, error = %e, "failed to record item, skipping");
                return ItemOutcome::StoreFailed;
            }
        }

        let content = self.config.template.render(item);

        if !self.config.filter.allows(&content) {
            tracing::debug!(guid, "content does not match pattern, skipping");
            return ItemOutcome::Filtered;
        }

        let publisher = match self.publisher {
            Some(p) if !self.config.dry_run => p,
            _ => {
                tracing::info!(guid, content = ?content, "dry run, not publishing");
                return ItemOutcome::DryRun;
            }
        };

        match publisher.publish(item.link_or_empty(), &content).await {
            Ok(_) => ItemOutcome::Published,
            Err(e) => {
                tracing::error!(guid, error = %e, "publish failed");
                ItemOutcome::PublishFailed
            }
        }
    }
}
