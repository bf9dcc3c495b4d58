pub mod http;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;
pub use types::FeedItem;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("feed request to {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to parse feed: {0}")]
    Parse(#[from] feed_rs::parser::ParseFeedError),
}

/// Anything that can turn a feed URL into its current list of items.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>, FeedError>;
}
