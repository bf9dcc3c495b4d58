use super::{FeedError, FeedItem, FeedSource};
use async_trait::async_trait;
use feed_rs::model::{Link, Text};
use reqwest::Client;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetches a feed over HTTP and parses it with `feed-rs`.
pub struct HttpFeed {
    client: Client,
}

impl HttpFeed {
    pub fn new() -> Result<Self, FeedError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

/// Id for an item that carries none: its first link, or empty.
///
/// feed-rs would otherwise derive one from the title or a random UUID, and
/// neither survives between runs.
fn stable_id(links: &[Link], _title: &Option<Text>, _uri: Option<&str>) -> String {
    links
        .first()
        .map(|l| l.href.trim_end_matches('/').to_string())
        .unwrap_or_default()
}

/// Parse an RSS, Atom or JSON Feed document. Items keep document order.
pub fn parse_feed(body: &[u8]) -> Result<Vec<FeedItem>, FeedError> {
    let feed = feed_rs::parser::Builder::new()
        .id_generator(stable_id)
        .build()
        .parse(body)?;
    Ok(feed.entries.into_iter().map(FeedItem::from).collect())
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedItem>, FeedError> {
        tracing::debug!(url, "fetching feed");

        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        let items = parse_feed(&body)?;

        tracing::debug!(url, count = items.len(), "parsed feed");
        Ok(items)
    }
}
