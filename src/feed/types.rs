use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Link};

/// One entry of a fetched feed, normalized across RSS, Atom and JSON Feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedItem {
    pub guid: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub published: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
}

impl FeedItem {
    /// Link used for the provenance tag; empty when the entry has none.
    pub fn link_or_empty(&self) -> &str {
        self.link.as_deref().unwrap_or_default()
    }
}

/// Prefer the `alternate` link (what RSS `<link>` maps to), else the first one.
fn primary_link(links: Vec<Link>) -> Option<String> {
    let alternate = links
        .iter()
        .position(|l| l.rel.as_deref().is_none_or(|rel| rel == "alternate"));
    match alternate {
        Some(idx) => links.into_iter().nth(idx).map(|l| l.href),
        None => links.into_iter().next().map(|l| l.href),
    }
}

impl From<Entry> for FeedItem {
    fn from(entry: Entry) -> Self {
        Self {
            guid: entry.id,
            title: entry.title.map(|t| t.content),
            link: primary_link(entry.links),
            description: entry.summary.map(|t| t.content),
            content: entry.content.and_then(|c| c.body),
            author: entry.authors.into_iter().next().map(|p| p.name),
            published: entry.published,
            updated: entry.updated,
            categories: entry.categories.into_iter().map(|c| c.term).collect(),
        }
    }
}
