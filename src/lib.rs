//! Post new RSS/Atom feed items to Nostr relays.
//!
//! One run fetches the feed, and for each item: records it in the seen-item
//! store, renders the post, applies the optional pattern, then signs and
//! publishes a text note.

pub mod config;
pub mod feed;
pub mod filter;
pub mod nostr;
pub mod pipeline;
pub mod render;
pub mod store;
