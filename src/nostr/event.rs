use super::keys::Keys;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::LazyLock;

pub const KIND_TEXT_NOTE: u16 = 1;

static HASHTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"#[^\s!@#$%^&*()=+./,\[{\]};:'"?><]+"##).expect("hashtag pattern is valid")
});

/// Hashtags in `content`, without the leading `#`, in order of appearance.
/// Punctuation ends a tag, so `#rust!` yields `rust`.
pub fn hashtags(content: &str) -> Vec<&str> {
    HASHTAG
        .find_iter(content)
        .map(|m| &m.as_str()[1..])
        .collect()
}

/// Ordered tag list where no two tags are identical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<Vec<String>>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append unless an identical tag is already present. Returns whether it was added.
    pub fn append_unique<I, S>(&mut self, tag: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tag: Vec<String> = tag.into_iter().map(Into::into).collect();
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.0.iter().map(Vec::as_slice)
    }

    /// Values of every tag named `name`.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iter()
            .filter(move |t| t.first().is_some_and(|n| n == name))
            .filter_map(|t| t.get(1).map(String::as_str))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedEvent {
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u16,
    pub tags: Tags,
    pub content: String,
}

/// A signed note as it goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub pubkey: String,
    pub created_at: i64,
    pub kind: u16,
    pub tags: Tags,
    pub content: String,
    pub sig: String,
}

impl UnsignedEvent {
    /// Text note re-posting a feed item: a `proxy` tag pointing at the item
    /// link, then one `t` tag per distinct hashtag in the content.
    pub fn text_note(keys: &Keys, link: &str, content: &str, created_at: i64) -> Self {
        let mut tags = Tags::new();
        tags.append_unique(["proxy", link, "rss"]);
        for tag in hashtags(content) {
            tags.append_unique(["t", tag]);
        }

        Self {
            pubkey: keys.public_key_hex(),
            created_at,
            kind: KIND_TEXT_NOTE,
            tags,
            content: content.to_string(),
        }
    }

    /// SHA-256 of `[0, pubkey, created_at, kind, tags, content]`.
    pub fn id(&self) -> [u8; 32] {
        let canonical = serde_json::json!([
            0,
            self.pubkey,
            self.created_at,
            self.kind,
            self.tags,
            self.content
        ]);
        Sha256::digest(canonical.to_string().as_bytes()).into()
    }

    pub fn sign(self, keys: &Keys) -> Event {
        let id = self.id();
        let sig = keys.sign(id);
        Event {
            id: hex::encode(id),
            pubkey: self.pubkey,
            created_at: self.created_at,
            kind: self.kind,
            tags: self.tags,
            content: self.content,
            sig: sig.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::{schnorr, Message, Secp256k1, XOnlyPublicKey};

    const SECRET_HEX: &str = "67dea2ed018072d675f5415ecfaed7d2597555e202d85b3d65ea4e58d2d92ffa";

    fn keys() -> Keys {
        Keys::parse(SECRET_HEX).unwrap()
    }

    #[test]
    fn test_hashtags_stop_at_punctuation() {
        assert_eq!(
            hashtags("Check #golang and #rust-lang!"),
            vec!["golang", "rust-lang"]
        );
        assert_eq!(hashtags("#a.b #c,d #e?"), vec!["a", "c", "e"]);
        assert!(hashtags("no tags # here").is_empty());
    }

    #[test]
    fn test_hashtags_unicode() {
        assert_eq!(hashtags("#日本語 news"), vec!["日本語"]);
    }

    #[test]
    fn test_text_note_tags() {
        let note = UnsignedEvent::text_note(
            &keys(),
            "https://example.com/1",
            "Check #golang and #rust-lang! #golang again",
            1_700_000_000,
        );
        let tags: Vec<&[String]> = note.tags.iter().collect();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0], ["proxy", "https://example.com/1", "rss"]);
        assert_eq!(note.tags.values("t").collect::<Vec<_>>(), vec!["golang", "rust-lang"]);
        assert_eq!(note.kind, KIND_TEXT_NOTE);
        assert_eq!(note.content, "Check #golang and #rust-lang! #golang again");
    }

    #[test]
    fn test_append_unique_compares_whole_tag() {
        let mut tags = Tags::new();
        assert!(tags.append_unique(["t", "rust"]));
        assert!(!tags.append_unique(["t", "rust"]));
        // Same value under another name is a different tag
        assert!(tags.append_unique(["x", "rust"]));
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn test_id_matches_canonical_serialization() {
        let note = UnsignedEvent {
            pubkey: "ab".repeat(32),
            created_at: 1,
            kind: 1,
            tags: Tags::new(),
            content: "hi \"there\"\n".to_string(),
        };
        let expected = format!(
            r#"[0,"{}",1,1,[],"hi \"there\"\n"]"#,
            "ab".repeat(32)
        );
        let digest: [u8; 32] = Sha256::digest(expected.as_bytes()).into();
        assert_eq!(note.id(), digest);
    }

    #[test]
    fn test_signed_event_verifies() {
        let keys = keys();
        let event = UnsignedEvent::text_note(&keys, "https://example.com/1", "hello #nostr", 42)
            .sign(&keys);

        assert_eq!(event.id.len(), 64);
        assert_eq!(event.sig.len(), 128);
        assert_eq!(event.pubkey, keys.public_key_hex());

        let digest: [u8; 32] = hex::decode(&event.id).unwrap().try_into().unwrap();
        let sig = schnorr::Signature::from_slice(&hex::decode(&event.sig).unwrap()).unwrap();
        let pk = XOnlyPublicKey::from_slice(&hex::decode(&event.pubkey).unwrap()).unwrap();
        Secp256k1::verification_only()
            .verify_schnorr(&sig, &Message::from_digest(digest), &pk)
            .unwrap();
    }

    #[test]
    fn test_event_wire_shape() {
        let keys = keys();
        let event = UnsignedEvent::text_note(&keys, "https://example.com/1", "hi", 42).sign(&keys);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], 1);
        assert_eq!(json["created_at"], 42);
        assert_eq!(json["tags"][0][0], "proxy");
        assert_eq!(json["tags"][0][2], "rss");
    }
}
