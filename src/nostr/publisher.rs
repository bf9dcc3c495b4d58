use super::event::{Event, UnsignedEvent};
use super::keys::Keys;
use super::ws::WsRelay;
use super::RelayTransport;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PublishError {
    #[error("failed to publish: no relay accepted the note ({attempted} tried)")]
    NoRelayAccepted { attempted: usize },
}

/// Turns rendered content into a published note.
#[async_trait]
pub trait NotePublisher: Send + Sync {
    /// Returns how many relays accepted the note, at least one on success.
    async fn publish(&self, link: &str, content: &str) -> Result<usize, PublishError>;
}

/// Signs notes with one identity and offers them to every configured relay
/// in turn.
pub struct RelayPublisher<T = WsRelay> {
    keys: Keys,
    relays: Vec<String>,
    transport: T,
}

impl<T: RelayTransport> RelayPublisher<T> {
    pub fn new(keys: Keys, relays: Vec<String>, transport: T) -> Self {
        Self {
            keys,
            relays,
            transport,
        }
    }

    /// Build and sign the note for one item, timestamped now.
    pub fn build_note(&self, link: &str, content: &str) -> Event {
        let created_at = chrono::Utc::now().timestamp();
        UnsignedEvent::text_note(&self.keys, link, content, created_at).sign(&self.keys)
    }
}

#[async_trait]
impl<T: RelayTransport> NotePublisher for RelayPublisher<T> {
    async fn publish(&self, link: &str, content: &str) -> Result<usize, PublishError> {
        let event = self.build_note(link, content);

        let mut accepted = 0usize;
        for relay in &self.relays {
            match self.transport.send_event(relay, &event).await {
                Ok(()) => {
                    accepted += 1;
                    tracing::debug!(relay = %relay, id = %event.id, "note accepted");
                }
                Err(e) => {
                    tracing::warn!(relay = %relay, id = %event.id, error = %e, "relay publish failed");
                }
            }
        }

        if accepted == 0 {
            return Err(PublishError::NoRelayAccepted {
                attempted: self.relays.len(),
            });
        }

        tracing::info!(id = %event.id, accepted, total = self.relays.len(), "note published");
        Ok(accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nostr::RelayError;
    use std::sync::Mutex;

    const SECRET_HEX: &str = "67dea2ed018072d675f5415ecfaed7d2597555e202d85b3d65ea4e58d2d92ffa";

    /// Accepts only on relays listed in `accepting`; records every attempt.
    struct ScriptedTransport {
        accepting: Vec<&'static str>,
        attempts: Mutex<Vec<(String, Event)>>,
    }

    #[async_trait]
    impl RelayTransport for ScriptedTransport {
        async fn send_event(&self, relay: &str, event: &Event) -> Result<(), RelayError> {
            self.attempts
                .lock()
                .unwrap()
                .push((relay.to_string(), event.clone()));
            if self.accepting.iter().any(|r| *r == relay) {
                Ok(())
            } else {
                Err(RelayError::Closed)
            }
        }
    }

    fn publisher(accepting: Vec<&'static str>) -> RelayPublisher<ScriptedTransport> {
        RelayPublisher::new(
            Keys::parse(SECRET_HEX).unwrap(),
            vec!["wss://a".into(), "wss://b".into(), "wss://c".into()],
            ScriptedTransport {
                accepting,
                attempts: Mutex::new(Vec::new()),
            },
        )
    }

    #[tokio::test]
    async fn test_every_relay_gets_the_same_event() {
        let p = publisher(vec!["wss://a", "wss://b", "wss://c"]);
        assert_eq!(p.publish("https://x/1", "hi").await, Ok(3));

        let attempts = p.transport.attempts.lock().unwrap();
        let relays: Vec<&str> = attempts.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(relays, vec!["wss://a", "wss://b", "wss://c"]);
        assert!(attempts.iter().all(|(_, e)| e.id == attempts[0].1.id));
    }

    #[tokio::test]
    async fn test_one_accepting_relay_is_enough() {
        let p = publisher(vec!["wss://c"]);
        assert_eq!(p.publish("https://x/1", "hi").await, Ok(1));
        // Failures before it did not stop the fan-out
        assert_eq!(p.transport.attempts.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_no_accepting_relay_is_publish_error() {
        let p = publisher(vec![]);
        assert_eq!(
            p.publish("https://x/1", "hi").await,
            Err(PublishError::NoRelayAccepted { attempted: 3 })
        );
    }

    #[test]
    fn test_build_note_content_is_verbatim() {
        let p = publisher(vec![]);
        let content = "Title\nhttps://x/1 #tag";
        let note = p.build_note("https://x/1", content);
        assert_eq!(note.content, content);
        assert_eq!(note.tags.values("t").collect::<Vec<_>>(), vec!["tag"]);
        assert!(note.created_at > 0);
    }
}
