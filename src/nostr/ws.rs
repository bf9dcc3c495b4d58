use super::event::Event;
use super::{RelayError, RelayTransport};
use async_trait::async_trait;
use futures_util::{SinkExt, Stream, StreamExt};
use std::time::Duration;
use tokio_tungstenite::tungstenite::{self, Message};

/// Per-step limit for connecting and for waiting on the relay's `OK`.
pub const RELAY_TIMEOUT: Duration = Duration::from_secs(7);

/// Frames a relay sends back that matter for publishing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayMessage {
    Ok {
        event_id: String,
        accepted: bool,
        message: String,
    },
    Notice(String),
    Other(String),
}

impl RelayMessage {
    /// Parse a relay frame. Returns `None` for anything that is not a JSON array
    /// starting with a string label.
    pub fn parse(text: &str) -> Option<Self> {
        let frame: Vec<serde_json::Value> = serde_json::from_str(text).ok()?;
        let label = frame.first()?.as_str()?;
        let msg = match label {
            "OK" => RelayMessage::Ok {
                event_id: frame.get(1)?.as_str()?.to_string(),
                accepted: frame.get(2)?.as_bool()?,
                message: frame
                    .get(3)
                    .and_then(|m| m.as_str())
                    .unwrap_or_default()
                    .to_string(),
            },
            "NOTICE" => RelayMessage::Notice(
                frame
                    .get(1)
                    .and_then(|m| m.as_str())
                    .unwrap_or_default()
                    .to_string(),
            ),
            other => RelayMessage::Other(other.to_string()),
        };
        Some(msg)
    }
}

/// Read frames until the relay answers for `event_id`.
pub async fn wait_for_ok<S>(stream: &mut S, event_id: &str) -> Result<(), RelayError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    while let Some(msg) = stream.next().await {
        let text = match msg.map_err(RelayError::Read)? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        match RelayMessage::parse(&text) {
            Some(RelayMessage::Ok {
                event_id: id,
                accepted,
                message,
            }) if id == event_id => {
                return if accepted {
                    Ok(())
                } else {
                    Err(RelayError::Rejected(message))
                };
            }
            Some(RelayMessage::Notice(notice)) => {
                tracing::debug!(notice = %notice, "relay notice");
            }
            _ => {
                tracing::trace!(frame = %text, "ignoring relay frame");
            }
        }
    }
    Err(RelayError::Closed)
}

/// WebSocket transport: one connection per relay per note.
pub struct WsRelay {
    timeout: Duration,
}

impl WsRelay {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for WsRelay {
    fn default() -> Self {
        Self::new(RELAY_TIMEOUT)
    }
}

#[async_trait]
impl RelayTransport for WsRelay {
    async fn send_event(&self, relay: &str, event: &Event) -> Result<(), RelayError> {
        let (mut ws, _) = tokio::time::timeout(self.timeout, tokio_tungstenite::connect_async(relay))
            .await
            .map_err(|_| RelayError::Timeout(self.timeout))?
            .map_err(RelayError::Connect)?;
        tracing::debug!(relay, "relay connected");

        let frame = serde_json::json!(["EVENT", event]).to_string();
        let result = match ws.send(Message::Text(frame)).await {
            Ok(()) => tokio::time::timeout(self.timeout, wait_for_ok(&mut ws, &event.id))
                .await
                .unwrap_or(Err(RelayError::Timeout(self.timeout))),
            Err(e) => Err(RelayError::Send(e)),
        };

        if let Err(e) = ws.close(None).await {
            tracing::trace!(relay, error = %e, "relay close failed");
        }
        result
    }
}
