pub mod event;
pub mod keys;
pub mod publisher;
pub mod ws;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

pub use event::{hashtags, Event, Tags, UnsignedEvent, KIND_TEXT_NOTE};
pub use keys::{KeyError, Keys};
pub use publisher::{NotePublisher, PublishError, RelayPublisher};
pub use ws::WsRelay;

/// Failure talking to a single relay. Never fatal for the note as a whole.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("connect failed: {0}")]
    Connect(#[source] tungstenite::Error),

    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    #[error("read failed: {0}")]
    Read(#[source] tungstenite::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("connection closed before the relay answered")]
    Closed,

    #[error("rejected by relay: {0}")]
    Rejected(String),
}

/// Delivers a signed event to one relay and waits for it to be accepted.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send_event(&self, relay: &str, event: &Event) -> Result<(), RelayError>;
}
