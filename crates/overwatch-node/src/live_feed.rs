//! NATS live event feed.
//!
//! Tactical events arrive on `{prefix}.{kind}` where `kind` is one of
//! `point`, `marker`, `eud`, `rb_line` or `casevac`, with the JSON payload
//! shaped as for that kind. Each message is decoded and forwarded to the
//! reconciliation loop over an `mpsc` channel; undecodable messages are
//! logged and dropped.

use futures::StreamExt as _;
use overwatch_types::{LiveEvent, LiveEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::{FeedError, NodeError};

/// NATS connection carrying the live feed.
pub struct LiveFeed {
    client: async_nats::Client,
    prefix: String,
}

impl LiveFeed {
    /// Connect to a NATS server.
    pub async fn connect(url: &str, prefix: impl Into<String>) -> Result<Self, NodeError> {
        info!(url = url, "Connecting to NATS server");
        let client = async_nats::connect(url)
            .await
            .map_err(|e| NodeError::Nats {
                message: format!("failed to connect to {url}: {e}"),
            })?;
        info!("NATS connection established");
        Ok(Self {
            client,
            prefix: prefix.into(),
        })
    }

    /// Subscribe to every subject under the prefix.
    pub async fn subscribe(&self) -> Result<async_nats::Subscriber, NodeError> {
        let subject = format!("{}.>", self.prefix);
        let subscriber = self
            .client
            .subscribe(subject.clone())
            .await
            .map_err(|e| NodeError::Nats {
                message: format!("failed to subscribe to {subject}: {e}"),
            })?;
        info!(subject = subject, "Subscribed to live feed");
        Ok(subscriber)
    }

    /// Subject prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Event kind named by `subject`, if it is `{prefix}.{kind}`.
pub fn subject_kind(prefix: &str, subject: &str) -> Option<LiveEventKind> {
    let suffix = subject.strip_prefix(prefix)?.strip_prefix('.')?;
    LiveEventKind::from_name(suffix)
}

/// Decode one feed message.
pub fn decode_message(prefix: &str, subject: &str, payload: &[u8]) -> Result<LiveEvent, FeedError> {
    let kind = subject_kind(prefix, subject)
        .ok_or_else(|| FeedError::UnknownSubject(subject.to_owned()))?;
    LiveEvent::decode(kind, payload).map_err(|source| FeedError::Decode { kind, source })
}

/// Forward decoded messages into `tx` until either side closes.
///
/// Returns the number of events forwarded.
pub async fn forward(
    mut subscriber: async_nats::Subscriber,
    prefix: String,
    tx: mpsc::Sender<LiveEvent>,
) -> u64 {
    let mut forwarded: u64 = 0;
    while let Some(message) = subscriber.next().await {
        let subject = message.subject.as_str();
        match decode_message(&prefix, subject, &message.payload) {
            Ok(event) => {
                debug!(subject = subject, uid = event.uid().unwrap_or_default(), "Live event");
                if tx.send(event).await.is_err() {
                    debug!("Reconciliation loop gone, stopping feed");
                    break;
                }
                forwarded = forwarded.saturating_add(1);
            }
            Err(e) => warn!(subject = subject, error = %e, "Dropping feed message"),
        }
    }
    info!(forwarded, "Live feed ended");
    forwarded
}
