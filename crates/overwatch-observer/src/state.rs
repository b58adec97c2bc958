//! Shared application state for the Observer API server.
//!
//! [`AppState`] holds the broadcast channel for picture changes and a
//! published copy of the picture that the REST endpoints serve. The
//! reconciliation loop owns the live registry; the observer only ever sees
//! the last copy it was handed. Publishing replaces that copy in a `watch`
//! channel, so it never waits on a reader and is never skipped.

use std::sync::Arc;

use overwatch_dispatch::CotGateway;
use overwatch_sync::{EntityRegistry, PictureChange};
use tokio::sync::{broadcast, watch};

/// Capacity of the broadcast channel for picture changes.
///
/// A subscriber more than this many messages behind receives
/// [`broadcast::error::RecvError::Lagged`] and resumes from the oldest
/// change still buffered.
pub const BROADCAST_CAPACITY: usize = 256;

/// The published picture served by the REST endpoints.
#[derive(Debug, Clone, Default)]
pub struct PictureView {
    /// Copy of the registry as of the last publish.
    pub registry: EntityRegistry,
    /// Whether the startup snapshot has been merged.
    pub snapshot_merged: bool,
    /// Number of updates published so far.
    pub updates: u64,
}

/// Shared state for the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// Broadcast sender for picture changes.
    pub tx: broadcast::Sender<PictureChange>,
    /// The published picture.
    pub picture: Arc<watch::Sender<Arc<PictureView>>>,
    /// CoT transmission gateway, when an endpoint is configured.
    pub gateway: Option<Arc<CotGateway>>,
}

impl AppState {
    /// Create a new application state with an empty picture.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            tx,
            picture: Arc::new(watch::Sender::new(Arc::new(PictureView::default()))),
            gateway: None,
        }
    }

    /// Create a new application state that can transmit CoT.
    pub fn with_gateway(gateway: Arc<CotGateway>) -> Self {
        Self {
            gateway: Some(gateway),
            ..Self::new()
        }
    }

    /// The last published picture.
    pub fn picture(&self) -> Arc<PictureView> {
        Arc::clone(&self.picture.borrow())
    }

    /// Replace the published picture.
    pub fn publish(&self, view: PictureView) {
        self.picture.send_replace(Arc::new(view));
    }

    /// Subscribe to the picture change channel.
    pub fn subscribe(&self) -> broadcast::Receiver<PictureChange> {
        self.tx.subscribe()
    }

    /// Publish changes to all connected clients.
    ///
    /// Returns the number of receivers reached by the last change; 0 when
    /// nobody is listening.
    pub fn broadcast(&self, changes: &[PictureChange]) -> usize {
        // send fails only when there are zero receivers.
        changes
            .iter()
            .fold(0, |_, change| self.tx.send(change.clone()).unwrap_or(0))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
