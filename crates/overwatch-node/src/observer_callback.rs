//! Picture callback that updates the Observer API state.
//!
//! After each update, this callback broadcasts the changes to connected
//! WebSocket clients and republishes the picture the REST endpoints serve.

use std::sync::Arc;

use overwatch_observer::{AppState, PictureView};
use overwatch_sync::{EntityRegistry, PictureCallback, PictureChange};
use tracing::debug;

/// Callback that bridges the reconciliation loop to the Observer API.
pub struct ObserverCallback {
    state: Arc<AppState>,
    snapshot_merged: bool,
    updates: u64,
}

impl ObserverCallback {
    /// Create a new observer callback backed by the given app state.
    pub const fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            snapshot_merged: false,
            updates: 0,
        }
    }
}

impl PictureCallback for ObserverCallback {
    fn on_changes(&mut self, changes: &[PictureChange], registry: &EntityRegistry) {
        self.updates = self.updates.saturating_add(1);
        if changes
            .iter()
            .any(|c| matches!(c, PictureChange::SnapshotApplied { .. }))
        {
            self.snapshot_merged = true;
        }

        let receivers = self.state.broadcast(changes);
        debug!(changes = changes.len(), receivers, "Picture changes broadcast");

        self.state.publish(PictureView {
            registry: registry.clone(),
            snapshot_merged: self.snapshot_merged,
            updates: self.updates,
        });
    }
}
