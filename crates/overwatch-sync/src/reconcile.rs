//! The reconciliation loop.
//!
//! A single consumer drains the live event channel and, concurrently, waits
//! for the startup snapshot. Each event runs to completion before the next
//! is taken, so the registry needs no locking. Errors never leave the loop.

use overwatch_types::LiveEvent;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::change::PictureChange;
use crate::registry::EntityRegistry;
use crate::snapshot::{SnapshotPhase, SnapshotSource};
use crate::synchronizer::Synchronizer;

/// Callback invoked after every update that changed the picture.
///
/// Implementations can use this to publish the picture, broadcast changes
/// to dashboards, etc.
pub trait PictureCallback: Send {
    /// Called with the changes of one update and the registry after it.
    fn on_changes(&mut self, changes: &[PictureChange], registry: &EntityRegistry);
}

/// A no-op picture callback for testing.
pub struct NoOpCallback;

impl PictureCallback for NoOpCallback {
    fn on_changes(&mut self, _changes: &[PictureChange], _registry: &EntityRegistry) {}
}

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Live events taken off the channel.
    pub events_received: u64,
    /// Live events applied without error.
    pub events_applied: u64,
    /// Live events dropped as malformed or unusable.
    pub events_dropped: u64,
    /// Snapshot state at exit.
    pub snapshot_phase: SnapshotPhase,
}

/// Run the reconciliation loop until the event channel closes.
///
/// The snapshot fetch is started immediately and raced against incoming
/// events; neither blocks the other. A failed fetch is logged and the loop
/// carries on with live events only. Closing the sender side is how a
/// subscriber unsubscribes; a fetch still in flight at that point is
/// dropped.
pub async fn run_reconciliation(
    sync: &mut Synchronizer,
    snapshot_source: &SnapshotSource,
    mut events: mpsc::Receiver<LiveEvent>,
    callback: &mut dyn PictureCallback,
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    let snapshot = snapshot_source.fetch();
    tokio::pin!(snapshot);
    let mut snapshot_done = false;

    info!(source = snapshot_source.name(), "Reconciliation starting");

    loop {
        tokio::select! {
            biased;

            result = &mut snapshot, if !snapshot_done => {
                snapshot_done = true;
                match result {
                    Ok(snapshot) => match sync.apply_snapshot(&snapshot) {
                        Ok(changes) => notify(callback, &changes, sync),
                        Err(e) => warn!(error = %e, "Snapshot not merged"),
                    },
                    Err(e) => {
                        error!(
                            source = snapshot_source.name(),
                            error = %e,
                            "Snapshot fetch failed, continuing with live events only"
                        );
                        sync.mark_snapshot_failed();
                    }
                }
            }

            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                report.events_received = report.events_received.saturating_add(1);
                let kind = event.kind();
                match sync.apply_live(&event) {
                    Ok(changes) => {
                        report.events_applied = report.events_applied.saturating_add(1);
                        notify(callback, &changes, sync);
                    }
                    Err(e) => {
                        report.events_dropped = report.events_dropped.saturating_add(1);
                        warn!(
                            kind = %kind,
                            uid = event.uid().unwrap_or_default(),
                            error = %e,
                            "Live event dropped"
                        );
                    }
                }
            }
        }
    }

    report.snapshot_phase = sync.phase();
    info!(
        received = report.events_received,
        applied = report.events_applied,
        dropped = report.events_dropped,
        snapshot = ?report.snapshot_phase,
        entities = sync.registry().len(),
        "Reconciliation ended"
    );
    report
}

fn notify(callback: &mut dyn PictureCallback, changes: &[PictureChange], sync: &Synchronizer) {
    if !changes.is_empty() {
        callback.on_changes(changes, sync.registry());
    }
}
