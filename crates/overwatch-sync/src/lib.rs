//! Live entity synchronizer for the Overwatch tactical picture.
//!
//! Owns the authoritative in-memory picture and merges the startup snapshot
//! with the live event stream.
//!
//! # Modules
//!
//! - [`registry`] -- Entities, cones and line segments keyed by uid
//! - [`synchronizer`] -- Upsert, removal and snapshot merge rules
//! - [`change`] -- Change notifications
//! - [`snapshot`] -- Snapshot merge state and sources
//! - [`reconcile`] -- The single-consumer reconciliation loop
//! - [`export`] -- Registry to map-state export
//! - [`error`] -- Error types

pub mod change;
pub mod error;
pub mod export;
pub mod reconcile;
pub mod registry;
pub mod snapshot;
pub mod synchronizer;

pub use change::PictureChange;
pub use error::SyncError;
pub use export::export_map_state;
pub use reconcile::{NoOpCallback, PictureCallback, ReconcileReport, run_reconciliation};
pub use registry::EntityRegistry;
pub use snapshot::{HttpSnapshotSource, SnapshotPhase, SnapshotSource};
pub use synchronizer::{
    DEFAULT_FOV_RANGE_M, DEFAULT_UNIT_TYPE, SPOT_MAP_ICONSET, SyncConfig, Synchronizer,
};

#[cfg(test)]
mod tests {
    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::change::PictureChange::export_all();
        let _ = crate::snapshot::SnapshotPhase::export_all();
    }
}
