//! Error types for the `overwatch-sync` crate.
//!
//! None of these are fatal. The reconciliation loop logs each one and moves
//! on to the next event.

use overwatch_types::{EntityUid, LiveEventKind};

/// Errors raised while applying snapshots and live events.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The payload carries no uid.
    #[error("{0} event has no uid")]
    MissingUid(LiveEventKind),

    /// The payload needs a point and has none.
    #[error("{kind} event for {uid} has no point")]
    MissingPoint {
        /// Event kind.
        kind: LiveEventKind,
        /// Entity uid.
        uid: EntityUid,
    },

    /// The payload's position is the "unset" sentinel or otherwise invalid.
    #[error("{kind} event for {uid} has an unset position")]
    UnsetPosition {
        /// Event kind.
        kind: LiveEventKind,
        /// Entity uid.
        uid: EntityUid,
    },

    /// A range and bearing line has neither a far end nor a range and
    /// bearing to derive one from.
    #[error("range and bearing line {0} has no usable far end")]
    MissingEndpoint(EntityUid),

    /// A snapshot arrived after one was already merged.
    #[error("map-state snapshot already applied")]
    SnapshotAlreadyApplied,

    /// The snapshot request failed.
    #[error("snapshot request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The snapshot endpoint answered with a non-success status.
    #[error("snapshot endpoint returned {0}")]
    SnapshotStatus(reqwest::StatusCode),
}
