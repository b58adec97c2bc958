//! Change notifications emitted by the synchronizer.

use overwatch_types::{Entity, EntityUid, FieldOfViewCone, Heading, Position, RangeBearingSegment};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// One observable change to the picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "change", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PictureChange {
    /// An entity was created or its descriptive fields replaced.
    EntityUpserted {
        /// The entity as it now stands.
        entity: Box<Entity>,
    },
    /// An existing entity moved or turned.
    EntityMoved {
        /// Entity uid.
        uid: EntityUid,
        /// New position.
        position: Position,
        /// New facing.
        heading: Heading,
    },
    /// An entity and its derived geometry were removed.
    EntityRemoved {
        /// Entity uid.
        uid: EntityUid,
    },
    /// A field-of-view cone was created or recomputed.
    ConeUpdated {
        /// The cone.
        cone: FieldOfViewCone,
    },
    /// A field-of-view cone was released.
    ConeRemoved {
        /// Uid of the owning entity.
        owner: EntityUid,
    },
    /// A range and bearing segment was created or moved.
    LineUpdated {
        /// The segment.
        line: RangeBearingSegment,
    },
    /// A range and bearing segment was removed.
    LineRemoved {
        /// Segment uid.
        uid: EntityUid,
    },
    /// The startup snapshot was merged.
    SnapshotApplied {
        /// Items merged into the picture.
        applied: usize,
        /// Items skipped because a live event got there first, or because
        /// they were malformed.
        skipped: usize,
    },
}

impl PictureChange {
    /// Uid of the entity the change concerns, if any.
    pub fn uid(&self) -> Option<&EntityUid> {
        match self {
            Self::EntityUpserted { entity } => Some(&entity.uid),
            Self::EntityMoved { uid, .. }
            | Self::EntityRemoved { uid }
            | Self::LineRemoved { uid } => Some(uid),
            Self::ConeUpdated { cone } => Some(&cone.owner),
            Self::ConeRemoved { owner } => Some(owner),
            Self::LineUpdated { line } => Some(&line.uid),
            Self::SnapshotApplied { .. } => None,
        }
    }
}
