//! Shared type definitions for the Overwatch tactical picture.
//!
//! Every crate in the workspace speaks in these types. Picture and wire types
//! are exported to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- String newtypes for entity and sensor identifiers
//! - [`enums`] -- Entity kind, link status and affiliation
//! - [`structs`] -- Registry records and derived geometry
//! - [`wire`] -- Live event payloads and the map-state snapshot
//! - [`rf`] -- RF detections and sensor descriptors
//! - [`cot`] -- The canonical CoT event record

pub mod cot;
pub mod enums;
pub mod ids;
pub mod rf;
pub mod structs;
pub mod wire;

// Re-export all public types at crate root for convenience.
pub use cot::{CotContact, CotDetail, CotEvent, CotLink, CotPoint, RfSignalDetail, SensorDetail};
pub use enums::{Affiliation, EntityKind, LinkStatus};
pub use ids::{EntityUid, SensorId};
pub use rf::{FrequencyRange, RfDetection, RfMetadata, SensorDescriptor};
pub use structs::{
    Entity, FieldOfViewCone, Heading, IconRef, LatLon, Position, RangeBearingSegment, Style,
    normalize_color_hex,
};
pub use wire::{
    CasevacPayload, EudPayload, LiveEvent, LiveEventKind, MapStateSnapshot, MarkerPayload,
    PointPayload, RbLinePayload,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files land in `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::EntityUid::export_all();
        let _ = crate::ids::SensorId::export_all();

        // Enums
        let _ = crate::enums::EntityKind::export_all();
        let _ = crate::enums::LinkStatus::export_all();
        let _ = crate::enums::Affiliation::export_all();

        // Picture
        let _ = crate::structs::Entity::export_all();
        let _ = crate::structs::FieldOfViewCone::export_all();
        let _ = crate::structs::RangeBearingSegment::export_all();

        // Wire
        let _ = crate::wire::LiveEvent::export_all();
        let _ = crate::wire::LiveEventKind::export_all();
        let _ = crate::wire::MapStateSnapshot::export_all();

        // RF and CoT
        let _ = crate::rf::RfDetection::export_all();
        let _ = crate::rf::SensorDescriptor::export_all();
        let _ = crate::cot::CotEvent::export_all();
    }
}
