//! Registry to wire-format export.
//!
//! Produces the same shape the snapshot endpoint serves, so one node's
//! picture can bootstrap another.

use overwatch_geo::haversine_m;
use overwatch_types::{
    CasevacPayload, Entity, EntityKind, EudPayload, LinkStatus, MapStateSnapshot, MarkerPayload,
    PointPayload, RbLinePayload,
};

use crate::registry::EntityRegistry;
use crate::synchronizer::SPOT_MAP_ICONSET;

/// Export the picture as a map-state snapshot.
///
/// Field-of-view entities are derived state and are not exported.
pub fn export_map_state(registry: &EntityRegistry) -> MapStateSnapshot {
    let mut snapshot = MapStateSnapshot::default();
    for entity in registry.entities() {
        match entity.kind {
            EntityKind::UnitTrack => snapshot.euds.push(eud(entity)),
            EntityKind::StaticMarker | EntityKind::SpotMarker => {
                snapshot.markers.push(marker(entity));
            }
            EntityKind::RangeBearingLine => snapshot.rb_lines.push(line(entity, registry)),
            EntityKind::CasevacRequest => snapshot.casevacs.push(casevac(entity)),
            EntityKind::FieldOfView => {}
        }
    }
    snapshot
}

/// `#RRGGBB` back to the server's opaque `AARRGGBB`.
fn wire_color(color: Option<&String>) -> Option<String> {
    color.map(|c| match c.strip_prefix('#') {
        Some(rgb) if rgb.len() == 6 => format!("ff{rgb}"),
        _ => c.clone(),
    })
}

fn point(entity: &Entity) -> Option<PointPayload> {
    let position = entity.position?;
    Some(PointPayload {
        uid: Some(entity.uid.to_string()),
        latitude: Some(position.lat),
        longitude: Some(position.lon),
        hae: position.alt,
        azimuth: entity.heading.azimuth,
        course: entity.heading.course,
        device_uid: None,
        fov: entity.fov_deg,
        cot_type: entity.style.cot_type.clone(),
    })
}

fn eud(entity: &Entity) -> EudPayload {
    let status = match entity.status {
        LinkStatus::Connected => "Connected",
        LinkStatus::Disconnected => "Disconnected",
    };
    EudPayload {
        uid: Some(entity.uid.to_string()),
        callsign: Some(entity.callsign.clone()),
        team_color: wire_color(entity.style.color_hex.as_ref()),
        last_status: Some(status.to_owned()),
        last_point: point(entity),
        cot_type: entity.style.cot_type.clone(),
    }
}

fn marker(entity: &Entity) -> MarkerPayload {
    MarkerPayload {
        uid: Some(entity.uid.to_string()),
        point: point(entity),
        callsign: Some(entity.callsign.clone()),
        color_hex: wire_color(entity.style.color_hex.as_ref()),
        classification_code: entity.style.classification.clone(),
        icon: entity.style.icon.clone(),
        iconset_path: (entity.kind == EntityKind::SpotMarker).then(|| SPOT_MAP_ICONSET.to_owned()),
        battle_dimension: None,
    }
}

fn line(entity: &Entity, registry: &EntityRegistry) -> RbLinePayload {
    let segment = registry.line(&entity.uid);
    RbLinePayload {
        uid: Some(entity.uid.to_string()),
        point: point(entity),
        end_latitude: segment.map(|s| s.end.lat),
        end_longitude: segment.map(|s| s.end.lon),
        range: segment.map(|s| haversine_m(s.start, s.end)),
        bearing: entity.heading.azimuth,
        color_hex: wire_color(entity.style.color_hex.as_ref()),
        stroke_weight: entity.style.stroke_weight,
        callsign: Some(entity.callsign.clone()),
    }
}

fn casevac(entity: &Entity) -> CasevacPayload {
    CasevacPayload {
        uid: Some(entity.uid.to_string()),
        title: Some(entity.callsign.clone()),
        point: point(entity),
        icon: entity.style.icon.clone(),
    }
}
