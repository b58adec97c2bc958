//! Upsert and removal rules for the live picture.
//!
//! Every operation is a transform on the registry that returns the list of
//! [`PictureChange`]s it caused. Storage and notification are separate: the
//! caller decides who hears about the changes.
//!
//! # Snapshot merge
//!
//! The startup snapshot and the live stream race. Until the snapshot is
//! merged, every uid a live event creates, updates or removes is recorded,
//! and the snapshot skips those uids. Events are applied strictly in arrival
//! order, so whichever write arrives last wins, except that a snapshot never
//! overwrites a live write that beat it.

use std::collections::BTreeSet;

use overwatch_geo::{DistanceUnit, destination, fov_cone};
use overwatch_types::{
    Affiliation, CasevacPayload, Entity, EntityKind, EntityUid, EudPayload, FieldOfViewCone,
    Heading, LatLon, LinkStatus, LiveEvent, LiveEventKind, MapStateSnapshot, MarkerPayload,
    PointPayload, Position, RangeBearingSegment, RbLinePayload, normalize_color_hex,
};
use tracing::{debug, info, warn};

use crate::change::PictureChange;
use crate::error::SyncError;
use crate::registry::EntityRegistry;
use crate::snapshot::SnapshotPhase;

/// Iconset path fragment that marks a spot-map marker.
pub const SPOT_MAP_ICONSET: &str = "COT_MAPPING_SPOTMAP";

/// CoT type assumed for a unit that has never reported one.
pub const DEFAULT_UNIT_TYPE: &str = "a-f-G-U-C";

/// Default length of a field-of-view cone edge in metres.
pub const DEFAULT_FOV_RANGE_M: f64 = 100.0;

/// Tunables for the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncConfig {
    /// Length of a field-of-view cone edge in metres.
    pub fov_range_m: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            fov_range_m: DEFAULT_FOV_RANGE_M,
        }
    }
}

/// Where an update came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Live,
    Snapshot,
}

/// Running totals for a snapshot merge.
#[derive(Debug, Default)]
struct Tally {
    applied: usize,
    skipped: usize,
}

/// Sole owner of the [`EntityRegistry`].
#[derive(Debug)]
pub struct Synchronizer {
    registry: EntityRegistry,
    config: SyncConfig,
    phase: SnapshotPhase,
    touched: BTreeSet<EntityUid>,
    sequence: u64,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl Synchronizer {
    /// Create a synchronizer with an empty picture and a pending snapshot.
    pub const fn new(config: SyncConfig) -> Self {
        Self {
            registry: EntityRegistry::new(),
            config,
            phase: SnapshotPhase::Pending,
            touched: BTreeSet::new(),
            sequence: 0,
        }
    }

    /// Read-only view of the picture.
    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Current snapshot merge state.
    pub const fn phase(&self) -> SnapshotPhase {
        self.phase
    }

    /// Active configuration.
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Number of updates applied so far.
    pub const fn sequence(&self) -> u64 {
        self.sequence
    }

    // -----------------------------------------------------------------------
    // Snapshot
    // -----------------------------------------------------------------------

    /// Merge the startup snapshot.
    ///
    /// Items whose uid was already written by a live event are skipped, as
    /// are malformed items. A second snapshot after a successful merge is
    /// refused.
    pub fn apply_snapshot(
        &mut self,
        snapshot: &MapStateSnapshot,
    ) -> Result<Vec<PictureChange>, SyncError> {
        if self.phase == SnapshotPhase::Applied {
            return Err(SyncError::SnapshotAlreadyApplied);
        }

        let mut changes = Vec::new();
        let mut tally = Tally::default();

        for eud in &snapshot.euds {
            self.merge(eud.uid.as_deref(), LiveEventKind::Eud, &mut tally, &mut changes, |s| {
                s.upsert_eud(eud, Origin::Snapshot)
            });
        }
        for marker in &snapshot.markers {
            self.merge(marker.uid.as_deref(), LiveEventKind::Marker, &mut tally, &mut changes, |s| {
                s.upsert_marker(marker, Origin::Snapshot)
            });
        }
        for line in &snapshot.rb_lines {
            self.merge(line.uid.as_deref(), LiveEventKind::RbLine, &mut tally, &mut changes, |s| {
                s.upsert_line(line, Origin::Snapshot)
            });
        }
        for casevac in &snapshot.casevacs {
            self.merge(casevac.uid.as_deref(), LiveEventKind::Casevac, &mut tally, &mut changes, |s| {
                s.upsert_casevac(casevac, Origin::Snapshot)
            });
        }

        self.phase = SnapshotPhase::Applied;
        self.touched.clear();

        info!(
            applied = tally.applied,
            skipped = tally.skipped,
            "Map-state snapshot merged"
        );
        changes.push(PictureChange::SnapshotApplied {
            applied: tally.applied,
            skipped: tally.skipped,
        });
        Ok(changes)
    }

    /// Record that the snapshot could not be fetched.
    ///
    /// Live processing carries on with whatever picture exists. Live writes
    /// are still recorded so a later snapshot cannot clobber them.
    pub fn mark_snapshot_failed(&mut self) {
        if self.phase == SnapshotPhase::Pending {
            self.phase = SnapshotPhase::Failed;
        }
    }

    fn merge<F>(
        &mut self,
        uid: Option<&str>,
        kind: LiveEventKind,
        tally: &mut Tally,
        changes: &mut Vec<PictureChange>,
        apply: F,
    ) where
        F: FnOnce(&mut Self) -> Result<Vec<PictureChange>, SyncError>,
    {
        if let Some(uid) = uid
            && self.touched.contains(&EntityUid::from(uid))
        {
            debug!(uid, kind = %kind, "Snapshot item superseded by live event");
            tally.skipped = tally.skipped.saturating_add(1);
            return;
        }
        match apply(self) {
            Ok(mut applied) => {
                tally.applied = tally.applied.saturating_add(1);
                changes.append(&mut applied);
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "Dropping malformed snapshot item");
                tally.skipped = tally.skipped.saturating_add(1);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Live events
    // -----------------------------------------------------------------------

    /// Apply one live event, dispatching on its kind.
    pub fn apply_live(&mut self, event: &LiveEvent) -> Result<Vec<PictureChange>, SyncError> {
        match event {
            LiveEvent::Point(point) => self.apply_point_update(point),
            LiveEvent::Marker(marker) => self.apply_marker(marker),
            LiveEvent::Eud(eud) => self.apply_entity_upsert(eud),
            LiveEvent::RbLine(line) => self.apply_range_bearing_line(line),
            LiveEvent::Casevac(casevac) => self.apply_casevac(casevac),
        }
    }

    /// Move or turn an existing entity.
    ///
    /// Points for unknown uids are ignored; points never create entities.
    /// An unset position (longitude above 180, or any other invalid
    /// coordinate) is refused and the entity keeps its last valid position
    /// and heading.
    pub fn apply_point_update(
        &mut self,
        point: &PointPayload,
    ) -> Result<Vec<PictureChange>, SyncError> {
        let uid = require_uid(point.uid.as_deref(), LiveEventKind::Point)?;
        if !self.registry.contains(&uid) {
            debug!(uid = %uid, "Point for unknown entity ignored");
            return Ok(Vec::new());
        }
        let position = point_position(point).ok_or_else(|| SyncError::UnsetPosition {
            kind: LiveEventKind::Point,
            uid: uid.clone(),
        })?;

        let revision = self.next_revision();
        let heading = point_heading(point);
        if let Some(entity) = self.registry.entity_mut(&uid) {
            entity.position = Some(position);
            entity.heading = heading;
            if point.fov.is_some() {
                entity.fov_deg = point.fov;
            }
            entity.revision = revision;
        }
        self.touch(&uid, Origin::Live);

        let mut changes = vec![PictureChange::EntityMoved {
            uid: uid.clone(),
            position,
            heading,
        }];
        self.refresh_cone(&uid, &mut changes);
        Ok(changes)
    }

    /// Create or fully update a unit track.
    ///
    /// A connected unit gets its field-of-view cone (re)computed; a
    /// disconnected one loses any cone it had.
    pub fn apply_entity_upsert(
        &mut self,
        eud: &EudPayload,
    ) -> Result<Vec<PictureChange>, SyncError> {
        self.upsert_eud(eud, Origin::Live)
    }

    /// Create or update a marker (static or spot-map).
    pub fn apply_marker(&mut self, marker: &MarkerPayload) -> Result<Vec<PictureChange>, SyncError> {
        self.upsert_marker(marker, Origin::Live)
    }

    /// Create or update a range and bearing line and its segment.
    pub fn apply_range_bearing_line(
        &mut self,
        line: &RbLinePayload,
    ) -> Result<Vec<PictureChange>, SyncError> {
        self.upsert_line(line, Origin::Live)
    }

    /// Create or update a casevac request.
    pub fn apply_casevac(
        &mut self,
        casevac: &CasevacPayload,
    ) -> Result<Vec<PictureChange>, SyncError> {
        self.upsert_casevac(casevac, Origin::Live)
    }

    /// Delete an entity and any cone or line derived from it.
    pub fn remove(&mut self, uid: &EntityUid) -> Result<Vec<PictureChange>, SyncError> {
        let mut changes = Vec::new();
        if self.registry.remove_cone(uid).is_some() {
            changes.push(PictureChange::ConeRemoved { owner: uid.clone() });
        }
        if self.registry.remove_line(uid).is_some() {
            changes.push(PictureChange::LineRemoved { uid: uid.clone() });
        }
        if self.registry.remove_entity(uid).is_some() {
            changes.push(PictureChange::EntityRemoved { uid: uid.clone() });
        }
        self.touch(uid, Origin::Live);
        Ok(changes)
    }

    // -----------------------------------------------------------------------
    // Per-kind upserts
    // -----------------------------------------------------------------------

    fn upsert_eud(
        &mut self,
        eud: &EudPayload,
        origin: Origin,
    ) -> Result<Vec<PictureChange>, SyncError> {
        let uid = require_uid(eud.uid.as_deref(), LiveEventKind::Eud)?;
        let point = eud.last_point.as_ref();

        let mut entity = self.existing_or_new(&uid, EntityKind::UnitTrack);
        entity.kind = EntityKind::UnitTrack;
        if let Some(callsign) = &eud.callsign {
            entity.callsign.clone_from(callsign);
        }
        entity.status = LinkStatus::from_wire(eud.last_status.as_deref());
        entity.style.color_hex = wire_color(eud.team_color.as_deref());

        let cot_type = point
            .and_then(|p| p.cot_type.clone())
            .or_else(|| eud.cot_type.clone())
            .unwrap_or_else(|| DEFAULT_UNIT_TYPE.to_owned());
        entity.style.affiliation = Affiliation::from_cot_type(&cot_type);
        entity.style.cot_type = Some(cot_type);

        if let Some(point) = point {
            if let Some(position) = point_position(point) {
                entity.position = Some(position);
                entity.heading = point_heading(point);
            }
            if point.fov.is_some() {
                entity.fov_deg = point.fov;
            }
        }

        let mut changes = self.commit(entity, origin);
        self.refresh_cone(&uid, &mut changes);
        Ok(changes)
    }

    fn upsert_marker(
        &mut self,
        marker: &MarkerPayload,
        origin: Origin,
    ) -> Result<Vec<PictureChange>, SyncError> {
        let uid = require_uid(marker.uid.as_deref(), LiveEventKind::Marker)?;
        let point = require_point(marker.point.as_ref(), LiveEventKind::Marker, &uid)?;

        let kind = if marker
            .iconset_path
            .as_deref()
            .is_some_and(|p| p.contains(SPOT_MAP_ICONSET))
        {
            EntityKind::SpotMarker
        } else {
            EntityKind::StaticMarker
        };

        let mut entity = self.existing_or_new(&uid, kind);
        entity.kind = kind;
        entity.callsign = marker.callsign.clone().unwrap_or_default();
        entity.style.color_hex = wire_color(marker.color_hex.as_deref());
        entity.style.classification = marker
            .classification_code
            .clone()
            .filter(|c| !c.is_empty());
        entity.style.icon = marker.icon.clone();
        entity.style.cot_type.clone_from(&point.cot_type);
        entity.style.affiliation = match (&entity.style.classification, &entity.style.cot_type) {
            (Some(code), _) => Affiliation::from_symbol_code(code),
            (None, Some(cot_type)) => Affiliation::from_cot_type(cot_type),
            (None, None) => Affiliation::Unknown,
        };
        if let Some(position) = point_position(point) {
            entity.position = Some(position);
            entity.heading = point_heading(point);
        }

        Ok(self.commit(entity, origin))
    }

    fn upsert_line(
        &mut self,
        line: &RbLinePayload,
        origin: Origin,
    ) -> Result<Vec<PictureChange>, SyncError> {
        let uid = require_uid(line.uid.as_deref(), LiveEventKind::RbLine)?;
        let point = require_point(line.point.as_ref(), LiveEventKind::RbLine, &uid)?;
        let start = point_position(point).ok_or_else(|| SyncError::UnsetPosition {
            kind: LiveEventKind::RbLine,
            uid: uid.clone(),
        })?;
        let end = line_end(start.lat_lon(), line)
            .ok_or_else(|| SyncError::MissingEndpoint(uid.clone()))?;

        let mut entity = self.existing_or_new(&uid, EntityKind::RangeBearingLine);
        entity.kind = EntityKind::RangeBearingLine;
        entity.callsign = line.callsign.clone().unwrap_or_default();
        entity.position = Some(start);
        entity.heading = Heading {
            azimuth: line.bearing,
            course: None,
        };
        entity.style.color_hex = wire_color(line.color_hex.as_deref());
        entity.style.stroke_weight = line.stroke_weight;

        let segment = RangeBearingSegment {
            uid: uid.clone(),
            start: start.lat_lon(),
            end,
            color_hex: entity.style.color_hex.clone(),
            stroke_weight: line.stroke_weight,
        };

        let mut changes = self.commit(entity, origin);
        self.registry.set_line(segment.clone());
        changes.push(PictureChange::LineUpdated { line: segment });
        Ok(changes)
    }

    fn upsert_casevac(
        &mut self,
        casevac: &CasevacPayload,
        origin: Origin,
    ) -> Result<Vec<PictureChange>, SyncError> {
        let uid = require_uid(casevac.uid.as_deref(), LiveEventKind::Casevac)?;
        let point = require_point(casevac.point.as_ref(), LiveEventKind::Casevac, &uid)?;

        let mut entity = self.existing_or_new(&uid, EntityKind::CasevacRequest);
        entity.kind = EntityKind::CasevacRequest;
        entity.callsign = casevac.title.clone().unwrap_or_default();
        entity.style.icon = casevac.icon.clone();
        if let Some(position) = point_position(point) {
            entity.position = Some(position);
        }

        Ok(self.commit(entity, origin))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn existing_or_new(&self, uid: &EntityUid, kind: EntityKind) -> Entity {
        self.registry
            .get(uid)
            .cloned()
            .unwrap_or_else(|| Entity::new(uid.clone(), kind))
    }

    const fn next_revision(&mut self) -> u64 {
        self.sequence = self.sequence.saturating_add(1);
        self.sequence
    }

    fn touch(&mut self, uid: &EntityUid, origin: Origin) {
        if origin == Origin::Live && self.phase != SnapshotPhase::Applied {
            self.touched.insert(uid.clone());
        }
    }

    fn commit(&mut self, mut entity: Entity, origin: Origin) -> Vec<PictureChange> {
        entity.revision = self.next_revision();
        self.touch(&entity.uid, origin);
        let change = PictureChange::EntityUpserted {
            entity: Box::new(entity.clone()),
        };
        self.registry.insert_entity(entity);
        vec![change]
    }

    /// Bring an entity's cone in line with its current state.
    fn refresh_cone(&mut self, uid: &EntityUid, changes: &mut Vec<PictureChange>) {
        let Some(entity) = self.registry.get(uid) else {
            return;
        };
        if entity.kind != EntityKind::UnitTrack {
            return;
        }
        if !entity.status.is_connected() {
            if self.release_cone(uid, changes) {
                debug!(uid = %uid, "Field of view released on disconnect");
            }
            return;
        }
        let (Some(position), Some(facing), Some(fov)) = (
            entity.position.filter(Position::is_known),
            entity.heading.facing(),
            entity.fov_deg,
        ) else {
            if self.release_cone(uid, changes) {
                debug!(uid = %uid, "Field of view released, facing or angle unknown");
            }
            return;
        };

        let range_m = self.config.fov_range_m;
        match fov_cone(position.lat_lon(), facing, fov, range_m) {
            Ok(vertices) => {
                let cone = FieldOfViewCone {
                    owner: uid.clone(),
                    vertices,
                    azimuth_deg: facing,
                    fov_deg: fov,
                    range_m,
                };
                if self.registry.cone(uid) != Some(&cone) {
                    self.registry.set_cone(cone.clone());
                    changes.push(PictureChange::ConeUpdated { cone });
                }
            }
            Err(e) => {
                debug!(uid = %uid, error = %e, "Field of view not computable");
                self.release_cone(uid, changes);
            }
        }
    }

    /// Drop the uid's cone, if any, and report it.
    fn release_cone(&mut self, uid: &EntityUid, changes: &mut Vec<PictureChange>) -> bool {
        let removed = self.registry.remove_cone(uid).is_some();
        if removed {
            changes.push(PictureChange::ConeRemoved { owner: uid.clone() });
        }
        removed
    }
}

fn require_uid(uid: Option<&str>, kind: LiveEventKind) -> Result<EntityUid, SyncError> {
    uid.map(str::trim)
        .filter(|u| !u.is_empty())
        .map(EntityUid::from)
        .ok_or(SyncError::MissingUid(kind))
}

fn require_point<'a>(
    point: Option<&'a PointPayload>,
    kind: LiveEventKind,
    uid: &EntityUid,
) -> Result<&'a PointPayload, SyncError> {
    point.ok_or_else(|| SyncError::MissingPoint {
        kind,
        uid: uid.clone(),
    })
}

/// The point's position, if it is a real coordinate.
fn point_position(point: &PointPayload) -> Option<Position> {
    let position = Position {
        lat: point.latitude?,
        lon: point.longitude?,
        alt: point.hae,
    };
    position.is_known().then_some(position)
}

const fn point_heading(point: &PointPayload) -> Heading {
    Heading {
        azimuth: point.azimuth,
        course: point.course,
    }
}

/// Far end of a line: explicit coordinates if valid, else projected from
/// range and bearing.
fn line_end(start: LatLon, line: &RbLinePayload) -> Option<LatLon> {
    if let (Some(lat), Some(lon)) = (line.end_latitude, line.end_longitude) {
        let end = LatLon::new(lat, lon);
        if end.is_known() {
            return Some(end);
        }
    }
    let (Some(range), Some(bearing)) = (line.range, line.bearing) else {
        return None;
    };
    (range.is_finite() && range >= 0.0 && bearing.is_finite())
        .then(|| destination(start, bearing, range, DistanceUnit::Meters))
}

/// Hex colours are normalised to `#RRGGBB`; named team colours pass through.
fn wire_color(raw: Option<&str>) -> Option<String> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    let digits = raw.trim_start_matches('#');
    let digits = digits.strip_prefix("0x").unwrap_or(digits);
    let is_hex = matches!(digits.len(), 6 | 8) && digits.chars().all(|c| c.is_ascii_hexdigit());
    Some(if is_hex {
        normalize_color_hex(raw)
    } else {
        raw.to_owned()
    })
}
