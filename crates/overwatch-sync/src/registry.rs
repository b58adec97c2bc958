//! The entity registry: the authoritative in-memory picture.
//!
//! Readers get shared references; all mutation goes through
//! [`Synchronizer`](crate::Synchronizer), which holds the only `&mut`.

use std::collections::BTreeMap;

use overwatch_types::{Entity, EntityUid, FieldOfViewCone, RangeBearingSegment};

/// Entities and their derived geometry, keyed by uid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityUid, Entity>,
    cones: BTreeMap<EntityUid, FieldOfViewCone>,
    lines: BTreeMap<EntityUid, RangeBearingSegment>,
}

impl EntityRegistry {
    /// Create an empty registry.
    pub const fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            cones: BTreeMap::new(),
            lines: BTreeMap::new(),
        }
    }

    /// Look up an entity.
    pub fn get(&self, uid: &EntityUid) -> Option<&Entity> {
        self.entities.get(uid)
    }

    /// Whether an entity with this uid exists.
    pub fn contains(&self, uid: &EntityUid) -> bool {
        self.entities.contains_key(uid)
    }

    /// All entities in uid order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// The field-of-view cone owned by an entity.
    pub fn cone(&self, owner: &EntityUid) -> Option<&FieldOfViewCone> {
        self.cones.get(owner)
    }

    /// All cones in owner order.
    pub fn cones(&self) -> impl Iterator<Item = &FieldOfViewCone> {
        self.cones.values()
    }

    /// The line segment of a range and bearing entity.
    pub fn line(&self, uid: &EntityUid) -> Option<&RangeBearingSegment> {
        self.lines.get(uid)
    }

    /// All line segments in uid order.
    pub fn lines(&self) -> impl Iterator<Item = &RangeBearingSegment> {
        self.lines.values()
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the registry holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn entity_mut(&mut self, uid: &EntityUid) -> Option<&mut Entity> {
        self.entities.get_mut(uid)
    }

    pub(crate) fn insert_entity(&mut self, entity: Entity) {
        self.entities.insert(entity.uid.clone(), entity);
    }

    pub(crate) fn remove_entity(&mut self, uid: &EntityUid) -> Option<Entity> {
        self.entities.remove(uid)
    }

    pub(crate) fn set_cone(&mut self, cone: FieldOfViewCone) {
        self.cones.insert(cone.owner.clone(), cone);
    }

    pub(crate) fn remove_cone(&mut self, owner: &EntityUid) -> Option<FieldOfViewCone> {
        self.cones.remove(owner)
    }

    pub(crate) fn set_line(&mut self, line: RangeBearingSegment) {
        self.lines.insert(line.uid.clone(), line);
    }

    pub(crate) fn remove_line(&mut self, uid: &EntityUid) -> Option<RangeBearingSegment> {
        self.lines.remove(uid)
    }
}
