//! Deterministic stand-ins for the physics and camera collaborators

use std::cell::Cell;
use std::collections::HashMap;

use emberfall_core::{EntityId, LayerMask, Quat, Ray, Tag, Transform, Vec2, Vec3};
use emberfall_physics::{ContactState, PhysicsBackend, ProjectileDesc, ProjectileFactory, RayHit};

use crate::camera::CameraRig;

#[derive(Debug, Clone)]
pub struct FakeEntity {
    pub transform: Transform,
    pub tag: Tag,
    pub layers: LayerMask,
    /// Bounding sphere radius used by overlap queries
    pub extent: f32,
}

/// Point-entity world with an optional flat floor.
///
/// Characters fall onto the floor and report grounded contact when resting on it.
#[derive(Debug, Default)]
pub struct FakePhysics {
    pub entities: HashMap<EntityId, FakeEntity>,
    /// Floor entity and its height
    pub floor: Option<(EntityId, f32)>,
    /// Result returned by every ray cast
    pub ray_result: Option<RayHit>,
    pub moves: Vec<Vec3>,
    pub spawned: Vec<(EntityId, Transform)>,
    pub impulses: Vec<(EntityId, Vec3)>,
    pub despawned: Vec<EntityId>,
    pub overlap_queries: Cell<usize>,
}

impl FakePhysics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_floor(height: f32) -> Self {
        let mut world = Self::new();
        let floor = EntityId::new();
        world.floor = Some((floor, height));
        world
    }

    pub fn add(&mut self, position: Vec3, tag: Tag) -> EntityId {
        self.add_with(position, tag, LayerMask::DEFAULT, 0.5)
    }

    pub fn add_with(&mut self, position: Vec3, tag: Tag, layers: LayerMask, extent: f32) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(
            id,
            FakeEntity {
                transform: Transform::from_position(position),
                tag,
                layers,
                extent,
            },
        );
        id
    }

    pub fn position(&self, entity: EntityId) -> Vec3 {
        self.entities[&entity].transform.position
    }

    pub fn set_position(&mut self, entity: EntityId, position: Vec3) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.transform.position = position;
        }
    }

    pub fn hit(&mut self, entity: EntityId) {
        self.ray_result = Some(RayHit {
            entity,
            point: self.position(entity),
            distance: 1.0,
        });
    }
}

impl PhysicsBackend for FakePhysics {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<EntityId> {
        self.overlap_queries.set(self.overlap_queries.get() + 1);
        let mut found: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, e)| e.layers.intersects(mask))
            .filter(|(_, e)| e.transform.position.distance(center) <= radius + e.extent)
            .map(|(id, _)| *id)
            .collect();
        if let Some((floor, height)) = self.floor {
            if mask.intersects(LayerMask::DEFAULT) && center.y - radius <= height {
                found.push(floor);
            }
        }
        found
    }

    fn raycast(&self, _ray: &Ray, _max_distance: f32) -> Option<RayHit> {
        self.ray_result
    }

    fn move_with_collision(&mut self, body: EntityId, displacement: Vec3, _dt: f32) -> ContactState {
        self.moves.push(displacement);
        let floor = self.floor.map(|(_, h)| h);
        let Some(entity) = self.entities.get_mut(&body) else {
            return ContactState::default();
        };
        entity.transform.position += displacement;
        match floor {
            Some(height) if entity.transform.position.y <= height => {
                entity.transform.position.y = height;
                ContactState { is_grounded: true }
            }
            _ => ContactState::default(),
        }
    }

    fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.entities.get(&entity).map(|e| e.transform)
    }

    fn set_rotation(&mut self, entity: EntityId, rotation: Quat) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.transform.rotation = rotation;
        }
    }

    fn tag(&self, entity: EntityId) -> Tag {
        self.entities.get(&entity).map(|e| e.tag).unwrap_or_default()
    }

    fn despawn(&mut self, entity: EntityId) -> bool {
        let removed = self.entities.remove(&entity).is_some();
        if removed {
            self.despawned.push(entity);
        }
        removed
    }
}

impl ProjectileFactory for FakePhysics {
    fn spawn_projectile(&mut self, desc: &ProjectileDesc, at: Transform) -> EntityId {
        let id = self.add_with(at.position, Tag::Projectile, LayerMask::DEFAULT, desc.radius);
        if let Some(e) = self.entities.get_mut(&id) {
            e.transform.rotation = at.rotation;
        }
        self.spawned.push((id, at));
        id
    }

    fn apply_impulse(&mut self, entity: EntityId, impulse: Vec3) {
        self.impulses.push((entity, impulse));
    }
}

/// Camera whose right axis and pick ray are set directly
#[derive(Debug, Clone)]
pub struct FixedCamera {
    pub right: Vec3,
    pub ray: Ray,
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            right: Vec3::X,
            ray: Ray::new(Vec3::new(0.0, 2.0, 5.0), -Vec3::Z),
        }
    }
}

impl CameraRig for FixedCamera {
    fn right(&self) -> Vec3 {
        self.right
    }

    fn screen_point_to_ray(&self, _screen: Vec2) -> Ray {
        self.ray
    }
}
