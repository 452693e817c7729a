//! Physics backend abstraction.
//!
//! Gameplay code only talks to the world through these traits, so the same
//! locomotion and combat logic runs against the rapier world or a scripted fake.

use emberfall_core::{EntityId, LayerMask, Quat, Ray, Tag, Transform, Vec3};
use serde::{Deserialize, Serialize};

/// Result of a successful ray cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The entity that was hit
    pub entity: EntityId,
    /// World-space hit point
    pub point: Vec3,
    /// Distance along the ray to the hit point
    pub distance: f32,
}

/// Contact state reported by a collision-resolving move
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    /// Whether the body ended the move standing on something
    pub is_grounded: bool,
}

/// World queries and body movement used by the player subsystem.
pub trait PhysicsBackend {
    /// All entities whose colliders overlap the sphere and share a layer with `mask`.
    ///
    /// The querying body itself is not excluded.
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<EntityId>;

    /// First entity hit by the ray within `max_distance`
    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit>;

    /// Move a character body by `displacement`, resolving collisions along the way.
    ///
    /// Unknown bodies do not move and report no contact.
    fn move_with_collision(&mut self, body: EntityId, displacement: Vec3, dt: f32) -> ContactState;

    /// Current transform of an entity, `None` if it no longer exists
    fn transform(&self, entity: EntityId) -> Option<Transform>;

    /// Set the facing of an entity without moving it
    fn set_rotation(&mut self, entity: EntityId, rotation: Quat);

    /// Gameplay tag of an entity; unknown entities are untagged
    fn tag(&self, entity: EntityId) -> Tag;

    /// Remove an entity from the world. Returns `false` if it was already gone.
    fn despawn(&mut self, entity: EntityId) -> bool;

    /// Whether the entity still exists
    fn contains(&self, entity: EntityId) -> bool {
        self.transform(entity).is_some()
    }
}

/// Description of a projectile to instantiate (the "prefab")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileDesc {
    /// Collision sphere radius
    pub radius: f32,
    /// Mass in kilograms; impulses are divided by this
    pub mass: f32,
    /// Multiplier on world gravity (0 = flies straight)
    pub gravity_scale: f32,
    /// Radius in which enemies are destroyed on impact
    pub explosion_radius: f32,
    /// Seconds before an unexploded projectile is removed
    pub max_lifetime: f32,
}

impl Default for ProjectileDesc {
    fn default() -> Self {
        Self {
            radius: 0.15,
            mass: 1.0,
            gravity_scale: 0.0,
            explosion_radius: 1.0,
            max_lifetime: 5.0,
        }
    }
}

/// Spawns independent projectile bodies and pushes them
pub trait ProjectileFactory {
    /// Instantiate a projectile at the given transform
    fn spawn_projectile(&mut self, desc: &ProjectileDesc, at: Transform) -> EntityId;

    /// Apply an instantaneous change in momentum
    fn apply_impulse(&mut self, entity: EntityId, impulse: Vec3);
}
