//! Emberfall Physics - World collaborators backed by rapier3d
//!
//! Provides the [`PhysicsBackend`] and [`ProjectileFactory`] interfaces used by
//! gameplay code, and [`PhysicsWorld`], a rapier3d implementation of both that keeps
//! a registry of tagged, layered entities.

mod backend;
mod character_controller;

pub use backend::{ContactState, PhysicsBackend, ProjectileDesc, ProjectileFactory, RayHit};
pub use character_controller::{CharacterBodyConfig, CharacterController};

use std::collections::HashMap;

use emberfall_core::{EntityId, LayerMask, Quat, Ray, Tag, Transform, Vec3};
use nalgebra::{Unit, UnitQuaternion};
use rapier3d::prelude::*;
use tracing::{debug, warn};

/// Physics world configuration
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 on Y axis)
    pub gravity: Vec3,
    /// Physics timestep (default: 1/60)
    pub timestep: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            timestep: 1.0 / 60.0,
        }
    }
}

/// Bookkeeping for one world entity
#[derive(Debug, Clone, Copy)]
struct EntityRecord {
    collider: ColliderHandle,
    body: Option<RigidBodyHandle>,
    tag: Tag,
    /// Mass used for impulses, zero for static and kinematic entities
    mass: f32,
}

/// The main physics world containing all simulation state
pub struct PhysicsWorld {
    /// Configuration
    pub config: PhysicsConfig,

    /// Rigid body storage
    pub rigid_body_set: RigidBodySet,
    /// Collider storage
    pub collider_set: ColliderSet,
    /// Impulse joint storage
    pub impulse_joint_set: ImpulseJointSet,
    /// Multi-body joint storage
    pub multibody_joint_set: MultibodyJointSet,

    /// Integration parameters
    integration_parameters: IntegrationParameters,
    /// Physics pipeline
    physics_pipeline: PhysicsPipeline,
    /// Island manager
    island_manager: IslandManager,
    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,
    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,
    /// Continuous collision detection solver
    ccd_solver: CCDSolver,
    /// Query pipeline for raycasts and shape casts
    query_pipeline: QueryPipeline,

    /// Gameplay entities by id
    entities: HashMap<EntityId, EntityRecord>,
    /// Reverse lookup from query results
    by_collider: HashMap<ColliderHandle, EntityId>,
    /// Kinematic character bodies
    characters: HashMap<EntityId, CharacterController>,
}

impl PhysicsWorld {
    /// Create a new physics world with default configuration
    pub fn new() -> Self {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a new physics world with custom configuration
    pub fn with_config(config: PhysicsConfig) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = config.timestep;

        Self {
            config,
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            entities: HashMap::new(),
            by_collider: HashMap::new(),
            characters: HashMap::new(),
        }
    }

    /// Step the physics simulation
    pub fn step(&mut self) {
        let gravity = vector![self.config.gravity.x, self.config.gravity.y, self.config.gravity.z];

        self.physics_pipeline.step(
            &gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        // Update query pipeline after physics step
        self.refresh_queries();
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Create a ground plane at height `y`
    pub fn create_ground(&mut self, y: f32) -> EntityId {
        let normal = Unit::new_normalize(vector![0.0, 1.0, 0.0]);
        let ground = ColliderBuilder::halfspace(normal)
            .translation(vector![0.0, y, 0.0])
            .friction(0.7)
            .restitution(0.0)
            .collision_groups(Self::groups(LayerMask::DEFAULT));
        self.register_static(ground, Tag::Untagged)
    }

    /// Create a static box collider
    pub fn spawn_static_box(
        &mut self,
        half_extents: Vec3,
        position: Vec3,
        tag: Tag,
        layers: LayerMask,
    ) -> EntityId {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .translation(vector![position.x, position.y, position.z])
            .friction(0.7)
            .collision_groups(Self::groups(layers));
        self.register_static(collider, tag)
    }

    /// Spawn a kinematic character standing at `position`
    pub fn spawn_character(
        &mut self,
        config: CharacterBodyConfig,
        position: Vec3,
        tag: Tag,
        layers: LayerMask,
    ) -> EntityId {
        let collider = CharacterController::collider(&config, position)
            .collision_groups(Self::groups(layers));
        let handle = self.collider_set.insert(collider);
        let id = self.register(handle, None, tag, 0.0);
        self.characters
            .insert(id, CharacterController::new(config, position, handle));
        self.refresh_queries();
        debug!("Spawned character {} at {:?}", id, position);
        id
    }

    /// Linear velocity of a dynamic entity
    pub fn linear_velocity(&self, entity: EntityId) -> Option<Vec3> {
        let body = self.entities.get(&entity)?.body?;
        let velocity = self.rigid_body_set.get(body)?.linvel();
        Some(Vec3::new(velocity.x, velocity.y, velocity.z))
    }

    fn groups(layers: LayerMask) -> InteractionGroups {
        InteractionGroups::new(Group::from_bits_truncate(layers.0), Group::ALL)
    }

    fn register_static(&mut self, collider: ColliderBuilder, tag: Tag) -> EntityId {
        let handle = self.collider_set.insert(collider);
        let id = self.register(handle, None, tag, 0.0);
        self.refresh_queries();
        id
    }

    fn register(
        &mut self,
        collider: ColliderHandle,
        body: Option<RigidBodyHandle>,
        tag: Tag,
        mass: f32,
    ) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(id, EntityRecord { collider, body, tag, mass });
        self.by_collider.insert(collider, id);
        id
    }

    fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn to_glam_quat(rotation: &UnitQuaternion<f32>) -> Quat {
    Quat::from_xyzw(rotation.i, rotation.j, rotation.k, rotation.w)
}

impl PhysicsBackend for PhysicsWorld {
    fn overlap_sphere(&self, center: Vec3, radius: f32, mask: LayerMask) -> Vec<EntityId> {
        let shape = rapier3d::parry::shape::Ball::new(radius);
        let shape_pos = Isometry::translation(center.x, center.y, center.z);
        let filter = QueryFilter::default().groups(InteractionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(mask.0),
        ));

        let mut found = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            &shape,
            filter,
            |handle| {
                if let Some(id) = self.by_collider.get(&handle) {
                    found.push(*id);
                }
                true
            },
        );
        found
    }

    fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let query = rapier3d::prelude::Ray::new(
            point![ray.origin.x, ray.origin.y, ray.origin.z],
            vector![ray.direction.x, ray.direction.y, ray.direction.z],
        );

        let (handle, toi) = self.query_pipeline.cast_ray(
            &self.rigid_body_set,
            &self.collider_set,
            &query,
            max_distance,
            true,
            QueryFilter::default(),
        )?;

        let entity = *self.by_collider.get(&handle)?;
        Some(RayHit {
            entity,
            point: ray.at(toi),
            distance: toi,
        })
    }

    fn move_with_collision(&mut self, body: EntityId, displacement: Vec3, dt: f32) -> ContactState {
        let Some(character) = self.characters.get_mut(&body) else {
            warn!("move_with_collision on non-character entity {}", body);
            return ContactState::default();
        };

        let contact = character.move_character(
            &self.rigid_body_set,
            &mut self.collider_set,
            &self.query_pipeline,
            displacement,
            dt,
        );
        self.query_pipeline.update(&self.collider_set);
        contact
    }

    fn transform(&self, entity: EntityId) -> Option<Transform> {
        if let Some(character) = self.characters.get(&entity) {
            return Some(Transform::from_position_rotation(
                character.position,
                character.rotation,
            ));
        }

        let record = self.entities.get(&entity)?;
        let isometry = match record.body {
            Some(body) => self.rigid_body_set.get(body)?.position(),
            None => self.collider_set.get(record.collider)?.position(),
        };
        let t = isometry.translation.vector;
        Some(Transform::from_position_rotation(
            Vec3::new(t.x, t.y, t.z),
            to_glam_quat(&isometry.rotation),
        ))
    }

    fn set_rotation(&mut self, entity: EntityId, rotation: Quat) {
        if let Some(character) = self.characters.get_mut(&entity) {
            character.rotation = rotation;
            return;
        }

        let Some(record) = self.entities.get(&entity) else {
            return;
        };
        let axis = rotation.to_scaled_axis();
        let rotation = vector![axis.x, axis.y, axis.z];
        match record.body {
            Some(body) => {
                if let Some(body) = self.rigid_body_set.get_mut(body) {
                    body.set_rotation(UnitQuaternion::new(rotation), true);
                }
            }
            None => {
                if let Some(collider) = self.collider_set.get_mut(record.collider) {
                    collider.set_rotation(UnitQuaternion::new(rotation));
                }
            }
        }
    }

    fn tag(&self, entity: EntityId) -> Tag {
        self.entities
            .get(&entity)
            .map(|record| record.tag)
            .unwrap_or_default()
    }

    fn despawn(&mut self, entity: EntityId) -> bool {
        let Some(record) = self.entities.remove(&entity) else {
            return false;
        };
        self.by_collider.remove(&record.collider);
        self.characters.remove(&entity);

        match record.body {
            Some(body) => {
                self.rigid_body_set.remove(
                    body,
                    &mut self.island_manager,
                    &mut self.collider_set,
                    &mut self.impulse_joint_set,
                    &mut self.multibody_joint_set,
                    true,
                );
            }
            None => {
                self.collider_set.remove(
                    record.collider,
                    &mut self.island_manager,
                    &mut self.rigid_body_set,
                    true,
                );
            }
        }
        self.refresh_queries();
        debug!("Despawned {:?} entity {}", record.tag, entity);
        true
    }
}

impl ProjectileFactory for PhysicsWorld {
    fn spawn_projectile(&mut self, desc: &ProjectileDesc, at: Transform) -> EntityId {
        let axis = at.rotation.to_scaled_axis();
        let body = RigidBodyBuilder::dynamic()
            .translation(vector![at.position.x, at.position.y, at.position.z])
            .rotation(vector![axis.x, axis.y, axis.z])
            .gravity_scale(desc.gravity_scale)
            .ccd_enabled(true)
            .build();
        let collider = ColliderBuilder::ball(desc.radius)
            .mass(desc.mass)
            .restitution(0.0)
            .build();

        let body_handle = self.rigid_body_set.insert(body);
        let collider_handle =
            self.collider_set
                .insert_with_parent(collider, body_handle, &mut self.rigid_body_set);
        let id = self.register(collider_handle, Some(body_handle), Tag::Projectile, desc.mass);
        self.refresh_queries();
        id
    }

    fn apply_impulse(&mut self, entity: EntityId, impulse: Vec3) {
        let Some(record) = self.entities.get(&entity) else {
            return;
        };
        let (Some(handle), true) = (record.body, record.mass > 0.0) else {
            return;
        };
        // Mass properties of a freshly inserted body are only refreshed on the next step
        let delta = impulse / record.mass;
        if let Some(body) = self.rigid_body_set.get_mut(handle) {
            let velocity = *body.linvel() + vector![delta.x, delta.y, delta.z];
            body.set_linvel(velocity, true);
        }
    }
}
