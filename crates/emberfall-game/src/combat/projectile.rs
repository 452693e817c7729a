//! Fireball projectiles: impact explosions and lifetime expiry

use emberfall_core::{EntityId, LayerMask, Tag, Vec3};
use emberfall_physics::{PhysicsBackend, ProjectileDesc};
use tracing::{debug, trace};

/// Extra distance around a projectile that counts as touching
const CONTACT_MARGIN: f32 = 0.05;

#[derive(Debug, Clone)]
struct TrackedProjectile {
    entity: EntityId,
    desc: ProjectileDesc,
    age: f32,
}

/// A projectile that hit something this step
#[derive(Debug, Clone, PartialEq)]
pub struct Explosion {
    pub projectile: EntityId,
    pub position: Vec3,
    /// Enemies removed by the blast
    pub destroyed: Vec<EntityId>,
}

/// Owns nothing in the world; it only watches projectiles that were handed to it
#[derive(Debug, Default)]
pub struct ProjectileSystem {
    live: Vec<TrackedProjectile>,
}

impl ProjectileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start watching a launched projectile
    pub fn track(&mut self, entity: EntityId, desc: ProjectileDesc) {
        self.live.push(TrackedProjectile {
            entity,
            desc,
            age: 0.0,
        });
    }

    /// Number of projectiles still in flight
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// Advance lifetimes and resolve impacts.
    ///
    /// A projectile touching anything other than itself or a player explodes:
    /// every enemy within its explosion radius is despawned, then the projectile.
    pub fn update<W: PhysicsBackend + ?Sized>(&mut self, world: &mut W, dt: f32) -> Vec<Explosion> {
        let mut explosions = Vec::new();

        self.live.retain_mut(|projectile| {
            let Some(transform) = world.transform(projectile.entity) else {
                trace!("Projectile {} vanished", projectile.entity);
                return false;
            };

            projectile.age += dt;
            if projectile.age >= projectile.desc.max_lifetime {
                world.despawn(projectile.entity);
                debug!("Projectile {} expired", projectile.entity);
                return false;
            }

            let position = transform.position;
            let touching = world
                .overlap_sphere(position, projectile.desc.radius + CONTACT_MARGIN, LayerMask::ALL)
                .into_iter()
                .any(|entity| entity != projectile.entity && world.tag(entity) != Tag::Player);
            if !touching {
                return true;
            }

            let destroyed: Vec<EntityId> = world
                .overlap_sphere(position, projectile.desc.explosion_radius, LayerMask::ALL)
                .into_iter()
                .filter(|&entity| entity != projectile.entity && world.tag(entity) == Tag::Enemy)
                .collect();
            for &enemy in &destroyed {
                world.despawn(enemy);
            }
            world.despawn(projectile.entity);

            debug!(
                "Projectile {} exploded at {:?}, {} enemies destroyed",
                projectile.entity,
                position,
                destroyed.len()
            );
            explosions.push(Explosion {
                projectile: projectile.entity,
                position,
                destroyed,
            });
            false
        });

        explosions
    }
}
