//! Cooldown-gated magic attack

use emberfall_core::{ConfigError, Cooldown, EntityId, Transform, Vec3};
use emberfall_physics::{PhysicsBackend, ProjectileDesc, ProjectileFactory};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::animation::{params, AnimationSink};

/// Attack configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackConfig {
    /// Impulse magnitude given to each projectile
    pub magic_force: f32,
    /// Seconds before another attack is allowed
    pub cooldown_seconds: f32,
    /// Projectile to spawn; attacks are disabled without one
    pub projectile: Option<ProjectileDesc>,
    /// Spawn point relative to the owner's body; attacks are disabled without one
    pub spawn_point: Option<Transform>,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            magic_force: 20.0,
            cooldown_seconds: 1.0,
            projectile: Some(ProjectileDesc::default()),
            spawn_point: Some(Transform::from_position(Vec3::new(0.0, 1.2, -0.8))),
        }
    }
}

impl AttackConfig {
    /// Whether both the projectile and its spawn point are configured
    pub fn has_resources(&self) -> bool {
        self.projectile.is_some() && self.spawn_point.is_some()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::non_negative("magic_force", self.magic_force)?;
        ConfigError::non_negative("cooldown_seconds", self.cooldown_seconds)?;
        if let Some(desc) = &self.projectile {
            ConfigError::positive("projectile.radius", desc.radius)?;
            ConfigError::positive("projectile.mass", desc.mass)?;
            ConfigError::finite("projectile.gravity_scale", desc.gravity_scale)?;
            ConfigError::non_negative("projectile.explosion_radius", desc.explosion_radius)?;
            ConfigError::positive("projectile.max_lifetime", desc.max_lifetime)?;
        }
        Ok(())
    }
}

/// A projectile launched by a successful attack
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedProjectile {
    pub entity: EntityId,
    pub desc: ProjectileDesc,
    /// Unit direction from the spawn point to the target
    pub direction: Vec3,
}

/// Fires at most one projectile per cooldown window
#[derive(Debug, Clone)]
pub struct AttackGate {
    pub config: AttackConfig,
    can_attack: bool,
    cooldown: Cooldown,
}

impl AttackGate {
    pub fn new(config: AttackConfig) -> Self {
        if !config.has_resources() {
            warn!("Attack projectile or spawn point not configured, attacks are disabled");
        }
        let cooldown = Cooldown::new(f64::from(config.cooldown_seconds));
        Self {
            config,
            can_attack: true,
            cooldown,
        }
    }

    pub fn can_attack(&self) -> bool {
        self.can_attack
    }

    /// Seconds until the gate re-arms
    pub fn cooldown_remaining(&self, now: f64) -> f64 {
        self.cooldown.remaining(now)
    }

    /// Re-arm once the cooldown has elapsed. Returns `true` on the re-arming call only.
    pub fn update(&mut self, now: f64) -> bool {
        if self.cooldown.poll(now) {
            self.can_attack = true;
            debug!("Attack ready");
            return true;
        }
        false
    }

    /// Launch a projectile from `owner` at `target`.
    ///
    /// Does nothing while cooling down, without a target that still exists, or
    /// without configured projectile resources.
    pub fn try_attack<W: PhysicsBackend + ProjectileFactory + ?Sized>(
        &mut self,
        world: &mut W,
        owner: EntityId,
        target: Option<EntityId>,
        now: f64,
        animator: Option<&mut (dyn AnimationSink + '_)>,
    ) -> Option<SpawnedProjectile> {
        if !self.can_attack {
            trace!("Attack ignored, {:.2}s of cooldown left", self.cooldown_remaining(now));
            return None;
        }
        let target_position = target.and_then(|t| world.transform(t))?.position;
        let (Some(desc), Some(spawn_point)) = (&self.config.projectile, &self.config.spawn_point) else {
            return None;
        };
        let owner_transform = world.transform(owner)?;
        let spawn = owner_transform.child(spawn_point);

        self.can_attack = false;
        if let Some(animator) = animator {
            animator.set_trigger(params::ATTACK);
        }

        let entity = world.spawn_projectile(desc, spawn);
        let direction = (target_position - spawn.position).normalize_or_zero();
        world.apply_impulse(entity, direction * self.config.magic_force);
        self.cooldown.start(now);

        debug!("Projectile {} launched toward {:?}", entity, target_position);
        Some(SpawnedProjectile {
            entity,
            desc: desc.clone(),
            direction,
        })
    }
}

impl Default for AttackGate {
    fn default() -> Self {
        Self::new(AttackConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimatorState;
    use crate::test_support::FakePhysics;
    use emberfall_core::{Quat, Tag};

    fn scene() -> (FakePhysics, EntityId, EntityId) {
        let mut world = FakePhysics::new();
        let owner = world.add(Vec3::ZERO, Tag::Player);
        let enemy = world.add(Vec3::new(0.0, 1.2, -10.8), Tag::Enemy);
        (world, owner, enemy)
    }

    #[test]
    fn test_attack_launches_toward_target() {
        let (mut world, owner, enemy) = scene();
        let mut gate = AttackGate::default();
        let mut animator = AnimatorState::new();

        let spawned = gate
            .try_attack(&mut world, owner, Some(enemy), 0.0, Some(&mut animator))
            .unwrap();

        assert_eq!(world.spawned.len(), 1);
        assert!((world.spawned[0].1.position - Vec3::new(0.0, 1.2, -0.8)).length() < 1e-5);
        assert!((spawned.direction - -Vec3::Z).length() < 1e-5);

        let (entity, impulse) = world.impulses[0];
        assert_eq!(entity, spawned.entity);
        assert!((impulse - Vec3::new(0.0, 0.0, -20.0)).length() < 1e-4);
        assert!(!gate.can_attack());
        assert_eq!(animator.trigger_count(params::ATTACK), 1);
    }

    #[test]
    fn test_spawn_point_follows_owner_facing() {
        let (mut world, owner, enemy) = scene();
        world.entities.get_mut(&owner).unwrap().transform.rotation =
            Quat::from_rotation_y(-std::f32::consts::FRAC_PI_2);
        let mut gate = AttackGate::default();

        gate.try_attack(&mut world, owner, Some(enemy), 0.0, None).unwrap();

        assert!((world.spawned[0].1.position - Vec3::new(0.8, 1.2, 0.0)).length() < 1e-5);
        let direction = world.impulses[0].1.normalize();
        let expected = (Vec3::new(0.0, 1.2, -10.8) - Vec3::new(0.8, 1.2, 0.0)).normalize();
        assert!((direction - expected).length() < 1e-5);
    }

    #[test]
    fn test_cooldown_blocks_second_attack() {
        let (mut world, owner, enemy) = scene();
        let mut gate = AttackGate::default();

        assert!(gate.try_attack(&mut world, owner, Some(enemy), 0.0, None).is_some());
        assert!(gate.try_attack(&mut world, owner, Some(enemy), 0.5, None).is_none());

        assert_eq!(world.spawned.len(), 1);
        assert_eq!(world.impulses.len(), 1);
        assert!(!gate.can_attack());
    }

    #[test]
    fn test_cooldown_rearms_exactly_once() {
        let (mut world, owner, enemy) = scene();
        let mut gate = AttackGate::default();
        gate.try_attack(&mut world, owner, Some(enemy), 2.0, None);

        assert!(!gate.update(2.5));
        assert!((gate.cooldown_remaining(2.5) - 0.5).abs() < 1e-9);
        assert!(gate.update(3.0));
        assert!(!gate.update(3.5));
        assert!(gate.can_attack());

        assert!(gate.try_attack(&mut world, owner, Some(enemy), 3.5, None).is_some());
        assert_eq!(world.spawned.len(), 2);
    }

    #[test]
    fn test_no_target_is_a_no_op() {
        let (mut world, owner, _) = scene();
        let mut gate = AttackGate::default();
        let mut animator = AnimatorState::new();

        assert!(gate.try_attack(&mut world, owner, None, 0.0, Some(&mut animator)).is_none());
        assert!(gate.can_attack());
        assert!(world.spawned.is_empty());
        assert_eq!(animator.trigger_count(params::ATTACK), 0);
    }

    #[test]
    fn test_vanished_target_is_a_no_op() {
        let (mut world, owner, enemy) = scene();
        world.entities.remove(&enemy);
        let mut gate = AttackGate::default();

        assert!(gate.try_attack(&mut world, owner, Some(enemy), 0.0, None).is_none());
        assert!(gate.can_attack());
    }

    #[test]
    fn test_missing_resources_disable_attacks() {
        let (mut world, owner, enemy) = scene();
        let mut gate = AttackGate::new(AttackConfig {
            projectile: None,
            ..Default::default()
        });
        assert!(gate.try_attack(&mut world, owner, Some(enemy), 0.0, None).is_none());

        let mut gate = AttackGate::new(AttackConfig {
            spawn_point: None,
            ..Default::default()
        });
        assert!(gate.try_attack(&mut world, owner, Some(enemy), 0.0, None).is_none());
        assert!(world.spawned.is_empty());
        assert!(gate.can_attack());
    }

    #[test]
    fn test_config_validation() {
        assert!(AttackConfig::default().validate().is_ok());
        let config = AttackConfig {
            projectile: Some(ProjectileDesc {
                mass: 0.0,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
