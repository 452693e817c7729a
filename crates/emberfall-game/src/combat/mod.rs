//! Combat system module
//!
//! Provides pointer target selection, the cooldown-gated magic attack and the
//! fireball projectiles it launches.

pub mod attack;
pub mod projectile;
pub mod targeting;

pub use attack::{AttackConfig, AttackGate, SpawnedProjectile};
pub use projectile::{Explosion, ProjectileSystem};
pub use targeting::{TargetSelector, TargetingConfig};
