//! Emberfall Core - Shared types and utilities
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - Transform, ray, tag and layer types for world entities
//! - Game time and one-shot cooldown timers
//! - Common error types

pub mod error;
pub mod time;
pub mod types;

pub use error::ConfigError;
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use time::{Cooldown, GameTime, TimeConfig};
pub use types::{EntityId, LayerMask, Ray, Tag, Transform};
