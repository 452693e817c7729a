//! Pointer-driven target selection

use emberfall_core::{ConfigError, EntityId, Tag, Vec2};
use emberfall_physics::PhysicsBackend;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::CameraRig;

/// Target selection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Maximum pick ray length
    pub max_distance: f32,
    /// Tag an entity must carry to become the target
    pub target_tag: Tag,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            max_distance: 1000.0,
            target_tag: Tag::Enemy,
        }
    }
}

impl TargetingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("max_distance", self.max_distance)
    }
}

/// Holds at most one current target.
///
/// The target is a lookup handle only; callers resolve it against the world each
/// time they need its position.
#[derive(Debug, Clone, Default)]
pub struct TargetSelector {
    pub config: TargetingConfig,
    current: Option<EntityId>,
}

impl TargetSelector {
    pub fn new(config: TargetingConfig) -> Self {
        Self {
            config,
            current: None,
        }
    }

    pub fn current_target(&self) -> Option<EntityId> {
        self.current
    }

    /// Pick through the camera at a screen position.
    ///
    /// A hit on a tagged entity selects it and a hit on anything else clears the
    /// selection. A miss keeps whatever was selected before.
    pub fn handle_click<W: PhysicsBackend + ?Sized>(
        &mut self,
        world: &W,
        camera: &dyn CameraRig,
        screen: Vec2,
    ) -> Option<EntityId> {
        let ray = camera.screen_point_to_ray(screen);
        let Some(hit) = world.raycast(&ray, self.config.max_distance) else {
            return self.current;
        };

        let selected = (world.tag(hit.entity) == self.config.target_tag).then_some(hit.entity);
        if selected != self.current {
            match selected {
                Some(target) => debug!("Target selected: {}", target),
                None => debug!("Target cleared"),
            }
        }
        self.current = selected;
        self.current
    }
}
