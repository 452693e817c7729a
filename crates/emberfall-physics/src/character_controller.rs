//! Character body using rapier3d's kinematic character controller

use emberfall_core::{ConfigError, Quat, Vec3};
use rapier3d::control::{CharacterAutostep, CharacterLength, KinematicCharacterController};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ContactState;

/// Capsule body tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterBodyConfig {
    /// Capsule height, feet to crown
    pub height: f32,
    pub radius: f32,
    /// Steepest walkable slope in degrees; anything steeper is slid down
    pub max_slope_degrees: f32,
    /// Tallest ledge climbed without jumping
    pub step_height: f32,
    /// Gap kept between the capsule and whatever it touches
    pub skin_width: f32,
    /// How far the body is pulled down onto the ground when walking off small drops.
    /// Zero disables snapping.
    pub snap_distance: f32,
}

impl Default for CharacterBodyConfig {
    fn default() -> Self {
        Self {
            height: 1.8,
            radius: 0.4,
            max_slope_degrees: 45.0,
            step_height: 0.25,
            skin_width: 0.02,
            snap_distance: 0.2,
        }
    }
}

impl CharacterBodyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("character.height", self.height)?;
        ConfigError::positive("character.radius", self.radius)?;
        ConfigError::positive("character.max_slope_degrees", self.max_slope_degrees)?;
        ConfigError::non_negative("character.step_height", self.step_height)?;
        ConfigError::non_negative("character.skin_width", self.skin_width)?;
        ConfigError::non_negative("character.snap_distance", self.snap_distance)
    }

    /// Offset from the feet to the capsule center
    fn center_offset(&self) -> Vec3 {
        Vec3::Y * (self.height / 2.0)
    }

    fn kinematic_controller(&self) -> KinematicCharacterController {
        let slope = self.max_slope_degrees.to_radians();
        KinematicCharacterController {
            max_slope_climb_angle: slope,
            min_slope_slide_angle: slope,
            autostep: (self.step_height > 0.0).then(|| CharacterAutostep {
                max_height: CharacterLength::Absolute(self.step_height),
                min_width: CharacterLength::Relative(0.5),
                include_dynamic_bodies: true,
            }),
            snap_to_ground: (self.snap_distance > 0.0)
                .then(|| CharacterLength::Absolute(self.snap_distance)),
            offset: CharacterLength::Absolute(self.skin_width),
            ..Default::default()
        }
    }
}

/// Kinematic capsule body. `position` is the feet, the collider sits half a height above it.
pub struct CharacterController {
    pub config: CharacterBodyConfig,
    pub position: Vec3,
    /// Facing; the capsule itself always stays upright
    pub rotation: Quat,
    /// Contact state from the last move
    pub contact: ContactState,
    collider_handle: ColliderHandle,
    controller: KinematicCharacterController,
}

impl CharacterController {
    /// Build the capsule collider for a character standing at `position`
    pub fn collider(config: &CharacterBodyConfig, position: Vec3) -> ColliderBuilder {
        let half_segment = (config.height / 2.0 - config.radius).max(0.01);
        let center = position + config.center_offset();
        ColliderBuilder::capsule_y(half_segment, config.radius)
            .translation(vector![center.x, center.y, center.z])
            .friction(0.0)
            .restitution(0.0)
    }

    /// Wrap an already inserted capsule collider
    pub fn new(config: CharacterBodyConfig, position: Vec3, collider_handle: ColliderHandle) -> Self {
        let controller = config.kinematic_controller();
        Self {
            config,
            position,
            rotation: Quat::IDENTITY,
            contact: ContactState::default(),
            collider_handle,
            controller,
        }
    }

    /// Sweep the capsule by `desired_translation`, sliding along whatever it hits
    pub fn move_character(
        &mut self,
        bodies: &RigidBodySet,
        colliders: &mut ColliderSet,
        queries: &QueryPipeline,
        desired_translation: Vec3,
        dt: f32,
    ) -> ContactState {
        let center = self.position + self.config.center_offset();
        let movement = {
            let Some(collider) = colliders.get(self.collider_handle) else {
                return ContactState::default();
            };
            self.controller.move_shape(
                dt,
                bodies,
                colliders,
                queries,
                collider.shape(),
                &Isometry::translation(center.x, center.y, center.z),
                vector![desired_translation.x, desired_translation.y, desired_translation.z],
                QueryFilter::default().exclude_collider(self.collider_handle),
                |_| {},
            )
        };

        let moved = movement.translation;
        self.position += Vec3::new(moved.x, moved.y, moved.z);
        self.contact = ContactState {
            is_grounded: movement.grounded,
        };

        let center = self.position + self.config.center_offset();
        if let Some(collider) = colliders.get_mut(self.collider_handle) {
            collider.set_translation(vector![center.x, center.y, center.z]);
        }
        self.contact
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capsule_sits_above_feet() {
        let config = CharacterBodyConfig::default();
        let collider = CharacterController::collider(&config, Vec3::new(1.0, 2.0, 3.0)).build();
        let translation = collider.translation();
        assert!((translation.y - 2.9).abs() < 1e-5);
        assert_eq!(translation.x, 1.0);
    }

    #[test]
    fn test_zero_distances_disable_step_and_snap() {
        let config = CharacterBodyConfig {
            step_height: 0.0,
            snap_distance: 0.0,
            ..Default::default()
        };
        let controller = config.kinematic_controller();
        assert!(controller.autostep.is_none());
        assert!(controller.snap_to_ground.is_none());

        let controller = CharacterBodyConfig::default().kinematic_controller();
        assert!(controller.autostep.is_some());
        assert!(controller.snap_to_ground.is_some());
    }

    #[test]
    fn test_invalid_body_is_rejected() {
        assert!(CharacterBodyConfig::default().validate().is_ok());
        let config = CharacterBodyConfig {
            radius: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "character.radius", .. })
        ));
    }
}
