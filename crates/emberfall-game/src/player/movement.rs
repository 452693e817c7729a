//! Movement configuration and constants

use emberfall_core::{ConfigError, LayerMask};
use serde::{Deserialize, Serialize};

/// Movement configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Initial upward speed of a jump in meters per second
    pub jump_speed: f32,
    /// Hard cap on horizontal speed
    pub max_move_speed: f32,
    /// Horizontal acceleration (and decay) while grounded
    pub ground_acceleration: f32,
    /// Horizontal acceleration (and decay) while airborne
    pub air_acceleration: f32,
    /// How quickly the body turns to face its horizontal velocity
    pub turn_lerp_rate: f32,
    /// Terminal fall speed (positive)
    pub max_fall_speed: f32,
    /// Radius of the nearby-collider check used when contact says airborne
    pub air_check_radius: f32,
    /// Layers considered by the nearby-collider check
    pub air_check_layer_mask: LayerMask,
    /// Vertical gravity acceleration (negative is down)
    pub gravity: f32,
    /// Vertical speed held while resting on a surface, keeps the body seated
    pub resting_downward_speed: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            jump_speed: 6.0,
            max_move_speed: 5.0,
            ground_acceleration: 40.0,
            air_acceleration: 5.0,
            turn_lerp_rate: 40.0,
            max_fall_speed: 50.0,
            air_check_radius: 0.2,
            air_check_layer_mask: LayerMask::DEFAULT,
            gravity: -9.81,
            resting_downward_speed: -1.0,
        }
    }
}

impl MovementConfig {
    /// Get the current acceleration based on grounded state
    pub fn acceleration(&self, grounded: bool) -> f32 {
        if grounded {
            self.ground_acceleration
        } else {
            self.air_acceleration
        }
    }

    /// Reject tunables the integrators cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::non_negative("jump_speed", self.jump_speed)?;
        ConfigError::non_negative("max_move_speed", self.max_move_speed)?;
        ConfigError::non_negative("ground_acceleration", self.ground_acceleration)?;
        ConfigError::non_negative("air_acceleration", self.air_acceleration)?;
        ConfigError::non_negative("turn_lerp_rate", self.turn_lerp_rate)?;
        ConfigError::positive("max_fall_speed", self.max_fall_speed)?;
        ConfigError::non_negative("air_check_radius", self.air_check_radius)?;
        ConfigError::finite("gravity", self.gravity)?;

        // The resting speed must sit between zero and terminal velocity
        ConfigError::non_negative("resting_downward_speed", -self.resting_downward_speed)?;
        ConfigError::non_negative(
            "max_fall_speed + resting_downward_speed",
            self.max_fall_speed + self.resting_downward_speed,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MovementConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.acceleration(true), 40.0);
        assert_eq!(config.acceleration(false), 5.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = MovementConfig {
            max_move_speed: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Negative { field: "max_move_speed", .. })
        ));

        let config = MovementConfig {
            gravity: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::NotFinite { .. })));

        let config = MovementConfig {
            resting_downward_speed: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = MovementConfig {
            max_fall_speed: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: MovementConfig = toml::from_str("jump_speed = 8.0").unwrap();
        assert_eq!(config.jump_speed, 8.0);
        assert_eq!(config.max_move_speed, 5.0);
    }
}
