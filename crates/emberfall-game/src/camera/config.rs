//! Camera configuration

use emberfall_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Camera configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Minimum orbit distance
    pub min_distance: f32,
    /// Maximum orbit distance
    pub max_distance: f32,
    /// Zoom speed (scroll sensitivity)
    pub zoom_speed: f32,
    /// Zoom interpolation smoothing (0-1, lower = smoother)
    pub zoom_smoothing: f32,
    /// Mouse sensitivity (radians per pixel)
    pub sensitivity: f32,
    /// Minimum pitch angle in degrees
    pub pitch_min: f32,
    /// Maximum pitch angle in degrees
    pub pitch_max: f32,
    /// Collision radius for camera
    pub collision_radius: f32,
    /// Horizontal offset in third person (shoulder view)
    pub shoulder_offset: f32,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Near clip plane
    pub near: f32,
    /// Far clip plane
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            min_distance: 1.5,
            max_distance: 20.0,
            zoom_speed: 2.0,
            zoom_smoothing: 0.15,
            sensitivity: 0.003,
            pitch_min: -80.0,
            pitch_max: 80.0,
            collision_radius: 0.3,
            shoulder_offset: 0.3,
            fov: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("camera.min_distance", self.min_distance)?;
        ConfigError::positive("camera.max_distance", self.max_distance)?;
        ConfigError::positive("camera.fov", self.fov)?;
        ConfigError::positive("camera.near", self.near)?;
        ConfigError::positive("camera.far", self.far)?;
        ConfigError::non_negative("camera.collision_radius", self.collision_radius)?;
        Ok(())
    }
}
