//! Camera system module
//!
//! Provides the third-person orbit camera and the [`CameraRig`] view of it that
//! movement and targeting consume.

mod config;
mod controller;

pub use config::CameraConfig;
pub use controller::CameraController;

use emberfall_core::{Ray, Vec2, Vec3};

/// What gameplay needs from the active camera
pub trait CameraRig {
    /// Camera right axis in world space
    fn right(&self) -> Vec3;

    /// Ray from the camera through a screen position in pixels (origin top-left)
    fn screen_point_to_ray(&self, screen: Vec2) -> Ray;
}
