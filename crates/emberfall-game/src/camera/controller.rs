//! Third-person orbit camera with mouse look, zoom and screen picking

use emberfall_core::{Mat4, Ray, Tag, Vec2, Vec3};
use emberfall_physics::PhysicsBackend;

use super::{CameraConfig, CameraRig};

/// Orbit camera following a target point
pub struct CameraController {
    /// Configuration
    pub config: CameraConfig,
    /// Yaw rotation in radians (horizontal)
    pub yaw: f32,
    /// Pitch rotation in radians (vertical)
    pub pitch: f32,
    /// Target zoom distance (for smooth interpolation)
    target_distance: f32,
    /// Current interpolated zoom distance
    current_distance: f32,
    /// Camera world position (computed each frame)
    position: Vec3,
    /// Viewport size in pixels
    viewport: Vec2,
}

impl CameraController {
    /// Create a new camera controller
    pub fn new() -> Self {
        Self::with_config(CameraConfig::default())
    }

    /// Create a camera controller with custom config
    pub fn with_config(config: CameraConfig) -> Self {
        let distance = 5.0_f32.clamp(config.min_distance, config.max_distance);
        Self {
            config,
            yaw: 0.0,
            pitch: 0.0,
            target_distance: distance,
            current_distance: distance,
            position: Vec3::new(0.0, 0.0, distance),
            viewport: Vec2::new(1280.0, 720.0),
        }
    }

    /// Get the camera's current world position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current orbit distance
    pub fn distance(&self) -> f32 {
        self.current_distance
    }

    /// Get the camera's forward direction
    pub fn forward(&self) -> Vec3 {
        let cos_pitch = self.pitch.cos();
        Vec3::new(
            self.yaw.sin() * cos_pitch,
            self.pitch.sin(),
            -self.yaw.cos() * cos_pitch,
        )
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_to_rh(self.position, self.forward(), Vec3::Y)
    }

    /// Get the projection matrix for the current viewport
    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.viewport.x / self.viewport.y.max(1.0);
        Mat4::perspective_rh(self.config.fov.to_radians(), aspect, self.config.near, self.config.far)
    }

    /// Resize the viewport (pixels)
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    /// Viewport size in pixels
    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    /// Screen position in pixels of a world point, `None` when it is behind the camera
    pub fn world_to_screen(&self, point: Vec3) -> Option<Vec2> {
        let clip = self.projection_matrix() * self.view_matrix() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * self.viewport.x,
            (1.0 - ndc.y) * 0.5 * self.viewport.y,
        ))
    }

    /// Handle mouse look input
    pub fn handle_mouse_look(&mut self, mouse_delta: Vec2) {
        self.yaw += mouse_delta.x * self.config.sensitivity;
        self.set_pitch(self.pitch - mouse_delta.y * self.config.sensitivity);
    }

    /// Handle scroll wheel zoom
    pub fn handle_zoom(&mut self, scroll_delta: f32) {
        self.target_distance = (self.target_distance - scroll_delta * self.config.zoom_speed)
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Set the camera pitch directly
    pub fn set_pitch(&mut self, pitch: f32) {
        let pitch_min = self.config.pitch_min.to_radians();
        let pitch_max = self.config.pitch_max.to_radians();
        self.pitch = pitch.clamp(pitch_min, pitch_max);
    }

    /// Set the zoom distance directly (for settings/init)
    pub fn set_distance(&mut self, distance: f32) {
        let clamped = distance.clamp(self.config.min_distance, self.config.max_distance);
        self.target_distance = clamped;
        self.current_distance = clamped;
    }

    /// Follow `focus` (usually the player's eye point). Call once per frame.
    ///
    /// When a world is given, the camera is pulled in front of any geometry between
    /// it and the focus point; player bodies are ignored.
    pub fn update<W: PhysicsBackend>(&mut self, focus: Vec3, physics: Option<&W>, dt: f32) {
        let zoom_lerp = 1.0 - (1.0 - self.config.zoom_smoothing).powf(dt * 60.0);
        self.current_distance += (self.target_distance - self.current_distance) * zoom_lerp;

        let shoulder = self.right() * self.config.shoulder_offset;
        let ray_start = focus + shoulder;
        let ideal = ray_start - self.forward() * self.current_distance;

        self.position = ideal;
        let Some(physics) = physics else {
            return;
        };

        let ray = Ray::new(ray_start, ideal - ray_start);
        let reach = self.current_distance + self.config.collision_radius;
        if let Some(hit) = physics.raycast(&ray, reach) {
            if physics.tag(hit.entity) != Tag::Player {
                let safe_distance = (hit.distance - self.config.collision_radius).max(0.5);
                self.position = ray.at(safe_distance);
            }
        }
    }
}

impl Default for CameraController {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraRig for CameraController {
    fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, self.yaw.sin())
    }

    fn screen_point_to_ray(&self, screen: Vec2) -> Ray {
        let ndc = Vec2::new(
            2.0 * screen.x / self.viewport.x - 1.0,
            1.0 - 2.0 * screen.y / self.viewport.y,
        );
        let inverse = (self.projection_matrix() * self.view_matrix()).inverse();
        // perspective_rh maps depth to [0, 1]
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }
}
