//! Player locomotion: ground/air state, jump arbitration, velocity blending and facing

use emberfall_core::{EntityId, Quat, Transform, Vec2, Vec3};
use emberfall_physics::{ContactState, PhysicsBackend};
use tracing::{debug, info, trace};

use crate::animation::{params, AnimationSink};
use crate::camera::CameraRig;
use crate::error::ControllerError;

use super::ground::classify_in_air;
use super::MovementConfig;

/// Per-frame simulation of the player body
#[derive(Debug, Clone)]
pub struct PlayerController {
    /// Movement configuration
    pub config: MovementConfig,
    /// Body moved through the physics backend
    body: EntityId,
    /// Horizontal velocity (X, Z only)
    horizontal_velocity: Vec3,
    /// Vertical velocity, only Y is used
    vertical_velocity: Vec3,
    /// Last move axis received, each component in [-1, 1]
    move_input: Vec2,
    /// Jump requested and not yet honored or dropped
    pending_jump: bool,
    /// Result of the last ground/air classification
    in_air: bool,
    /// Contact reported by the last collision-resolving move
    contact: ContactState,
}

impl PlayerController {
    /// Create a controller for a body that already exists in `world`
    pub fn new<W: PhysicsBackend + ?Sized>(
        body: EntityId,
        config: MovementConfig,
        world: &W,
    ) -> Result<Self, ControllerError> {
        config.validate()?;
        if !world.contains(body) {
            return Err(ControllerError::MissingBody(body));
        }

        info!("Player controller bound to body {}", body);
        Ok(Self {
            config,
            body,
            horizontal_velocity: Vec3::ZERO,
            vertical_velocity: Vec3::ZERO,
            move_input: Vec2::ZERO,
            pending_jump: false,
            in_air: false,
            contact: ContactState::default(),
        })
    }

    /// The body this controller drives
    pub fn body(&self) -> EntityId {
        self.body
    }

    pub fn horizontal_velocity(&self) -> Vec3 {
        self.horizontal_velocity
    }

    pub fn vertical_velocity(&self) -> Vec3 {
        self.vertical_velocity
    }

    pub fn move_input(&self) -> Vec2 {
        self.move_input
    }

    /// Whether the last classification found the body unsupported
    pub fn is_in_air(&self) -> bool {
        self.in_air
    }

    /// Whether the last move ended in contact with the ground
    pub fn is_grounded(&self) -> bool {
        self.contact.is_grounded
    }

    pub fn has_pending_jump(&self) -> bool {
        self.pending_jump
    }

    /// Store a new move axis. Each component is clamped to [-1, 1]; non-finite input reads as zero.
    pub fn handle_move_input(&mut self, input: Vec2) {
        self.move_input = if input.is_finite() {
            input.clamp(Vec2::NEG_ONE, Vec2::ONE)
        } else {
            Vec2::ZERO
        };
    }

    /// Request a jump on the next step. Dropped (returns `false`) while airborne.
    pub fn request_jump(&mut self) -> bool {
        if self.in_air {
            trace!("Jump request dropped while airborne");
            return false;
        }
        self.pending_jump = true;
        true
    }

    /// Advance the body by one simulation step
    pub fn step<W: PhysicsBackend + ?Sized>(
        &mut self,
        world: &mut W,
        camera: &dyn CameraRig,
        mut animator: Option<&mut (dyn AnimationSink + '_)>,
        dt: f32,
    ) {
        let Some(transform) = world.transform(self.body) else {
            trace!("Player body {} is gone, skipping step", self.body);
            return;
        };

        self.update_air_state(&*world, transform.position);
        self.update_vertical_velocity(animator.as_deref_mut(), dt);
        self.update_horizontal_velocity(camera.right(), dt);
        self.update_transform(world, transform.rotation, dt);
        self.update_animation(animator);
    }

    fn update_air_state<W: PhysicsBackend + ?Sized>(&mut self, world: &W, position: Vec3) {
        let in_air = classify_in_air(
            world,
            self.body,
            position,
            self.contact.is_grounded,
            self.config.air_check_radius,
            self.config.air_check_layer_mask,
        );
        if in_air != self.in_air {
            debug!("Player {}", if in_air { "left the ground" } else { "is supported" });
        }
        self.in_air = in_air;
    }

    fn update_vertical_velocity(&mut self, animator: Option<&mut (dyn AnimationSink + '_)>, dt: f32) {
        if self.pending_jump {
            self.pending_jump = false;
            if !self.in_air {
                self.vertical_velocity.y = self.config.jump_speed;
                if let Some(animator) = animator {
                    animator.set_trigger(params::JUMP);
                }
                debug!("Jump at {:.2} m/s", self.config.jump_speed);
                return;
            }
        }

        if self.contact.is_grounded {
            if let Some(animator) = animator {
                animator.reset_trigger(params::JUMP);
            }
            self.vertical_velocity.y = self.config.resting_downward_speed;
            return;
        }

        let floor = -self.config.max_fall_speed;
        if self.vertical_velocity.y > floor {
            self.vertical_velocity.y = (self.vertical_velocity.y + self.config.gravity * dt).max(floor);
        }
    }

    fn update_horizontal_velocity(&mut self, camera_right: Vec3, dt: f32) {
        let move_dir = Self::world_direction(camera_right, self.move_input);
        let accel = self.config.acceleration(self.contact.is_grounded);

        if move_dir != Vec3::ZERO {
            self.horizontal_velocity = (self.horizontal_velocity + move_dir * accel * dt)
                .clamp_length_max(self.config.max_move_speed);
        } else {
            self.horizontal_velocity =
                Self::move_towards_vec3(self.horizontal_velocity, Vec3::ZERO, accel * dt);
        }
    }

    fn update_transform<W: PhysicsBackend + ?Sized>(&mut self, world: &mut W, rotation: Quat, dt: f32) {
        let displacement = (self.horizontal_velocity + self.vertical_velocity) * dt;
        let was_grounded = self.contact.is_grounded;
        self.contact = world.move_with_collision(self.body, displacement, dt);
        if self.contact.is_grounded && !was_grounded {
            debug!("Player landed");
        }

        if let Some(target) = Transform::facing(self.horizontal_velocity) {
            let t = (self.config.turn_lerp_rate * dt).clamp(0.0, 1.0);
            world.set_rotation(self.body, rotation.slerp(target, t));
        }
    }

    fn update_animation(&self, animator: Option<&mut (dyn AnimationSink + '_)>) {
        if let Some(animator) = animator {
            animator.set_float(params::SPEED, self.horizontal_velocity.length());
            animator.set_bool(params::LANDED, !self.in_air);
        }
    }

    /// Camera-relative move direction on the horizontal plane
    fn world_direction(camera_right: Vec3, input: Vec2) -> Vec3 {
        let right = Vec3::new(camera_right.x, 0.0, camera_right.z).normalize_or_zero();
        let forward = Vec3::Y.cross(right);
        right * input.x + forward * input.y
    }

    /// Move a vector towards a target by a maximum delta
    fn move_towards_vec3(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
        let diff = target - current;
        let distance = diff.length();

        if distance <= max_delta || distance == 0.0 {
            target
        } else {
            current + diff / distance * max_delta
        }
    }
}
