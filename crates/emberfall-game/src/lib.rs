//! Emberfall Game - Player subsystem
//!
//! Provides input mapping, the camera rig, player locomotion, target selection,
//! the magic attack and world interaction.

pub mod animation;
pub mod camera;
pub mod combat;
pub mod error;
pub mod events;
pub mod input;
pub mod interaction;
pub mod player;

#[cfg(test)]
mod test_support;

pub use animation::{AnimationSink, AnimatorState};
pub use camera::{CameraConfig, CameraController, CameraRig};
pub use combat::{
    AttackConfig, AttackGate, Explosion, ProjectileSystem, SpawnedProjectile, TargetSelector,
    TargetingConfig,
};
pub use error::ControllerError;
pub use events::{EventBus, InputEvent};
pub use input::{InputAction, InputBindings, InputHandler};
pub use interaction::{
    Activation, Door, DoorConfig, Interactable, InteractableRegistry, InteractionConfig,
    InteractionTrigger, Lever, ProximityTracker, ZoneEvent,
};
pub use player::{Frame, MovementConfig, Player, PlayerConfig, PlayerController, StepOutcome};
