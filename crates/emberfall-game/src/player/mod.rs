//! Player controller module
//!
//! Provides third-person locomotion against the physics backend and the player
//! entity that ties it to targeting, attacks and interaction.

mod actor;
mod controller;
mod ground;
mod movement;

pub use actor::{Frame, Player, PlayerConfig, StepOutcome};
pub use controller::PlayerController;
pub use ground::classify_in_air;
pub use movement::MovementConfig;
