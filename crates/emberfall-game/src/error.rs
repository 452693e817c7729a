//! Errors raised while assembling the player

use emberfall_core::{ConfigError, EntityId};

/// Precondition violations detected at construction time
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControllerError {
    #[error("player body {0} is not registered in the physics world")]
    MissingBody(EntityId),

    #[error("invalid player configuration: {0}")]
    Config(#[from] ConfigError),
}
