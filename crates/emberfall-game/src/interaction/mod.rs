//! Interaction system for interactable objects in the world
//!
//! A proximity zone around the player records the interactable in range; the
//! interact action activates it through the [`InteractableRegistry`].

mod interactable;
mod trigger;

pub use interactable::{Activation, Door, DoorConfig, Interactable, InteractableRegistry, Lever};
pub use trigger::{InteractionConfig, InteractionTrigger, ProximityTracker, ZoneEvent};
