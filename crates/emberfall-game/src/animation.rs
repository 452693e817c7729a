//! Animation signal sink
//!
//! The locomotion and combat code only emits named scalar, boolean and trigger
//! signals; whatever drives the character's animation graph implements
//! [`AnimationSink`].

use std::collections::{HashMap, HashSet};

use tracing::trace;

/// Parameter names understood by the character animation graph
pub mod params {
    /// Horizontal speed in meters per second
    pub const SPEED: &str = "Speed";
    /// True while the body is supported
    pub const LANDED: &str = "Landed";
    /// Pulse when a jump starts
    pub const JUMP: &str = "Jump";
    /// Pulse when an attack fires
    pub const ATTACK: &str = "Attack";
}

/// Receiver for animation parameters
pub trait AnimationSink {
    fn set_float(&mut self, name: &str, value: f32);
    fn set_bool(&mut self, name: &str, value: bool);
    /// Arm a trigger; it stays set until consumed by the graph or reset
    fn set_trigger(&mut self, name: &str);
    fn reset_trigger(&mut self, name: &str);
}

/// Animator parameter block, the way an animation graph would hold it
#[derive(Debug, Default, Clone)]
pub struct AnimatorState {
    floats: HashMap<String, f32>,
    bools: HashMap<String, bool>,
    triggers: HashSet<String>,
    trigger_counts: HashMap<String, u32>,
}

impl AnimatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current float value (0.0 if never set)
    pub fn float(&self, name: &str) -> f32 {
        self.floats.get(name).copied().unwrap_or(0.0)
    }

    /// Current bool value (false if never set)
    pub fn bool(&self, name: &str) -> bool {
        self.bools.get(name).copied().unwrap_or(false)
    }

    /// Whether the trigger is armed
    pub fn is_triggered(&self, name: &str) -> bool {
        self.triggers.contains(name)
    }

    /// How many times the trigger has been set since creation
    pub fn trigger_count(&self, name: &str) -> u32 {
        self.trigger_counts.get(name).copied().unwrap_or(0)
    }

    /// Consume an armed trigger, as a state transition would
    pub fn consume_trigger(&mut self, name: &str) -> bool {
        self.triggers.remove(name)
    }
}

impl AnimationSink for AnimatorState {
    fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_string(), value);
    }

    fn set_trigger(&mut self, name: &str) {
        trace!("animation trigger {}", name);
        self.triggers.insert(name.to_string());
        *self.trigger_counts.entry(name.to_string()).or_default() += 1;
    }

    fn reset_trigger(&mut self, name: &str) {
        self.triggers.remove(name);
    }
}
