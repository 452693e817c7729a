//! Discrete input events and the subscription bus that delivers them
//!
//! Each subscriber gets its own queue. Events published while a subscriber is
//! detached never reach it, and detaching drops anything still queued, so a
//! disabled entity cannot be written to by input that arrives after it was disabled.

use std::collections::{HashMap, VecDeque};

use emberfall_core::{EntityId, Vec2};

/// Input events consumed by the player subsystem
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The 2D move axis changed (also sent with the new value when keys are released)
    MoveChanged(Vec2),
    /// Jump was pressed
    JumpPressed,
    /// Attack was pressed
    AttackPressed,
    /// Interact was pressed
    InteractPressed,
    /// Primary pointer click at a screen position in pixels (origin top-left)
    PointerClicked(Vec2),
}

/// Fan-out event queue keyed by the subscribing entity
#[derive(Debug)]
pub struct EventBus<E> {
    queues: HashMap<EntityId, VecDeque<E>>,
}

impl<E: Clone> EventBus<E> {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }

    /// Start delivering events to `subscriber`. Returns `false` if it was already attached.
    pub fn attach(&mut self, subscriber: EntityId) -> bool {
        if self.queues.contains_key(&subscriber) {
            return false;
        }
        self.queues.insert(subscriber, VecDeque::new());
        true
    }

    /// Stop delivering events to `subscriber` and drop its pending events.
    /// Returns `false` if it was not attached.
    pub fn detach(&mut self, subscriber: EntityId) -> bool {
        self.queues.remove(&subscriber).is_some()
    }

    /// Whether `subscriber` is currently attached
    pub fn is_attached(&self, subscriber: EntityId) -> bool {
        self.queues.contains_key(&subscriber)
    }

    /// Number of attached subscribers
    pub fn subscriber_count(&self) -> usize {
        self.queues.len()
    }

    /// Queue an event for every attached subscriber
    pub fn publish(&mut self, event: E) {
        for queue in self.queues.values_mut() {
            queue.push_back(event.clone());
        }
    }

    /// Take all pending events for `subscriber` in publish order
    pub fn drain(&mut self, subscriber: EntityId) -> Vec<E> {
        self.queues
            .get_mut(&subscriber)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }
}

impl<E: Clone> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}
