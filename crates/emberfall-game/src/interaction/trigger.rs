//! Interaction trigger and the proximity zone that feeds it

use std::collections::HashSet;

use emberfall_core::{ConfigError, EntityId, LayerMask, Tag, Vec3};
use emberfall_physics::PhysicsBackend;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{Activation, InteractableRegistry};

/// Proximity zone configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Radius of the zone around the player's body
    pub radius: f32,
    /// Layers the zone reacts to
    pub mask: LayerMask,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            radius: 1.5,
            mask: LayerMask::ALL,
        }
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::non_negative("interaction.radius", self.radius)
    }
}

/// An interactable crossing the proximity zone boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneEvent {
    Entered { entity: EntityId, tag: Tag },
    Exited { entity: EntityId },
}

/// Remembers the one interactable the player can currently use
#[derive(Debug, Clone, Default)]
pub struct InteractionTrigger {
    in_range: Option<EntityId>,
}

impl InteractionTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn interactable_in_range(&self) -> Option<EntityId> {
        self.in_range
    }

    /// Record an interactable entering the zone; the most recent one wins
    pub fn on_enter(&mut self, entity: EntityId, tag: Tag) -> bool {
        if tag != Tag::Interactable {
            return false;
        }
        debug!("Interactable {} in range", entity);
        self.in_range = Some(entity);
        true
    }

    /// Forget the recorded interactable, but only if it is the one leaving
    pub fn on_exit(&mut self, entity: EntityId) -> bool {
        if self.in_range != Some(entity) {
            return false;
        }
        debug!("Interactable {} out of range", entity);
        self.in_range = None;
        true
    }

    /// Forget the recorded interactable without an exit event
    pub fn clear(&mut self) {
        self.in_range = None;
    }

    pub fn apply(&mut self, event: ZoneEvent) {
        match event {
            ZoneEvent::Entered { entity, tag } => {
                self.on_enter(entity, tag);
            }
            ZoneEvent::Exited { entity } => {
                self.on_exit(entity);
            }
        }
    }

    /// Activate whatever is in range. Empty when nothing is.
    pub fn interact(&self, registry: &mut InteractableRegistry) -> Vec<(EntityId, Activation)> {
        match self.in_range {
            Some(entity) => registry.activate(entity),
            None => {
                trace!("Interact with nothing in range");
                Vec::new()
            }
        }
    }
}

/// Turns sphere overlaps around the player into zone enter/exit events
#[derive(Debug, Clone, Default)]
pub struct ProximityTracker {
    pub config: InteractionConfig,
    inside: HashSet<EntityId>,
}

impl ProximityTracker {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            inside: HashSet::new(),
        }
    }

    /// Whether `entity` is currently inside the zone
    pub fn contains(&self, entity: EntityId) -> bool {
        self.inside.contains(&entity)
    }

    /// Forget everything inside; the next update reports every overlap as an entry
    pub fn reset(&mut self) {
        self.inside.clear();
    }

    /// Compare the zone contents against the last call.
    ///
    /// Exits come first. Simultaneous entries are ordered farthest first, so the
    /// nearest one is the last to enter.
    pub fn update<W: PhysicsBackend + ?Sized>(&mut self, world: &W, center: Vec3) -> Vec<ZoneEvent> {
        let now: HashSet<EntityId> = world
            .overlap_sphere(center, self.config.radius, self.config.mask)
            .into_iter()
            .filter(|&entity| world.tag(entity) == Tag::Interactable)
            .collect();

        let mut events: Vec<ZoneEvent> = self
            .inside
            .difference(&now)
            .map(|&entity| ZoneEvent::Exited { entity })
            .collect();

        let mut entered: Vec<(f32, EntityId)> = now
            .difference(&self.inside)
            .map(|&entity| {
                let distance = world
                    .transform(entity)
                    .map_or(f32::MAX, |t| t.position.distance_squared(center));
                (distance, entity)
            })
            .collect();
        entered.sort_by(|a, b| b.0.total_cmp(&a.0));
        events.extend(entered.into_iter().map(|(_, entity)| ZoneEvent::Entered {
            entity,
            tag: Tag::Interactable,
        }));

        self.inside = now;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Lever;
    use crate::test_support::FakePhysics;

    #[test]
    fn test_last_entered_wins() {
        let a = EntityId::new();
        let b = EntityId::new();
        let mut trigger = InteractionTrigger::new();

        trigger.on_enter(a, Tag::Interactable);
        trigger.on_enter(b, Tag::Interactable);
        assert_eq!(trigger.interactable_in_range(), Some(b));
    }

    #[test]
    fn test_exit_of_other_entity_keeps_current() {
        let a = EntityId::new();
        let b = EntityId::new();
        let mut trigger = InteractionTrigger::new();
        trigger.on_enter(a, Tag::Interactable);
        trigger.on_enter(b, Tag::Interactable);

        assert!(!trigger.on_exit(a));
        assert_eq!(trigger.interactable_in_range(), Some(b));

        assert!(trigger.on_exit(b));
        assert_eq!(trigger.interactable_in_range(), None);
    }

    #[test]
    fn test_untagged_entry_is_ignored() {
        let mut trigger = InteractionTrigger::new();
        assert!(!trigger.on_enter(EntityId::new(), Tag::Enemy));
        assert_eq!(trigger.interactable_in_range(), None);
    }

    #[test]
    fn test_interact_forwards_activation() {
        let lever = EntityId::new();
        let mut registry = InteractableRegistry::new();
        registry.insert(lever, Lever::new(None));
        let mut trigger = InteractionTrigger::new();

        assert!(trigger.interact(&mut registry).is_empty());

        trigger.on_enter(lever, Tag::Interactable);
        let results = trigger.interact(&mut registry);
        assert_eq!(
            results,
            vec![(lever, Activation::Flipped { flipped: true, linked: None })]
        );
    }

    #[test]
    fn test_tracker_reports_enter_and_exit() {
        let mut world = FakePhysics::new();
        let lever = world.add_with(Vec3::new(3.0, 0.0, 0.0), Tag::Interactable, LayerMask::DEFAULT, 0.25);
        world.add_with(Vec3::new(0.5, 0.0, 0.0), Tag::Enemy, LayerMask::DEFAULT, 0.25);
        let mut tracker = ProximityTracker::default();

        assert!(tracker.update(&world, Vec3::ZERO).is_empty());

        let events = tracker.update(&world, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(events, vec![ZoneEvent::Entered { entity: lever, tag: Tag::Interactable }]);
        assert!(tracker.contains(lever));

        // Still inside, nothing new
        assert!(tracker.update(&world, Vec3::new(2.5, 0.0, 0.0)).is_empty());

        let events = tracker.update(&world, Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(events, vec![ZoneEvent::Exited { entity: lever }]);
    }

    #[test]
    fn test_nearest_simultaneous_entry_wins() {
        let mut world = FakePhysics::new();
        let near = world.add_with(Vec3::new(0.5, 0.0, 0.0), Tag::Interactable, LayerMask::DEFAULT, 0.1);
        let far = world.add_with(Vec3::new(-1.2, 0.0, 0.0), Tag::Interactable, LayerMask::DEFAULT, 0.1);
        let mut tracker = ProximityTracker::default();
        let mut trigger = InteractionTrigger::new();

        for event in tracker.update(&world, Vec3::ZERO) {
            trigger.apply(event);
        }
        assert!(tracker.contains(far));
        assert_eq!(trigger.interactable_in_range(), Some(near));
    }

    #[test]
    fn test_despawned_interactable_exits() {
        let mut world = FakePhysics::new();
        let lever = world.add(Vec3::new(1.0, 0.0, 0.0), Tag::Interactable);
        let mut tracker = ProximityTracker::default();
        let mut trigger = InteractionTrigger::new();

        for event in tracker.update(&world, Vec3::ZERO) {
            trigger.apply(event);
        }
        world.despawn(lever);
        for event in tracker.update(&world, Vec3::ZERO) {
            trigger.apply(event);
        }
        assert_eq!(trigger.interactable_in_range(), None);
    }
}
