//! Activatable world objects: doors, levers and the registry that owns them

use std::collections::{HashMap, HashSet};

use emberfall_core::{ConfigError, EntityId, Quat, Vec3};
use emberfall_physics::PhysicsBackend;
use glam::EulerRot;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Outcome of activating an interactable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// A door started swinging open
    Opening,
    /// A door started swinging shut
    Closing,
    /// The object is mid-animation (or latched) and ignored the activation
    Busy,
    /// A lever changed position and may drive a linked object
    Flipped {
        flipped: bool,
        linked: Option<EntityId>,
    },
}

/// Anything the player can activate
pub trait Interactable: std::fmt::Debug {
    fn activate(&mut self) -> Activation;

    /// Advance animation. Returns the new orientation when the object moved.
    fn update(&mut self, _dt: f32) -> Option<Quat> {
        None
    }
}

/// Door configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorConfig {
    /// Swing applied when opening, Euler angles in degrees (Y, then X, then Z)
    pub target_rotation: Vec3,
    /// Swing progress per second (3 = a third of a second per swing)
    pub rotation_speed: f32,
    /// Once opened, the door never moves again
    pub stay_open: bool,
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            target_rotation: Vec3::new(0.0, -100.0, 0.0),
            rotation_speed: 3.0,
            stay_open: false,
        }
    }
}

impl DoorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::finite("door.target_rotation.x", self.target_rotation.x)?;
        ConfigError::finite("door.target_rotation.y", self.target_rotation.y)?;
        ConfigError::finite("door.target_rotation.z", self.target_rotation.z)?;
        ConfigError::positive("door.rotation_speed", self.rotation_speed)
    }
}

#[derive(Debug, Clone, Copy)]
struct Swing {
    start: Quat,
    end: Quat,
    t: f32,
}

/// Hinged door that toggles between closed and open
#[derive(Debug, Clone)]
pub struct Door {
    pub config: DoorConfig,
    rotation: Quat,
    is_open: bool,
    rotating: bool,
    swing: Option<Swing>,
}

impl Door {
    pub fn new(config: DoorConfig, rotation: Quat) -> Self {
        Self {
            config,
            rotation,
            is_open: false,
            rotating: false,
            swing: None,
        }
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Whether activations are currently ignored
    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    fn euler(degrees: Vec3) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            degrees.y.to_radians(),
            degrees.x.to_radians(),
            degrees.z.to_radians(),
        )
    }
}

impl Interactable for Door {
    fn activate(&mut self) -> Activation {
        if self.rotating {
            return Activation::Busy;
        }

        let amount = if self.is_open {
            -self.config.target_rotation
        } else {
            self.config.target_rotation
        };
        self.rotating = true;
        self.swing = Some(Swing {
            start: self.rotation,
            end: self.rotation * Self::euler(amount),
            t: 0.0,
        });
        self.is_open = !self.is_open;

        if self.is_open {
            Activation::Opening
        } else {
            Activation::Closing
        }
    }

    fn update(&mut self, dt: f32) -> Option<Quat> {
        let swing = self.swing.as_mut()?;
        swing.t += dt * self.config.rotation_speed;
        self.rotation = swing.start.slerp(swing.end, swing.t.min(1.0));

        if swing.t >= 1.0 {
            self.swing = None;
            // A stay-open door stays "rotating" so it ignores every later activation
            if !self.config.stay_open {
                self.rotating = false;
            }
        }
        Some(self.rotation)
    }
}

/// Two-position lever, optionally driving another interactable
#[derive(Debug, Clone, Default)]
pub struct Lever {
    flipped: bool,
    linked: Option<EntityId>,
}

impl Lever {
    pub fn new(linked: Option<EntityId>) -> Self {
        Self {
            flipped: false,
            linked,
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    pub fn linked(&self) -> Option<EntityId> {
        self.linked
    }
}

impl Interactable for Lever {
    fn activate(&mut self) -> Activation {
        self.flipped = !self.flipped;
        Activation::Flipped {
            flipped: self.flipped,
            linked: self.linked,
        }
    }
}

/// Interactables keyed by the world entity that represents them
#[derive(Debug, Default)]
pub struct InteractableRegistry {
    items: HashMap<EntityId, Box<dyn Interactable>>,
}

impl InteractableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: EntityId, interactable: impl Interactable + 'static) {
        self.items.insert(entity, Box::new(interactable));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Activate `entity`, then whatever it is linked to, in order.
    ///
    /// Each entity is activated at most once per call.
    pub fn activate(&mut self, entity: EntityId) -> Vec<(EntityId, Activation)> {
        let mut results = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(entity);

        while let Some(id) = next.take() {
            if !visited.insert(id) {
                warn!("Interactable link cycle through {}", id);
                break;
            }
            let Some(interactable) = self.items.get_mut(&id) else {
                debug!("No interactable registered for {}", id);
                break;
            };

            let activation = interactable.activate();
            debug!("Activated {}: {:?}", id, activation);
            if let Activation::Flipped { linked, .. } = activation {
                next = linked;
            }
            results.push((id, activation));
        }

        results
    }

    /// Advance animations and push moved orientations into the world
    pub fn update<W: PhysicsBackend + ?Sized>(&mut self, world: &mut W, dt: f32) {
        for (entity, interactable) in &mut self.items {
            if let Some(rotation) = interactable.update(dt) {
                world.set_rotation(*entity, rotation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakePhysics;
    use emberfall_core::Tag;

    fn finish(door: &mut Door) {
        for _ in 0..10 {
            door.update(0.1);
        }
    }

    fn open_rotation() -> Quat {
        Quat::from_rotation_y((-100.0_f32).to_radians())
    }

    #[test]
    fn test_door_swings_open_and_shut() {
        let mut door = Door::new(DoorConfig::default(), Quat::IDENTITY);

        assert_eq!(door.activate(), Activation::Opening);
        assert!(door.is_rotating());
        assert!(door.is_open());

        finish(&mut door);
        assert!(!door.is_rotating());
        assert!(door.rotation().angle_between(open_rotation()) < 1e-3);

        assert_eq!(door.activate(), Activation::Closing);
        finish(&mut door);
        assert!(door.rotation().angle_between(Quat::IDENTITY) < 1e-3);
        assert!(!door.is_open());
    }

    #[test]
    fn test_door_ignores_activation_while_rotating() {
        let mut door = Door::new(DoorConfig::default(), Quat::IDENTITY);
        door.activate();
        door.update(0.1);

        assert_eq!(door.activate(), Activation::Busy);
        assert!(door.is_open());
    }

    #[test]
    fn test_door_swing_is_interpolated() {
        let mut door = Door::new(DoorConfig::default(), Quat::IDENTITY);
        door.activate();

        let rotation = door.update(0.1).unwrap();
        let expected = Quat::IDENTITY.slerp(open_rotation(), 0.3);
        assert!(rotation.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_stay_open_door_latches() {
        let mut door = Door::new(
            DoorConfig {
                stay_open: true,
                ..Default::default()
            },
            Quat::IDENTITY,
        );
        door.activate();
        finish(&mut door);

        assert!(door.is_rotating());
        assert_eq!(door.activate(), Activation::Busy);
        assert!(door.update(0.1).is_none());
    }

    #[test]
    fn test_idle_door_does_not_move() {
        let mut door = Door::new(DoorConfig::default(), Quat::IDENTITY);
        assert!(door.update(0.1).is_none());
    }

    #[test]
    fn test_door_config_needs_positive_speed() {
        assert!(DoorConfig::default().validate().is_ok());

        for rotation_speed in [0.0, -3.0] {
            let config = DoorConfig {
                rotation_speed,
                ..Default::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::NotPositive { field: "door.rotation_speed", .. })
            ));
        }

        let config = DoorConfig {
            target_rotation: Vec3::new(0.0, f32::NAN, 0.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lever_toggles() {
        let mut lever = Lever::new(None);
        assert_eq!(
            lever.activate(),
            Activation::Flipped { flipped: true, linked: None }
        );
        lever.activate();
        assert!(!lever.is_flipped());
    }

    #[test]
    fn test_registry_follows_lever_link() {
        let door = EntityId::new();
        let lever = EntityId::new();
        let mut registry = InteractableRegistry::new();
        registry.insert(door, Door::new(DoorConfig::default(), Quat::IDENTITY));
        registry.insert(lever, Lever::new(Some(door)));

        let results = registry.activate(lever);
        assert_eq!(
            results,
            vec![
                (lever, Activation::Flipped { flipped: true, linked: Some(door) }),
                (door, Activation::Opening),
            ]
        );

        // Door is still swinging
        let results = registry.activate(lever);
        assert_eq!(results[1], (door, Activation::Busy));
    }

    #[test]
    fn test_registry_breaks_link_cycles() {
        let a = EntityId::new();
        let b = EntityId::new();
        let mut registry = InteractableRegistry::new();
        registry.insert(a, Lever::new(Some(b)));
        registry.insert(b, Lever::new(Some(a)));

        assert_eq!(registry.activate(a).len(), 2);
    }

    #[test]
    fn test_unknown_entity_does_nothing() {
        let mut registry = InteractableRegistry::new();
        assert!(registry.activate(EntityId::new()).is_empty());
    }

    #[test]
    fn test_registry_update_rotates_world_entity() {
        let mut world = FakePhysics::new();
        let door = world.add(Vec3::new(2.0, 1.0, 0.0), Tag::Interactable);
        let mut registry = InteractableRegistry::new();
        registry.insert(door, Door::new(DoorConfig::default(), Quat::IDENTITY));

        registry.activate(door);
        for _ in 0..10 {
            registry.update(&mut world, 0.1);
        }

        let rotation = world.transform(door).unwrap().rotation;
        assert!(rotation.angle_between(open_rotation()) < 1e-3);
    }
}
