//! The player entity: locomotion, targeting, attack and interaction behind one event queue

use emberfall_core::{ConfigError, EntityId};
use emberfall_physics::{PhysicsBackend, ProjectileFactory};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::animation::AnimationSink;
use crate::camera::CameraRig;
use crate::combat::{AttackConfig, AttackGate, SpawnedProjectile, TargetSelector, TargetingConfig};
use crate::error::ControllerError;
use crate::events::{EventBus, InputEvent};
use crate::interaction::{
    Activation, InteractableRegistry, InteractionConfig, InteractionTrigger, ProximityTracker,
};

use super::{MovementConfig, PlayerController};

/// Every tunable of the player entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub movement: MovementConfig,
    pub attack: AttackConfig,
    pub targeting: TargetingConfig,
    pub interaction: InteractionConfig,
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.movement.validate()?;
        self.attack.validate()?;
        self.targeting.validate()?;
        self.interaction.validate()
    }
}

/// Collaborators handed to the player for one step
pub struct Frame<'a, W: ?Sized> {
    pub world: &'a mut W,
    pub camera: &'a dyn CameraRig,
    pub animator: Option<&'a mut dyn AnimationSink>,
    pub interactables: &'a mut InteractableRegistry,
    /// Monotonic time in seconds
    pub now: f64,
    pub dt: f32,
}

/// What the step produced for the rest of the game
#[derive(Debug, Default)]
pub struct StepOutcome {
    pub spawned: Option<SpawnedProjectile>,
    pub activations: Vec<(EntityId, Activation)>,
}

/// The player entity
#[derive(Debug)]
pub struct Player {
    controller: PlayerController,
    targeting: TargetSelector,
    attack: AttackGate,
    trigger: InteractionTrigger,
    proximity: ProximityTracker,
    /// Set after the first step without an animation sink has been reported
    animator_missing_reported: bool,
}

impl Player {
    /// Bind a player to a body that already exists in `world`
    pub fn new<W: PhysicsBackend + ?Sized>(
        body: EntityId,
        config: PlayerConfig,
        world: &W,
    ) -> Result<Self, ControllerError> {
        config.validate()?;
        let PlayerConfig {
            movement,
            attack,
            targeting,
            interaction,
        } = config;

        let controller = PlayerController::new(body, movement, world)?;
        info!("Player ready on body {}", body);
        Ok(Self {
            controller,
            targeting: TargetSelector::new(targeting),
            attack: AttackGate::new(attack),
            trigger: InteractionTrigger::new(),
            proximity: ProximityTracker::new(interaction),
            animator_missing_reported: false,
        })
    }

    /// The body entity, also the player's subscriber id on the event bus
    pub fn body(&self) -> EntityId {
        self.controller.body()
    }

    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    pub fn current_target(&self) -> Option<EntityId> {
        self.targeting.current_target()
    }

    pub fn can_attack(&self) -> bool {
        self.attack.can_attack()
    }

    pub fn interactable_in_range(&self) -> Option<EntityId> {
        self.trigger.interactable_in_range()
    }

    /// Start receiving input. Returns `false` if already attached.
    pub fn attach(&self, bus: &mut EventBus<InputEvent>) -> bool {
        let attached = bus.attach(self.body());
        if attached {
            debug!("Player {} attached to input", self.body());
        }
        attached
    }

    /// Stop receiving input and drop anything queued. Returns `false` if already detached.
    ///
    /// Zone contents are forgotten too; they are rebuilt from overlaps once the
    /// player steps again.
    pub fn detach(&mut self, bus: &mut EventBus<InputEvent>) -> bool {
        let detached = bus.detach(self.body());
        if detached {
            self.trigger.clear();
            self.proximity.reset();
            debug!("Player {} detached from input", self.body());
        }
        detached
    }

    /// Run one frame: re-arm the attack, handle queued input, move the body, then
    /// refresh the interaction zone. A detached player does nothing.
    pub fn step<W: PhysicsBackend + ProjectileFactory + ?Sized>(
        &mut self,
        bus: &mut EventBus<InputEvent>,
        frame: Frame<'_, W>,
    ) -> StepOutcome {
        let Frame {
            world,
            camera,
            mut animator,
            interactables,
            now,
            dt,
        } = frame;
        let body = self.body();
        let mut outcome = StepOutcome::default();
        if !bus.is_attached(body) {
            return outcome;
        }

        if animator.is_none() && !self.animator_missing_reported {
            warn!("Player {} has no animation sink, animation signals are dropped", body);
            self.animator_missing_reported = true;
        }

        self.attack.update(now);

        for event in bus.drain(body) {
            match event {
                InputEvent::MoveChanged(axis) => self.controller.handle_move_input(axis),
                InputEvent::JumpPressed => {
                    self.controller.request_jump();
                }
                InputEvent::PointerClicked(screen) => {
                    self.targeting.handle_click(&*world, camera, screen);
                }
                InputEvent::AttackPressed => {
                    let target = self.targeting.current_target();
                    if let Some(spawned) =
                        self.attack
                            .try_attack(world, body, target, now, animator.as_deref_mut())
                    {
                        outcome.spawned = Some(spawned);
                    }
                }
                InputEvent::InteractPressed => {
                    outcome.activations.extend(self.trigger.interact(interactables));
                }
            }
        }

        self.controller.step(world, camera, animator.as_deref_mut(), dt);

        if let Some(transform) = world.transform(body) {
            for event in self.proximity.update(&*world, transform.position) {
                self.trigger.apply(event);
            }
        }

        outcome
    }
}
