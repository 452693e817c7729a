//! Emberfall - headless player sandbox
//!
//! Builds a small scene (ground, two enemies, a lever wired to a door), then drives
//! the player through a scripted input sequence on the fixed timestep and logs
//! what happens.

mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use emberfall_core::{EntityId, GameTime, LayerMask, Quat, Tag, Vec3};
use emberfall_game::{
    AnimatorState, CameraController, Door, EventBus, Frame, InputEvent, InputHandler,
    InteractableRegistry, Lever, Player, ProjectileSystem,
};
use emberfall_physics::{PhysicsBackend, PhysicsWorld};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::{KeyCode, PhysicalKey};

use settings::Settings;

/// Player eye height above the body origin, used as the camera focus
const EYE_HEIGHT: f32 = 1.6;

/// One scripted input on a given fixed step
#[derive(Debug, Clone, Copy)]
enum Scripted {
    Key(KeyCode, ElementState),
    /// Move the cursor over the target enemy and left click it
    ClickTarget,
    Mouse(MouseButton, ElementState),
    Attach,
    Detach,
}

const SCRIPT: &[(u32, Scripted)] = &[
    (0, Scripted::Attach),
    (30, Scripted::ClickTarget),
    (31, Scripted::Mouse(MouseButton::Right, ElementState::Pressed)),
    (32, Scripted::Mouse(MouseButton::Right, ElementState::Released)),
    // Still cooling down
    (40, Scripted::Key(KeyCode::KeyF, ElementState::Pressed)),
    (41, Scripted::Key(KeyCode::KeyF, ElementState::Released)),
    (60, Scripted::Key(KeyCode::Space, ElementState::Pressed)),
    (61, Scripted::Key(KeyCode::Space, ElementState::Released)),
    (140, Scripted::Key(KeyCode::KeyD, ElementState::Pressed)),
    (170, Scripted::Key(KeyCode::KeyD, ElementState::Released)),
    (200, Scripted::Key(KeyCode::KeyE, ElementState::Pressed)),
    (201, Scripted::Key(KeyCode::KeyE, ElementState::Released)),
    (230, Scripted::Detach),
    // Dropped while detached
    (235, Scripted::Key(KeyCode::Space, ElementState::Pressed)),
    (236, Scripted::Key(KeyCode::Space, ElementState::Released)),
    (240, Scripted::Attach),
];

/// Everything the sandbox owns
struct Sandbox {
    world: PhysicsWorld,
    camera: CameraController,
    animator: AnimatorState,
    registry: InteractableRegistry,
    projectiles: ProjectileSystem,
    bus: EventBus<InputEvent>,
    input: InputHandler,
    player: Player,
    /// Enemy the scripted click aims at
    target: EntityId,
    explosions: usize,
}

impl Sandbox {
    fn new(settings: &Settings) -> Result<Self> {
        let mut world = PhysicsWorld::new();
        world.create_ground(0.0);

        let body = world.spawn_character(
            settings.character.clone(),
            Vec3::new(0.0, 0.1, 0.0),
            Tag::Player,
            LayerMask::layer(1),
        );
        let target = world.spawn_static_box(
            Vec3::new(0.5, 1.0, 0.5),
            Vec3::new(0.0, 1.0, -10.0),
            Tag::Enemy,
            LayerMask::DEFAULT,
        );
        world.spawn_static_box(
            Vec3::new(0.5, 1.0, 0.5),
            Vec3::new(3.0, 1.0, -10.0),
            Tag::Enemy,
            LayerMask::DEFAULT,
        );
        let lever = world.spawn_static_box(
            Vec3::splat(0.2),
            Vec3::new(3.0, 0.5, 1.0),
            Tag::Interactable,
            LayerMask::DEFAULT,
        );
        let door = world.spawn_static_box(
            Vec3::new(0.1, 1.0, 0.6),
            Vec3::new(6.0, 1.0, 3.0),
            Tag::Interactable,
            LayerMask::DEFAULT,
        );

        let mut registry = InteractableRegistry::new();
        registry.insert(door, Door::new(settings.door.clone(), Quat::IDENTITY));
        registry.insert(lever, Lever::new(Some(door)));

        let player = Player::new(body, settings.player.clone(), &world)
            .context("Failed to create player")?;

        let mut camera = CameraController::with_config(settings.camera.clone());
        // Look down far enough that the pick ray clears the player's own capsule
        camera.set_pitch((-20.0_f32).to_radians());

        info!(
            "Scene ready: {} entities, {} interactables, player {}, lever {} drives door {}",
            world.entity_count(),
            registry.len(),
            body,
            lever,
            door
        );

        Ok(Self {
            world,
            camera,
            animator: AnimatorState::new(),
            registry,
            projectiles: ProjectileSystem::new(),
            bus: EventBus::new(),
            input: InputHandler::new(),
            player,
            target,
            explosions: 0,
        })
    }

    fn player_position(&self) -> Vec3 {
        self.world
            .transform(self.player.body())
            .map_or(Vec3::ZERO, |t| t.position)
    }

    fn apply_script(&mut self, step: u32) {
        for (_, input) in SCRIPT.iter().filter(|(at, _)| *at == step) {
            debug!("Step {}: {:?}", step, input);
            match *input {
                Scripted::Key(key, state) => {
                    self.input.handle_keyboard(PhysicalKey::Code(key), state)
                }
                Scripted::Mouse(button, state) => self.input.handle_mouse_button(button, state),
                Scripted::ClickTarget => {
                    let Some(center) = self.world.transform(self.target).map(|t| t.position) else {
                        continue;
                    };
                    if let Some(screen) = self.camera.world_to_screen(center) {
                        self.input
                            .handle_cursor_moved(f64::from(screen.x), f64::from(screen.y));
                        self.input
                            .handle_mouse_button(MouseButton::Left, ElementState::Pressed);
                        self.input
                            .handle_mouse_button(MouseButton::Left, ElementState::Released);
                    }
                }
                Scripted::Attach => {
                    self.player.attach(&mut self.bus);
                }
                Scripted::Detach => {
                    self.player.detach(&mut self.bus);
                    self.input.release_all();
                }
            }
        }
        self.input.flush(&mut self.bus);
    }

    fn fixed_update(&mut self, now: f64, dt: f32) {
        let outcome = self.player.step(
            &mut self.bus,
            Frame {
                world: &mut self.world,
                camera: &self.camera,
                animator: Some(&mut self.animator),
                interactables: &mut self.registry,
                now,
                dt,
            },
        );

        if let Some(spawned) = outcome.spawned {
            info!("Projectile {} launched towards {:?}", spawned.entity, spawned.direction);
            self.projectiles.track(spawned.entity, spawned.desc);
        }
        for (entity, activation) in outcome.activations {
            info!("Interactable {}: {:?}", entity, activation);
        }

        self.world.step();

        for explosion in self.projectiles.update(&mut self.world, dt) {
            info!(
                "Projectile {} exploded at {:?}, destroyed {:?}",
                explosion.projectile, explosion.position, explosion.destroyed
            );
            self.explosions += 1;
        }

        self.registry.update(&mut self.world, dt);

        let focus = self.player_position() + Vec3::Y * EYE_HEIGHT;
        self.camera.update(focus, Some(&self.world), dt);
    }
}

/// Command line options
#[derive(Debug, Default)]
struct Args {
    /// Settings file to use instead of the default location
    settings: Option<PathBuf>,
    /// Write the effective settings back out before running
    write_settings: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--settings" => {
                let path = args.next().context("--settings expects a path")?;
                parsed.settings = Some(PathBuf::from(path));
            }
            "--write-settings" => parsed.write_settings = true,
            other => anyhow::bail!("Unknown argument: {}", other),
        }
    }
    Ok(parsed)
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting Emberfall sandbox");

    let args = parse_args()?;
    let settings = Settings::load(args.settings.as_deref());
    settings.validate()?;
    if args.write_settings {
        settings.save(args.settings.as_deref())?;
    }

    let mut sandbox = Sandbox::new(&settings)?;
    let mut time = GameTime::new(settings.simulation.time.clone());
    let fixed_dt = settings.simulation.time.fixed_timestep;
    let total_steps = settings.simulation.total_steps();

    let mut step = 0;
    while step < total_steps {
        time.update(fixed_dt);
        for _ in 0..time.fixed_steps() {
            sandbox.apply_script(step);
            sandbox.fixed_update(time.total_time, fixed_dt);
            step += 1;
        }
    }

    info!(
        "Finished after {} steps ({:.2}s): player at {:?}, target {:?}, {} explosions, {} projectiles in flight, {} entities left",
        step,
        time.total_time,
        sandbox.player_position(),
        sandbox.player.current_target(),
        sandbox.explosions,
        sandbox.projectiles.len(),
        sandbox.world.entity_count()
    );

    Ok(())
}
