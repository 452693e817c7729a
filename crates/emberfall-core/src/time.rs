//! Time system for emberfall
//!
//! Handles the frame clock, fixed timestep accumulation, and one-shot cooldown timers
//! compared against the monotonic game clock.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Configuration for game time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// How many in-game seconds pass per real second
    pub time_scale: f32,
    /// Fixed timestep for simulation (in seconds)
    pub fixed_timestep: f32,
    /// Maximum delta time to prevent spiral of death
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            fixed_timestep: 1.0 / 60.0,
            max_delta_time: 0.25,
        }
    }
}

impl TimeConfig {
    /// All three must be positive, otherwise the fixed-step accumulator never fills
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::positive("time.time_scale", self.time_scale)?;
        ConfigError::positive("time.fixed_timestep", self.fixed_timestep)?;
        ConfigError::positive("time.max_delta_time", self.max_delta_time)
    }
}

/// Game time tracking
#[derive(Debug, Clone)]
pub struct GameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Time since game start in seconds, never decreases
    pub total_time: f64,
    /// Delta time for this frame (clamped)
    pub delta_time: f32,
    /// Unscaled delta time
    pub unscaled_delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
    /// Accumulated time for fixed timestep
    fixed_accumulator: f32,
}

impl Default for GameTime {
    fn default() -> Self {
        Self {
            config: TimeConfig::default(),
            total_time: 0.0,
            delta_time: 0.0,
            unscaled_delta_time: 0.0,
            frame_count: 0,
            fixed_accumulator: 0.0,
        }
    }
}

impl GameTime {
    /// Create a new game time with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Update the game time with the raw delta from the previous frame
    pub fn update(&mut self, raw_delta: f32) {
        self.unscaled_delta_time = raw_delta.clamp(0.0, self.config.max_delta_time.max(0.0));
        self.frame_count += 1;

        self.delta_time = self.unscaled_delta_time * self.config.time_scale;
        self.total_time += self.delta_time as f64;
        self.fixed_accumulator += self.delta_time;
    }

    /// Get the number of fixed timesteps to process this frame
    pub fn fixed_steps(&mut self) -> u32 {
        let mut steps = 0;
        while self.fixed_accumulator >= self.config.fixed_timestep {
            self.fixed_accumulator -= self.config.fixed_timestep;
            steps += 1;
        }
        steps
    }
}

/// Single-shot expiring timer.
///
/// Armed with [`Cooldown::start`] and checked with [`Cooldown::poll`] against a
/// monotonic clock. Arming while already armed is refused, so expiries never stack,
/// and each arming reports its expiry exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Cooldown {
    duration: f64,
    expires_at: Option<f64>,
}

impl Cooldown {
    /// Create an idle cooldown of the given length in seconds
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            expires_at: None,
        }
    }

    /// Arm the timer. Returns `false` (and changes nothing) if it is already running.
    pub fn start(&mut self, now: f64) -> bool {
        if self.expires_at.is_some() {
            return false;
        }
        self.expires_at = Some(now + self.duration);
        true
    }

    /// Whether the timer is armed and has not yet been reported as expired
    pub fn is_running(&self) -> bool {
        self.expires_at.is_some()
    }

    /// Seconds left before expiry, zero when idle
    pub fn remaining(&self, now: f64) -> f64 {
        self.expires_at.map_or(0.0, |at| (at - now).max(0.0))
    }

    /// Returns `true` exactly once, on the first poll at or after expiry, then disarms
    pub fn poll(&mut self, now: f64) -> bool {
        match self.expires_at {
            Some(at) if now >= at => {
                self.expires_at = None;
                true
            }
            _ => false,
        }
    }
}
