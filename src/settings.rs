//! Demo settings with persistence
//!
//! Settings are saved to `~/.config/emberfall/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use emberfall_core::TimeConfig;
use emberfall_game::{CameraConfig, DoorConfig, PlayerConfig};
use emberfall_physics::CharacterBodyConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All demo settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub player: PlayerConfig,
    pub character: CharacterBodyConfig,
    pub camera: CameraConfig,
    /// The demo door driven by the lever
    pub door: DoorConfig,
    pub simulation: SimulationSettings,
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("emberfall"))
    }

    /// Get the default settings file path
    pub fn default_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from `path` (or the default location), falling back to defaults
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let Some(path) = Self::default_path() else {
                    warn!("Could not determine config directory");
                    return Self::default();
                };
                path
            }
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<Settings>(&content) {
                Ok(settings) => {
                    info!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read settings file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Save settings to `path` (or the default location)
    pub fn save(&self, path: Option<&Path>) -> anyhow::Result<PathBuf> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path().context("Could not determine config directory")?,
        };

        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }

    /// Check every tunable before building the scene
    pub fn validate(&self) -> anyhow::Result<()> {
        self.player.validate().context("Invalid player settings")?;
        self.character.validate().context("Invalid character settings")?;
        self.camera.validate().context("Invalid camera settings")?;
        self.door.validate().context("Invalid door settings")?;
        self.simulation
            .time
            .validate()
            .context("Invalid simulation.time settings")?;
        anyhow::ensure!(
            self.simulation.duration_seconds >= 0.0,
            "simulation.duration_seconds must not be negative"
        );
        Ok(())
    }
}

/// Headless simulation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Clock configuration
    pub time: TimeConfig,
    /// How long the scripted demo runs, in simulated seconds
    pub duration_seconds: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            time: TimeConfig::default(),
            duration_seconds: 5.0,
        }
    }
}

impl SimulationSettings {
    /// Number of fixed steps the demo runs
    pub fn total_steps(&self) -> u32 {
        (self.duration_seconds / self.time.fixed_timestep).round() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.simulation.total_steps(), 300);
    }

    #[test]
    fn test_save_then_load() {
        let dir = std::env::temp_dir().join(format!("emberfall-settings-{}", uuid::Uuid::new_v4()));
        let path = dir.join("settings.toml");

        let mut settings = Settings::default();
        settings.player.movement.jump_speed = 7.5;
        settings.simulation.duration_seconds = 2.0;
        settings.save(Some(&path)).unwrap();

        let loaded = Settings::load(Some(&path));
        assert_eq!(loaded.player.movement.jump_speed, 7.5);
        assert_eq!(loaded.simulation.duration_seconds, 2.0);

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings: Settings = toml::from_str(
            "[player.attack]\nmagic_force = 35.0\n\n[simulation]\nduration_seconds = 1.0\n",
        )
        .unwrap();
        assert_eq!(settings.player.attack.magic_force, 35.0);
        assert_eq!(settings.player.attack.cooldown_seconds, 1.0);
        assert_eq!(settings.simulation.total_steps(), 60);
    }

    #[test]
    fn test_unparsable_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("emberfall-settings-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        fs::write(&path, "player = 3").unwrap();

        let settings = Settings::load(Some(&path));
        assert_eq!(settings.player, PlayerConfig::default());

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_clock_that_never_advances_is_rejected() {
        let settings: Settings =
            toml::from_str("[simulation.time]\ntime_scale = 1.0\nfixed_timestep = 0.016\nmax_delta_time = 0.0\n")
                .unwrap();
        assert!(settings.validate().is_err());

        let settings: Settings =
            toml::from_str("[simulation.time]\ntime_scale = 1.0\nfixed_timestep = 0.016\nmax_delta_time = -1.0\n")
                .unwrap();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.simulation.time.time_scale = 0.0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut settings = Settings::default();
        settings.player.movement.max_fall_speed = -1.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.character.radius = -0.4;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.door.rotation_speed = 0.0;
        assert!(settings.validate().is_err());
    }
}
