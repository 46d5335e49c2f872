//! Runtime settings
//!
//! Playfield, player and pacing knobs, stored as JSON next to the binary.
//! Missing fields take their defaults so older files keep loading.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::levels::ConfigError;
use crate::sim::geometry::Playfield;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Playfield ===
    pub field_width: f32,
    pub field_height: f32,

    // === Player ===
    pub initial_lives: u32,
    pub player_size: f32,
    /// Pixels per tick
    pub player_speed: f32,
    pub fire_cooldown_ms: f64,
    /// Pixels per tick
    pub player_shot_speed: f32,
    /// Sprite handle from the asset loader; the ship cannot be built without it
    pub player_sprite: Option<String>,

    // === Pacing ===
    /// Input is ignored this long after GameOver/Victory
    pub end_cooldown_ms: f64,
    /// Run seed for reproducibility
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,

            initial_lives: INITIAL_LIVES,
            player_size: PLAYER_SIZE,
            player_speed: PLAYER_SPEED,
            fire_cooldown_ms: PLAYER_FIRE_COOLDOWN_MS,
            player_shot_speed: PLAYER_SHOT_SPEED,
            player_sprite: Some("vaisseau".to_string()),

            end_cooldown_ms: END_COOLDOWN_MS,
            seed: 0x5EED,
        }
    }
}

impl Settings {
    pub fn playfield(&self) -> Playfield {
        Playfield::new(self.field_width, self.field_height)
    }

    /// Centered horizontally, lifted off the bottom edge
    pub fn player_start(&self) -> Vec2 {
        Vec2::new(self.field_width / 2.0, self.field_height - PLAYER_START_LIFT)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read settings from `path`, reporting what went wrong
    pub fn try_load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::info!("Using default settings ({})", err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.playfield(), Playfield::new(500.0, 500.0));
        assert_eq!(settings.player_start(), Vec2::new(250.0, 450.0));
        assert_eq!(settings.initial_lives, 3);
        assert_eq!(settings.player_sprite.as_deref(), Some("vaisseau"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "field_width": 800, "seed": 7 }"#).unwrap();
        assert_eq!(settings.field_width, 800.0);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.field_height, 500.0);
        assert_eq!(settings.player_speed, 5.0);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = std::env::temp_dir().join("skyward-settings-does-not-exist.json");
        assert!(matches!(Settings::try_load(&path), Err(ConfigError::Io { .. })));
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path =
            std::env::temp_dir().join(format!("skyward-settings-{}.json", std::process::id()));
        let settings = Settings {
            initial_lives: 5,
            player_sprite: Some("ship".into()),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }
}
