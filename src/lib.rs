//! Skyward - vertical-scrolling arcade shooter core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, enemy behavior, collisions, run state)
//! - `levels`: Data-driven level configuration
//! - `input`: Input snapshot, key events and the end-of-run restart gate
//! - `session`: Fixed timestep driver around the simulation
//! - `settings`: Runtime configuration

pub mod input;
pub mod levels;
pub mod session;
pub mod settings;
pub mod sim;

pub use input::{InputSnapshot, Key, KeyEvent, RestartGate};
pub use levels::{ConfigError, LevelConfig, LevelTable};
pub use session::Session;
pub use settings::Settings;

use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed timestep in milliseconds of simulation clock
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default playfield dimensions
    pub const FIELD_WIDTH: f32 = 500.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    /// Distance of the player's start position above the bottom edge
    pub const PLAYER_START_LIFT: f32 = 50.0;
    pub const INITIAL_LIVES: u32 = 3;

    /// Projectile defaults (both owners share the hitbox)
    pub const SHOT_WIDTH: f32 = 6.0;
    pub const SHOT_HEIGHT: f32 = 12.0;
    pub const PLAYER_SHOT_SPEED: f32 = 6.0;
    pub const PLAYER_FIRE_COOLDOWN_MS: f64 = 250.0;
    /// Gap between a shooter's hull and its projectile's center
    pub const SHOT_MUZZLE_GAP: f32 = 6.0;
    pub const PLAYER_SHOT_COLOR: &str = "yellow";

    /// Input is ignored for this long after GameOver/Victory
    pub const END_COOLDOWN_MS: f64 = 800.0;

    /// Formation member spacing as a multiple of enemy size
    pub const FORMATION_GAP_FACTOR: f32 = 1.2;
    /// Members in a line formation
    pub const LINE_FORMATION_COUNT: usize = 5;
}

/// Uniform draw between `min` and `max`; equal or inverted bounds never panic
#[inline]
pub fn rand_between<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

/// `rand_between` on the millisecond clock scale
#[inline]
pub fn rand_between_ms<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    min + rng.random::<f64>() * (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_rand_between_stays_in_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..1000 {
            let v = rand_between(&mut rng, 1.3, 2.3);
            assert!((1.3..=2.3).contains(&v));
        }
        assert_eq!(rand_between(&mut rng, 4.0, 4.0), 4.0);
    }
}
