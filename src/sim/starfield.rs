//! Scrolling star field behind the action
//!
//! Purely decorative; it never affects gameplay, but it draws from the run's
//! RNG so replays stay identical.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Playfield;
use crate::rand_between;

/// Per-level star field parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StarfieldConfig {
    pub count: usize,
    /// Base fall speed (pixels per tick), jittered per star
    pub base_speed: f32,
    /// Base trail length, jittered per star
    pub trail_base: f32,
    /// Fraction of the player's speed added to every star
    pub player_influence: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            count: 60,
            base_speed: 0.4,
            trail_base: 3.0,
            player_influence: 0.01,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub base_speed: f32,
    pub trail_base: f32,
    pub vy: f32,
}

impl Star {
    fn random<R: Rng + ?Sized>(config: &StarfieldConfig, pos: Vec2, rng: &mut R) -> Self {
        let base_speed = config.base_speed * rand_between(rng, 0.6, 1.5);
        let trail_base = config.trail_base * rand_between(rng, 0.6, 1.5);
        Self {
            pos,
            size: rand_between(rng, 0.6, 2.2),
            base_speed,
            trail_base,
            vy: base_speed,
        }
    }

    /// Streak length behind the star, longer when falling faster
    pub fn trail_length(&self) -> f32 {
        let speed_factor = (self.vy / 0.6).min(2.5);
        (self.trail_base * (0.8 + 0.6 * speed_factor) + self.vy * 0.6).max(3.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Starfield {
    pub config: StarfieldConfig,
    pub stars: Vec<Star>,
}

impl Starfield {
    /// Scatter `config.count` stars over the whole field
    pub fn new<R: Rng + ?Sized>(config: StarfieldConfig, field: &Playfield, rng: &mut R) -> Self {
        let stars = (0..config.count)
            .map(|_| {
                let pos = Vec2::new(
                    rand_between(rng, 0.0, field.width),
                    rand_between(rng, 0.0, field.height),
                );
                Star::random(&config, pos, rng)
            })
            .collect();
        Self { config, stars }
    }

    /// Fall one tick; stars below the field respawn just above it
    pub fn update<R: Rng + ?Sized>(&mut self, player_speed: f32, field: &Playfield, rng: &mut R) {
        let extra = player_speed * self.config.player_influence;
        for star in &mut self.stars {
            star.vy = star.base_speed + extra;
            star.pos.y += star.vy;

            if star.pos.y > field.height + 10.0 {
                let x = rand_between(rng, 0.0, field.width);
                let pos = Vec2::new(x, -10.0 - rand_between(rng, 0.0, 20.0));
                *star = Star::random(&self.config, pos, rng);
            }
        }
    }
}
