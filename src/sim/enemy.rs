//! Enemy entities and their per-tick behavior
//!
//! Each tick an enemy:
//! 1. bends its velocity toward the player (homing movers only),
//! 2. advances along its movement pattern,
//! 3. fires if it has a gun and the cooldown elapsed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::entity::{Owner, Projectile, Visual};
use crate::consts::SHOT_MUZZLE_GAP;
use crate::levels::{Archetype, Axis, MotionConfig};
use crate::rand_between;

/// Velocity steering toward a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Homing {
    /// Velocity added per tick along the unit vector to the target
    pub strength: f32,
    /// Speed is clamped to this after every adjustment
    pub speed_limit: f32,
}

impl Homing {
    /// New velocity after one steering step.
    ///
    /// A target sitting exactly on the enemy has no direction; the velocity
    /// is left untouched that tick.
    pub fn steer(&self, vel: Vec2, pos: Vec2, target: Vec2) -> Vec2 {
        let Some(dir) = (target - pos).try_normalize() else {
            return vel;
        };
        (vel + dir * self.strength).clamp_length_max(self.speed_limit)
    }
}

/// Sinusoidal weave around a linearly drifting base point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zigzag {
    pub amplitude: f32,
    /// Radians per tick
    pub frequency: f32,
    pub phase: f32,
    pub axis: Axis,
    /// Where the enemy would be without the weave
    pub base: Vec2,
}

impl Zigzag {
    /// Offset from the base line after `ticks` ticks
    pub fn offset(&self, ticks: u32) -> Vec2 {
        let angle = ticks as f32 * self.frequency + self.phase;
        self.axis.unit() * (self.amplitude * angle.sin())
    }
}

/// Closed set of movement patterns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    Straight { homing: Option<Homing> },
    Zigzag(Zigzag),
}

/// Gun state for enemies that shoot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shooter {
    pub cooldown_ms: f64,
    pub last_shot_at: f64,
    pub projectile_speed: f32,
    pub projectile_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Center position
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
    pub size: Vec2,
    pub visual: Visual,
    pub motion: Motion,
    pub shooter: Option<Shooter>,
    /// Ticks lived, drives the zigzag phase
    pub ticks: u32,
}

impl Enemy {
    /// Instantiate an archetype at `pos`.
    ///
    /// `base_speed` is the inward speed drawn at spawn; it doubles as the
    /// speed limit when the archetype sets none. Guns start cooled down from
    /// `now`, so a fresh enemy waits a full cooldown before firing.
    pub fn spawn<R: Rng + ?Sized>(
        id: u32,
        pos: Vec2,
        vel: Vec2,
        base_speed: f32,
        archetype: &Archetype,
        now: f64,
        rng: &mut R,
    ) -> Self {
        let motion = match archetype.motion {
            MotionConfig::Straight { homing_strength } => Motion::Straight {
                homing: (homing_strength > 0.0).then(|| Homing {
                    strength: homing_strength,
                    speed_limit: archetype.speed_limit.unwrap_or(base_speed),
                }),
            },
            MotionConfig::Zigzag {
                amplitude,
                frequency,
                phase,
                axis,
            } => Motion::Zigzag(Zigzag {
                amplitude,
                frequency,
                phase: phase.unwrap_or_else(|| rand_between(rng, 0.0, std::f32::consts::TAU)),
                axis,
                base: pos,
            }),
        };
        let shooter = archetype.shooter.as_ref().map(|gun| Shooter {
            cooldown_ms: gun.cooldown_ms,
            last_shot_at: now,
            projectile_speed: gun.projectile_speed,
            projectile_color: gun.projectile_color.clone(),
        });

        Self {
            id,
            pos,
            vel,
            size: Vec2::splat(archetype.size),
            visual: archetype.visual.clone(),
            motion,
            shooter,
            ticks: 0,
        }
    }

    /// Radius used when projectiles test against this enemy
    #[inline]
    pub fn hit_radius(&self) -> f32 {
        self.size.max_element() / 2.0
    }

    /// Run one behavior tick. `target` is the player's position, if any.
    /// Returns the projectile fired this tick.
    pub fn step(&mut self, target: Option<Vec2>, now: f64) -> Option<Projectile> {
        self.steer(target);
        self.advance();
        self.try_shoot(now)
    }

    fn steer(&mut self, target: Option<Vec2>) {
        if let (Motion::Straight { homing: Some(homing) }, Some(target)) = (&self.motion, target) {
            self.vel = homing.steer(self.vel, self.pos, target);
        }
    }

    fn advance(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        match &mut self.motion {
            Motion::Straight { .. } => self.pos += self.vel,
            Motion::Zigzag(zigzag) => {
                zigzag.base += self.vel;
                self.pos = zigzag.base + zigzag.offset(self.ticks);
            }
        }
    }

    fn try_shoot(&mut self, now: f64) -> Option<Projectile> {
        let gun = self.shooter.as_mut()?;
        if now - gun.last_shot_at < gun.cooldown_ms {
            return None;
        }
        gun.last_shot_at = now;

        // Enemies fire down toward the player's side of the field
        let muzzle = Vec2::new(self.pos.x, self.pos.y + self.size.y / 2.0 + SHOT_MUZZLE_GAP);
        Some(Projectile::new(
            muzzle,
            gun.projectile_speed.abs(),
            Owner::Enemy { id: self.id },
            &gun.projectile_color,
        ))
    }
}
