//! Player ship, projectiles and the visual tags handed to renderers

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Playfield;
use crate::consts::*;
use crate::input::InputSnapshot;
use crate::settings::Settings;

/// How a renderer should draw an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum Visual {
    Triangle { color: String },
    Square { color: String },
    Circle { color: String },
    Sprite { name: String },
}

impl Visual {
    pub fn sprite(name: impl Into<String>) -> Self {
        Visual::Sprite { name: name.into() }
    }

    pub fn square(color: impl Into<String>) -> Self {
        Visual::Square {
            color: color.into(),
        }
    }
}

/// Failures that leave the core unable to start a run
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// The asset loader never provided the player's sprite
    #[error("player ship requires a sprite, none was provided")]
    MissingPlayerSprite,
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy { id: u32 },
}

/// A shot traveling vertically. The sign of `vel_y` is its direction
/// (negative = up the screen).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel_y: f32,
    pub active: bool,
    pub owner: Owner,
    pub visual: Visual,
}

impl Projectile {
    pub fn new(pos: Vec2, vel_y: f32, owner: Owner, color: &str) -> Self {
        Self {
            pos,
            size: Vec2::new(SHOT_WIDTH, SHOT_HEIGHT),
            vel_y,
            active: true,
            owner,
            visual: Visual::square(color),
        }
    }

    /// Move one tick; deactivates once fully past the edge it travels toward
    pub fn advance(&mut self, field: &Playfield) {
        self.pos.y += self.vel_y;
        if self.has_left(field) {
            self.active = false;
        }
    }

    pub fn has_left(&self, field: &Playfield) -> bool {
        let half = self.size.y / 2.0;
        if self.vel_y < 0.0 {
            self.pos.y + half < 0.0
        } else if self.vel_y > 0.0 {
            self.pos.y - half > field.height
        } else {
            false
        }
    }
}

/// The player's ship. Collides as a circle of radius `size.x / 2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels per tick
    pub speed: f32,
    pub visual: Visual,
    pub shot_speed: f32,
    pub fire_cooldown_ms: f64,
    last_shot_at: Option<f64>,
}

impl Player {
    /// Build the ship. A missing or blank sprite name is a broken asset
    /// pipeline, not something the core can recover from.
    pub fn new(pos: Vec2, size: f32, speed: f32, sprite: Option<&str>) -> Result<Self, InitError> {
        let name = sprite
            .filter(|name| !name.trim().is_empty())
            .ok_or(InitError::MissingPlayerSprite)?;
        Ok(Self {
            pos,
            size: Vec2::splat(size),
            speed,
            visual: Visual::sprite(name),
            shot_speed: PLAYER_SHOT_SPEED,
            fire_cooldown_ms: PLAYER_FIRE_COOLDOWN_MS,
            last_shot_at: None,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, InitError> {
        let mut player = Self::new(
            settings.player_start(),
            settings.player_size,
            settings.player_speed,
            settings.player_sprite.as_deref(),
        )?;
        player.shot_speed = settings.player_shot_speed;
        player.fire_cooldown_ms = settings.fire_cooldown_ms;
        Ok(player)
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.size.x / 2.0
    }

    /// Put the ship back at `pos` with its gun ready
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.last_shot_at = None;
    }

    /// Apply one tick of held keys. Returns the shot fired this tick, if any.
    pub fn update_from_input(
        &mut self,
        keys: &InputSnapshot,
        field: &Playfield,
        now: f64,
    ) -> Option<Projectile> {
        let radius = self.radius();
        let mut dir = Vec2::ZERO;
        if keys.left {
            dir.x -= 1.0;
        }
        if keys.right {
            dir.x += 1.0;
        }
        if keys.up {
            dir.y -= 1.0;
        }
        if keys.down {
            dir.y += 1.0;
        }
        let next = self.pos + dir * self.speed;
        self.pos = Vec2::new(field.clamp_x(next.x, radius), field.clamp_y(next.y, radius));

        if keys.fire { self.try_fire(now) } else { None }
    }

    fn try_fire(&mut self, now: f64) -> Option<Projectile> {
        if let Some(last) = self.last_shot_at {
            if now - last < self.fire_cooldown_ms {
                return None;
            }
        }
        self.last_shot_at = Some(now);
        let muzzle = Vec2::new(self.pos.x, self.pos.y - self.size.y / 2.0 - SHOT_MUZZLE_GAP);
        Some(Projectile::new(
            muzzle,
            -self.shot_speed.abs(),
            Owner::Player,
            PLAYER_SHOT_COLOR,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> Playfield {
        Playfield::new(500.0, 500.0)
    }

    fn ship() -> Player {
        Player::new(Vec2::new(250.0, 450.0), 32.0, 5.0, Some("vaisseau")).unwrap()
    }

    #[test]
    fn test_player_requires_sprite() {
        assert!(matches!(
            Player::new(Vec2::ZERO, 32.0, 5.0, None),
            Err(InitError::MissingPlayerSprite)
        ));
        assert!(Player::new(Vec2::ZERO, 32.0, 5.0, Some("  ")).is_err());
    }

    #[test]
    fn test_player_moves_and_stays_in_bounds() {
        let mut player = ship();
        let keys = InputSnapshot {
            left: true,
            ..Default::default()
        };
        player.update_from_input(&keys, &field(), 0.0);
        assert_eq!(player.pos.x, 245.0);

        for _ in 0..200 {
            player.update_from_input(&keys, &field(), 0.0);
        }
        assert_eq!(player.pos.x, player.radius());

        let down = InputSnapshot {
            down: true,
            ..Default::default()
        };
        for _ in 0..50 {
            player.update_from_input(&down, &field(), 0.0);
        }
        assert_eq!(player.pos.y, 500.0 - player.radius());
    }

    #[test]
    fn test_fire_respects_cooldown() {
        let mut player = ship();
        let fire = InputSnapshot {
            fire: true,
            ..Default::default()
        };
        let shot = player.update_from_input(&fire, &field(), 0.0).unwrap();
        assert!(shot.vel_y < 0.0);
        assert_eq!(shot.owner, Owner::Player);
        assert!(shot.pos.y < player.pos.y);

        assert!(player.update_from_input(&fire, &field(), 100.0).is_none());
        assert!(player.update_from_input(&fire, &field(), 250.0).is_some());
    }

    #[test]
    fn test_projectile_leaves_in_travel_direction() {
        let field = field();
        let mut up = Projectile::new(Vec2::new(10.0, 3.0), -6.0, Owner::Player, "yellow");
        up.advance(&field);
        assert!(up.active); // center -3, bottom edge still visible
        up.advance(&field);
        assert!(!up.active);

        let mut down = Projectile::new(Vec2::new(10.0, 500.0), 4.0, Owner::Enemy { id: 1 }, "red");
        down.advance(&field);
        assert!(down.active);
        down.advance(&field);
        assert!(!down.active);
    }
}
