//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod enemy;
pub mod entity;
pub mod geometry;
pub mod level;
pub mod spawn;
pub mod starfield;
pub mod state;
pub mod tick;
pub mod view;

pub use collision::{Resolution, resolve};
pub use enemy::{Enemy, Homing, Motion, Shooter, Zigzag};
pub use entity::{InitError, Owner, Player, Projectile, Visual};
pub use geometry::{
    Playfield, Rect, circle_rect_overlap, circle_rect_overlap_centered, circles_overlap,
    rects_overlap, rects_overlap_centered,
};
pub use level::{Outcome, check_progression, end_run, lose_life, start_level, start_run};
pub use spawn::{SpawnState, Weighted, pick_weighted, update_spawning};
pub use starfield::{Star, Starfield, StarfieldConfig};
pub use state::{GameEvent, Mode, RunState};
pub use tick::{TickInput, autopilot_keys, tick};
pub use view::{DrawItem, DrawList, Hud, draw_list};
