//! Enemy spawn scheduling
//!
//! Decides when, where, what and how many enemies enter the field, within a
//! level's concurrency cap and total quota.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::geometry::Playfield;
use super::state::RunState;
use crate::levels::{Archetype, Edge, Formation, LevelConfig, SpawnConfig};
use crate::{rand_between, rand_between_ms};

/// Spawner bookkeeping for the current level
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnState {
    /// Enemies created so far this level
    pub spawned: u32,
    /// Clock time (ms) of the next permitted batch
    pub next_spawn_at: f64,
}

impl SpawnState {
    /// State for a level (re)starting at `now`
    pub fn new(level: &LevelConfig, now: f64) -> Self {
        Self {
            spawned: 0,
            next_spawn_at: now + level.spawn.initial_delay_ms,
        }
    }

    /// True once a bounded quota has been fully spawned
    pub fn quota_met(&self, spawn: &SpawnConfig) -> bool {
        spawn.total_to_spawn.is_some_and(|total| self.spawned >= total)
    }
}

/// Anything selectable by relative weight
pub trait Weighted {
    fn weight(&self) -> f64;
}

/// Cumulative-weight selection.
///
/// Draws `r` in `(0, total]` and subtracts each weight in turn; the first
/// item taking `r` to zero or below wins. Rounding can leave `r` marginally
/// positive after the last item, so the last item is also the fallback, as
/// it is for an all-zero list. Returns `None` only for an empty list.
pub fn pick_weighted<'a, T: Weighted, R: Rng + ?Sized>(
    items: &'a [T],
    rng: &mut R,
) -> Option<&'a T> {
    let last = items.last()?;
    let total: f64 = items.iter().map(|item| item.weight().max(0.0)).sum();
    if total <= 0.0 {
        return Some(last);
    }

    let mut r = (1.0 - rng.random::<f64>()) * total;
    for item in items {
        r -= item.weight().max(0.0);
        if r <= 0.0 {
            return Some(item);
        }
    }
    Some(last)
}

/// Advance the spawner by one tick. Returns the number of enemies created.
pub fn update_spawning(state: &mut RunState, level: &LevelConfig, now: f64) -> u32 {
    let config = &level.spawn;
    if state.spawn.quota_met(config) {
        return 0;
    }

    let alive = state.enemies.len();
    if alive >= config.max_alive {
        return 0;
    }
    let available = config.max_alive - alive;
    let remaining = match config.total_to_spawn {
        Some(total) => total.saturating_sub(state.spawn.spawned) as usize,
        None => available,
    };
    let max_now = available.min(remaining);
    if max_now == 0 || now < state.spawn.next_spawn_at {
        return 0;
    }

    let created = spawn_batch(state, level, max_now, now);
    state.spawn.spawned += created;

    let (min, max) = config.interval_ms;
    state.spawn.next_spawn_at = now + rand_between_ms(&mut state.rng, min, max);
    created
}

/// Create up to `limit` enemies from one spawn event
fn spawn_batch(state: &mut RunState, level: &LevelConfig, limit: usize, now: f64) -> u32 {
    let Some(archetype) = pick_archetype(level, &mut state.rng) else {
        log::warn!("Level {} has no enemy archetype, skipping spawn", state.level);
        return 0;
    };
    let edges = &level.spawn.edges;
    if edges.is_empty() {
        log::warn!("Level {} has no spawn edges, skipping spawn", state.level);
        return 0;
    }
    let edge = edges[state.rng.random_range(0..edges.len())];

    let field = state.field;
    let base = spawn_position(edge, archetype.size, &field, &mut state.rng);
    let positions = formation_positions(level, archetype, base, edge, &field, &mut state.rng);

    let mut created = 0;
    for pos in positions.into_iter().take(limit) {
        let (vel, speed) = spawn_velocity(edge, &level.spawn, &mut state.rng);
        let id = state.next_entity_id();
        let enemy = Enemy::spawn(id, pos, vel, speed, archetype, now, &mut state.rng);
        state.enemies.push(enemy);
        created += 1;
    }
    log::debug!("Spawned {} enemies from {:?} at t={:.0}ms", created, edge, now);
    created
}

/// The level's single archetype, or a weighted pick from its mix
pub fn pick_archetype<'a, R: Rng + ?Sized>(
    level: &'a LevelConfig,
    rng: &mut R,
) -> Option<&'a Archetype> {
    if !level.enemy_mix.is_empty() {
        return pick_weighted(&level.enemy_mix, rng).map(|entry| &entry.enemy);
    }
    level.enemy.as_ref()
}

/// Base point just outside `edge`, random along the edge
pub fn spawn_position<R: Rng + ?Sized>(
    edge: Edge,
    size: f32,
    field: &Playfield,
    rng: &mut R,
) -> Vec2 {
    let margin = size / 2.0;
    match edge {
        Edge::Top => Vec2::new(rand_between(rng, margin, field.width - margin), -margin),
        Edge::Bottom => Vec2::new(
            rand_between(rng, margin, field.width - margin),
            field.height + margin,
        ),
        Edge::Left => Vec2::new(-margin, rand_between(rng, margin, field.height - margin)),
        Edge::Right => Vec2::new(
            field.width + margin,
            rand_between(rng, margin, field.height - margin),
        ),
    }
}

/// Member positions for one spawn event. Formations only apply to enemies
/// entering from the top; members are kept inside the horizontal bounds.
pub fn formation_positions<R: Rng + ?Sized>(
    level: &LevelConfig,
    archetype: &Archetype,
    base: Vec2,
    edge: Edge,
    field: &Playfield,
    rng: &mut R,
) -> Vec<Vec2> {
    if edge != Edge::Top {
        return vec![base];
    }
    let formation = pick_weighted(&level.spawn.formations, rng)
        .map(|entry| entry.kind)
        .unwrap_or(Formation::Single);

    let margin = archetype.size / 2.0;
    formation
        .offsets(archetype.size)
        .into_iter()
        .map(|offset| Vec2::new(field.clamp_x(base.x + offset.x, margin), base.y + offset.y))
        .collect()
}

/// Inward base speed plus perpendicular drift. Returns the velocity and
/// the base speed drawn.
pub fn spawn_velocity<R: Rng + ?Sized>(
    edge: Edge,
    config: &SpawnConfig,
    rng: &mut R,
) -> (Vec2, f32) {
    let speed = rand_between(rng, config.speed.0, config.speed.1);
    let drift = match edge {
        Edge::Top | Edge::Bottom => {
            Vec2::new(rand_between(rng, config.drift_x.0, config.drift_x.1), 0.0)
        }
        Edge::Left | Edge::Right => {
            Vec2::new(0.0, rand_between(rng, config.drift_y.0, config.drift_y.1))
        }
    };
    (edge.inward() * speed + drift, speed)
}
