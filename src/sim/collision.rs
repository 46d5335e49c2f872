//! Collision resolution pass
//!
//! Runs once per tick after everything has moved. Off-screen exits are
//! settled first, then the three overlap checks run in a fixed order:
//! player shots against enemies, enemies against the player, enemy shots
//! against the player. Removals are marked during iteration and compacted
//! once, so indices never shift under a loop.

use glam::Vec2;

use super::enemy::Enemy;
use super::geometry::{Playfield, circle_rect_overlap_centered};
use super::level::lose_life;
use super::state::{GameEvent, RunState};
use crate::levels::{Edge, LevelConfig};

/// What one pass did, mostly for tests and logging
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Enemies destroyed by player shots
    pub kills: u32,
    /// Enemies that left through a penalized edge
    pub escapes: u32,
    /// Enemies that left through a neutral edge
    pub despawns: u32,
    /// Collisions that cost the player a life
    pub player_hits: u32,
}

/// Resolve exits and collisions for the current tick
pub fn resolve(state: &mut RunState, level: &LevelConfig) -> Resolution {
    let mut report = Resolution::default();

    remove_offscreen(state, level, &mut report);
    state.player_shots.retain(|shot| shot.active);
    state.enemy_shots.retain(|shot| shot.active);

    shots_vs_enemies(state, level, &mut report);
    enemies_vs_player(state, &mut report);
    enemy_shots_vs_player(state, &mut report);

    report
}

/// Edges an enemy has fully left through, in Bottom, Top, Left, Right
/// order. A corner exit crosses two.
///
/// The field is expanded by the enemy's larger dimension so enemies that
/// spawn just outside an edge are not culled before they enter.
pub fn exit_edges(pos: Vec2, size: Vec2, field: &Playfield) -> Vec<Edge> {
    let margin = size.max_element();
    let crossed = [
        (Edge::Bottom, pos.y > field.height + margin),
        (Edge::Top, pos.y < -margin),
        (Edge::Left, pos.x < -margin),
        (Edge::Right, pos.x > field.width + margin),
    ];
    crossed
        .into_iter()
        .filter_map(|(edge, out)| out.then_some(edge))
        .collect()
}

fn remove_offscreen(state: &mut RunState, level: &LevelConfig, report: &mut Resolution) {
    let field = state.field;
    let mut exits: Vec<(u32, Vec<Edge>)> = Vec::new();
    state.enemies.retain(|enemy| {
        let edges = exit_edges(enemy.pos, enemy.size, &field);
        if edges.is_empty() {
            return true;
        }
        exits.push((enemy.id, edges));
        false
    });

    // Penalized when any crossed edge is an escape side
    let penalty = level.scoring.miss_penalty;
    for (id, edges) in exits {
        match edges.into_iter().find(|&edge| level.is_escape_side(edge)) {
            Some(edge) => {
                state.penalize(penalty);
                state.emit(GameEvent::EnemyEscaped { id, edge, penalty });
                report.escapes += 1;
            }
            None => report.despawns += 1,
        }
    }
}

fn shot_hits_enemy(shot_pos: Vec2, shot_size: Vec2, enemy: &Enemy) -> bool {
    circle_rect_overlap_centered(shot_pos, shot_size, enemy.pos, enemy.hit_radius())
}

/// Each enemy takes the first active shot touching it. A spent shot can't
/// hit again, so one shot removes at most one enemy.
fn shots_vs_enemies(state: &mut RunState, level: &LevelConfig, report: &mut Resolution) {
    let mut removed = vec![false; state.enemies.len()];
    let mut hit_ids = Vec::new();

    for (index, enemy) in state.enemies.iter().enumerate().rev() {
        let Some(shot) = state
            .player_shots
            .iter_mut()
            .find(|shot| shot.active && shot_hits_enemy(shot.pos, shot.size, enemy))
        else {
            continue;
        };
        shot.active = false;
        removed[index] = true;
        hit_ids.push(enemy.id);
    }
    if hit_ids.is_empty() {
        return;
    }

    let mut index = 0;
    state.enemies.retain(|_| {
        let keep = !removed[index];
        index += 1;
        keep
    });
    state.player_shots.retain(|shot| shot.active);

    let points = level.scoring.hit_points;
    for id in hit_ids {
        state.award(points);
        state.emit(GameEvent::EnemyHit { id, points });
        report.kills += 1;
    }
}

fn enemies_vs_player(state: &mut RunState, report: &mut Resolution) {
    let center = state.player.pos;
    let radius = state.player.radius();
    let before = state.enemies.len();
    state
        .enemies
        .retain(|enemy| !circle_rect_overlap_centered(enemy.pos, enemy.size, center, radius));

    for _ in state.enemies.len()..before {
        report.player_hits += 1;
        lose_life(state);
    }
}

fn enemy_shots_vs_player(state: &mut RunState, report: &mut Resolution) {
    let center = state.player.pos;
    let radius = state.player.radius();
    let before = state.enemy_shots.len();
    state
        .enemy_shots
        .retain(|shot| !circle_rect_overlap_centered(shot.pos, shot.size, center, radius));

    for _ in state.enemy_shots.len()..before {
        report.player_hits += 1;
        lose_life(state);
    }
}
