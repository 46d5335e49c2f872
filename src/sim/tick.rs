//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically.

use super::collision;
use super::level::{check_progression, start_run};
use super::spawn::update_spawning;
use super::state::{GameEvent, Mode, RunState};
use crate::input::{InputSnapshot, KeyEvent, RestartGate};
use crate::levels::LevelTable;

/// Input for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keys held during this tick
    pub keys: InputSnapshot,
    /// Keys physically down right now. Unlike `keys` this is never cleared
    /// on transitions, so a key held since the run started still counts.
    pub held: InputSnapshot,
    /// Press/release edges since the previous tick, in arrival order
    pub events: Vec<KeyEvent>,
    /// Demo mode - the autopilot flies the ship
    pub autopilot: bool,
}

/// Advance the run by one fixed timestep of `dt_ms` milliseconds
pub fn tick(state: &mut RunState, levels: &LevelTable, input: &TickInput, dt_ms: f64) {
    state.clock_ms += dt_ms;
    let now = state.clock_ms;

    // Outside a run only the restart gate listens
    if state.mode != Mode::Running {
        state.gate.poll(now);
        let mut start = false;
        for event in &input.events {
            if state.gate.observe(event) {
                start = true;
                break;
            }
        }
        if !start && input.autopilot && state.gate.is_ready() {
            start = true;
        }
        if start {
            start_run(state, levels);
            arm_restart_gate(state, input, now);
        }
        return;
    }

    let level = levels.get(state.level);
    let keys = if input.autopilot {
        autopilot_keys(state)
    } else {
        input.keys
    };

    // Player
    let before = state.player.pos;
    if let Some(shot) = state.player.update_from_input(&keys, &state.field, now) {
        state.player_shots.push(shot);
        state.emit(GameEvent::PlayerShot);
    }
    let moved = state.player.pos.distance(before);
    state.starfield.update(moved, &state.field, &mut state.rng);

    for shot in &mut state.player_shots {
        shot.advance(&state.field);
    }

    update_spawning(state, level, now);

    // Enemies (stable order by ID)
    let target = Some(state.player.pos);
    let mut fired = Vec::new();
    for enemy in &mut state.enemies {
        if let Some(shot) = enemy.step(target, now) {
            fired.push((enemy.id, shot));
        }
    }
    for (id, shot) in fired {
        state.enemy_shots.push(shot);
        state.emit(GameEvent::EnemyShot { id });
    }
    for shot in &mut state.enemy_shots {
        shot.advance(&state.field);
    }

    collision::resolve(state, level);
    check_progression(state, levels);

    arm_restart_gate(state, input, now);
    state.normalize_order();
}

/// Close the gate behind a run that ended this tick
fn arm_restart_gate(state: &mut RunState, input: &TickInput, now: f64) {
    if state.mode.is_finished() && state.gate == RestartGate::Active {
        // Physical keys decide whether a release must be seen first
        let key_held = input.keys.any_held() || input.held.any_held();
        state.gate = RestartGate::arm(now, state.end_cooldown_ms, key_held);
    }
}

/// Demo pilot: hold the start line, slide under the lowest enemy and fire
/// when lined up, sidestepping enemy shots about to land.
pub fn autopilot_keys(state: &RunState) -> InputSnapshot {
    let player = &state.player;
    let mut keys = InputSnapshot::default();

    let threat = state.enemy_shots.iter().find(|shot| {
        let dy = player.pos.y - shot.pos.y;
        dy > 0.0 && dy < 90.0 && (shot.pos.x - player.pos.x).abs() < player.size.x
    });
    if let Some(shot) = threat {
        if shot.pos.x >= player.pos.x {
            keys.left = true;
        } else {
            keys.right = true;
        }
    } else if let Some(enemy) = state
        .enemies
        .iter()
        .filter(|e| e.pos.y < player.pos.y)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        let dx = enemy.pos.x - player.pos.x;
        if dx > player.speed {
            keys.right = true;
        } else if dx < -player.speed {
            keys.left = true;
        }
        keys.fire = dx.abs() < enemy.hit_radius().max(player.radius());
    }

    let drift = state.player_start.y - player.pos.y;
    if drift > player.speed {
        keys.down = true;
    } else if drift < -player.speed {
        keys.up = true;
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT_MS;
    use crate::input::Key;
    use crate::settings::Settings;
    use crate::sim::entity::{Owner, Projectile};
    use glam::Vec2;

    fn fresh(seed: u64) -> (RunState, LevelTable) {
        let levels = LevelTable::builtin();
        let settings = Settings {
            seed,
            ..Settings::default()
        };
        (RunState::new(&settings, &levels).unwrap(), levels)
    }

    fn start(state: &mut RunState, levels: &LevelTable) {
        let input = TickInput {
            events: vec![KeyEvent::press(Key::Fire, state.clock_ms)],
            ..Default::default()
        };
        tick(state, levels, &input, SIM_DT_MS);
    }

    #[test]
    fn test_tick_home_to_running() {
        let (mut state, levels) = fresh(12345);

        // No key - stays home
        tick(&mut state, &levels, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.mode, Mode::Home);

        start(&mut state, &levels);
        assert_eq!(state.mode, Mode::Running);
        assert_eq!(state.level, 1);
    }

    #[test]
    fn test_running_spawns_enemies() {
        let (mut state, levels) = fresh(7);
        start(&mut state, &levels);

        for _ in 0..120 {
            tick(&mut state, &levels, &TickInput::default(), SIM_DT_MS);
        }
        assert!(state.spawn.spawned >= 1);
        assert!(state.enemies.len() <= levels.get(1).spawn.max_alive);
        assert!(state.enemies.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_held_fire_shoots_and_moves_up() {
        let (mut state, levels) = fresh(1);
        start(&mut state, &levels);
        let input = TickInput {
            keys: InputSnapshot {
                fire: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut state, &levels, &input, SIM_DT_MS);
        assert_eq!(state.player_shots.len(), 1);
        assert!(state.drain_events().contains(&GameEvent::PlayerShot));

        let y = state.player_shots[0].pos.y;
        tick(&mut state, &levels, &input, SIM_DT_MS);
        assert!(state.player_shots[0].pos.y < y);
        // Cooldown still running, no second shot yet
        assert_eq!(state.player_shots.len(), 1);
    }

    #[test]
    fn test_restart_needs_release_then_cooldown() {
        let (mut state, levels) = fresh(3);
        start(&mut state, &levels);
        state.lives = 1;
        let at = state.player.pos;
        state
            .enemy_shots
            .push(Projectile::new(at, 0.0, Owner::Enemy { id: 99 }, "#FF0000"));

        // Fire is still held when the shot lands
        let held = TickInput {
            keys: InputSnapshot {
                fire: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut state, &levels, &held, SIM_DT_MS);
        assert_eq!(state.mode, Mode::GameOver);
        let died_at = state.clock_ms;
        assert!(matches!(state.gate, RestartGate::AwaitingRelease { .. }));

        // Presses are ignored until a release, even long after the cooldown
        let late = died_at + 5000.0;
        state.clock_ms = late;
        let press = TickInput {
            events: vec![KeyEvent::press(Key::Fire, late)],
            ..Default::default()
        };
        tick(&mut state, &levels, &press, SIM_DT_MS);
        assert_eq!(state.mode, Mode::GameOver);

        let release = TickInput {
            events: vec![KeyEvent::release(Key::Fire, state.clock_ms)],
            ..Default::default()
        };
        tick(&mut state, &levels, &release, SIM_DT_MS);
        assert!(state.gate.is_ready());

        start(&mut state, &levels);
        assert_eq!(state.mode, Mode::Running);
        assert_eq!(state.lives, 3);
        assert!(state.enemy_shots.is_empty());
    }

    #[test]
    fn test_physically_held_key_blocks_restart_after_input_clear() {
        let (mut state, levels) = fresh(5);
        start(&mut state, &levels);
        state.lives = 1;
        let at = state.player.pos;
        state
            .enemy_shots
            .push(Projectile::new(at, 0.0, Owner::Enemy { id: 99 }, "#FF0000"));

        // Gameplay snapshot was cleared at run start, the key is still down
        let input = TickInput {
            held: InputSnapshot {
                fire: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut state, &levels, &input, SIM_DT_MS);
        assert_eq!(state.mode, Mode::GameOver);
        assert!(matches!(state.gate, RestartGate::AwaitingRelease { .. }));
    }

    #[test]
    fn test_zero_lives_start_arms_the_gate() {
        let levels = LevelTable::builtin();
        let settings = Settings {
            initial_lives: 0,
            ..Settings::default()
        };
        let mut state = RunState::new(&settings, &levels).unwrap();
        let input = TickInput {
            events: vec![KeyEvent::press(Key::Fire, state.clock_ms)],
            held: InputSnapshot {
                fire: true,
                ..Default::default()
            },
            ..Default::default()
        };
        tick(&mut state, &levels, &input, SIM_DT_MS);
        assert_eq!(state.mode, Mode::GameOver);
        assert!(matches!(state.gate, RestartGate::AwaitingRelease { .. }));

        let release = TickInput {
            events: vec![KeyEvent::release(Key::Fire, state.clock_ms + 5000.0)],
            ..Default::default()
        };
        tick(&mut state, &levels, &release, SIM_DT_MS);
        assert!(state.gate.is_ready());
    }

    #[test]
    fn test_restart_waits_for_cooldown_without_held_keys() {
        let (mut state, levels) = fresh(4);
        start(&mut state, &levels);
        state.lives = 1;
        let at = state.player.pos;
        state
            .enemy_shots
            .push(Projectile::new(at, 0.0, Owner::Enemy { id: 99 }, "#FF0000"));
        tick(&mut state, &levels, &TickInput::default(), SIM_DT_MS);
        assert_eq!(state.mode, Mode::GameOver);

        // Inside the cooldown window
        start(&mut state, &levels);
        assert_eq!(state.mode, Mode::GameOver);

        for _ in 0..60 {
            tick(&mut state, &levels, &TickInput::default(), SIM_DT_MS);
        }
        start(&mut state, &levels);
        assert_eq!(state.mode, Mode::Running);
    }

    #[test]
    fn test_autopilot_lines_up_under_enemy() {
        let (mut state, levels) = fresh(5);
        start(&mut state, &levels);
        let archetype = levels.get(1).enemy.clone().unwrap();
        let id = state.next_entity_id();
        let mut rng = rand_pcg::Pcg32::new(1, 1);
        let enemy = crate::sim::enemy::Enemy::spawn(
            id,
            Vec2::new(100.0, 200.0),
            Vec2::ZERO,
            0.0,
            &archetype,
            state.clock_ms,
            &mut rng,
        );
        state.enemies.push(enemy);

        let keys = autopilot_keys(&state);
        assert!(keys.left && !keys.right);
        assert!(!keys.fire);

        state.player.pos.x = 100.0;
        let keys = autopilot_keys(&state);
        assert!(keys.fire);
    }

    #[test]
    fn test_determinism() {
        // Two runs with the same seed and inputs stay identical
        let (mut a, levels) = fresh(99999);
        let (mut b, _) = fresh(99999);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        for _ in 0..1200 {
            tick(&mut a, &levels, &input, SIM_DT_MS);
            tick(&mut b, &levels, &input, SIM_DT_MS);
        }
        assert_eq!(a.mode, b.mode);
        assert_eq!(a.score, b.score);
        assert_eq!(a.lives, b.lives);
        assert_eq!(a.spawn, b.spawn);
        assert_eq!(a.enemies.len(), b.enemies.len());
        for (x, y) in a.enemies.iter().zip(&b.enemies) {
            assert_eq!(x.id, y.id);
            assert_eq!(x.pos, y.pos);
        }
    }
}
