//! Level and run state machine
//!
//! `Home -> Running -> (next level, still Running) -> Victory | GameOver`,
//! with `GameOver/Victory -> Running` once the restart gate opens. Every
//! transition asks the input layer to drop held keys.

use super::spawn::SpawnState;
use super::starfield::Starfield;
use super::state::{GameEvent, Mode, RunState};
use crate::input::RestartGate;
use crate::levels::LevelTable;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    GameOver,
    Victory,
}

impl Outcome {
    pub fn mode(self) -> Mode {
        match self {
            Outcome::GameOver => Mode::GameOver,
            Outcome::Victory => Mode::Victory,
        }
    }
}

/// Begin a fresh run at the first configured level
pub fn start_run(state: &mut RunState, levels: &LevelTable) {
    let now = state.clock_ms;
    state.score = 0;
    state.lives = state.initial_lives;
    let start = state.player_start;
    state.player.reset(start);
    state.enemies.clear();
    state.player_shots.clear();
    state.enemy_shots.clear();
    state.run_started_at = now;
    state.mode = Mode::Running;
    state.gate = RestartGate::Active;

    let first = levels.first_level();
    log::info!("Run started at level {} (seed {})", first, state.seed);
    state.emit(GameEvent::RunStarted { level: first });
    state.request_input_clear();
    start_level(state, levels, first);

    // Settings may grant no lives at all
    if state.lives == 0 {
        end_run(state, Outcome::GameOver);
    }
}

/// (Re)initialize `level`: fresh spawner, decorations and hostiles
pub fn start_level(state: &mut RunState, levels: &LevelTable, level: u32) {
    let now = state.clock_ms;
    let config = levels.get(level);
    state.level = level;
    state.level_started_at = now;
    state.enemies.clear();
    state.enemy_shots.clear();
    state.spawn = SpawnState::new(config, now);
    state.starfield = Starfield::new(config.starfield, &state.field, &mut state.rng);
}

/// Advance to the next level, or win, once the quota is spawned and the
/// field is clear. Returns true when a transition happened.
pub fn check_progression(state: &mut RunState, levels: &LevelTable) -> bool {
    if state.mode != Mode::Running {
        return false;
    }
    let config = levels.get(state.level);
    if !state.spawn.quota_met(&config.spawn) || !state.enemies.is_empty() {
        return false;
    }

    match levels.next_level(state.level) {
        Some(next) => {
            log::info!(
                "Level {} cleared in {:.1}s, advancing to {}",
                state.level,
                state.level_elapsed_secs(),
                next
            );
            start_level(state, levels, next);
            state.emit(GameEvent::LevelAdvanced { level: next });
            state.request_input_clear();
        }
        None => end_run(state, Outcome::Victory),
    }
    true
}

/// Take one life. Ignored outside Running, so several hits resolved in the
/// same tick end the run only once.
pub fn lose_life(state: &mut RunState) {
    if state.mode != Mode::Running {
        return;
    }
    state.lives = state.lives.saturating_sub(1);
    let lives = state.lives;
    state.emit(GameEvent::PlayerHit { lives });
    if lives == 0 {
        end_run(state, Outcome::GameOver);
    }
}

/// Finish the run in `outcome`
pub fn end_run(state: &mut RunState, outcome: Outcome) {
    if state.mode.is_finished() {
        return;
    }
    state.mode = outcome.mode();
    let score = state.score;
    match outcome {
        Outcome::Victory => {
            log::info!("Victory with {} points after {:.1}s", score, state.elapsed_secs());
            state.emit(GameEvent::Victory { score });
        }
        Outcome::GameOver => {
            log::info!(
                "Game over at level {} with {} points after {:.1}s",
                state.level,
                score,
                state.elapsed_secs()
            );
            state.emit(GameEvent::GameOver { score });
        }
    }
    state.request_input_clear();
}
