//! Fixed-timestep driver
//!
//! Owns a run, its level table and the held-key snapshot. Hosts forward key
//! transitions as they arrive and call [`Session::update`] once per frame
//! with the wall-clock delta; the session turns that into whole 60 Hz ticks.

use crate::consts::{MAX_SUBSTEPS, SIM_DT_MS};
use crate::input::{InputSnapshot, Key, KeyEvent};
use crate::levels::LevelTable;
use crate::settings::Settings;
use crate::sim::{DrawList, GameEvent, InitError, RunState, TickInput, draw_list, tick};

/// Longest frame delta honored; anything slower runs in slow motion
const MAX_FRAME_SECS: f64 = 0.1;

#[derive(Debug)]
pub struct Session {
    state: RunState,
    levels: LevelTable,
    keys: InputSnapshot,
    /// Physical key state, untouched by input clears
    held: InputSnapshot,
    pending: Vec<KeyEvent>,
    /// Unsimulated time (ms)
    accumulator: f64,
    autopilot: bool,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(settings: &Settings, levels: LevelTable) -> Result<Self, InitError> {
        let state = RunState::new(settings, &levels)?;
        Ok(Self {
            state,
            levels,
            keys: InputSnapshot::default(),
            held: InputSnapshot::default(),
            pending: Vec::new(),
            accumulator: 0.0,
            autopilot: false,
            events: Vec::new(),
        })
    }

    pub fn press(&mut self, key: Key) {
        self.key_event(KeyEvent::press(key, self.state.clock_ms));
    }

    pub fn release(&mut self, key: Key) {
        self.key_event(KeyEvent::release(key, self.state.clock_ms));
    }

    pub fn key_event(&mut self, event: KeyEvent) {
        self.keys.apply(&event);
        self.held.apply(&event);
        self.pending.push(event);
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        if enabled != self.autopilot {
            log::info!("Autopilot {}", if enabled { "engaged" } else { "released" });
        }
        self.autopilot = enabled;
    }

    /// Run as many fixed ticks as `dt_secs` of wall time covers. Returns the
    /// number of ticks simulated.
    pub fn update(&mut self, dt_secs: f64) -> u32 {
        let dt = if dt_secs.is_finite() {
            dt_secs.clamp(0.0, MAX_FRAME_SECS)
        } else {
            0.0
        };
        self.accumulator += dt * 1000.0;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT_MS && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= SIM_DT_MS;
            substeps += 1;
        }
        substeps
    }

    /// Run exactly one fixed tick
    pub fn step(&mut self) {
        let input = TickInput {
            keys: self.keys,
            held: self.held,
            events: std::mem::take(&mut self.pending),
            autopilot: self.autopilot,
        };
        tick(&mut self.state, &self.levels, &input, SIM_DT_MS);

        if self.state.take_input_clear_request() {
            self.keys.clear();
        }
        self.events.append(&mut self.state.events);
    }

    /// Events since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn draw_list(&self) -> DrawList<'_> {
        draw_list(&self.state)
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RunState {
        &mut self.state
    }

    pub fn levels(&self) -> &LevelTable {
        &self.levels
    }

    pub fn keys(&self) -> &InputSnapshot {
        &self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Mode;

    fn session() -> Session {
        Session::new(&Settings::default(), LevelTable::builtin()).unwrap()
    }

    #[test]
    fn test_update_runs_whole_ticks() {
        let mut session = session();
        assert_eq!(session.update(0.010), 0);
        assert_eq!(session.update(0.010), 1);
        assert_eq!(session.update(1.0 / 30.0), 2);
        // Long stalls are clamped to a tenth of a second
        assert_eq!(session.update(5.0), 6);
        assert!(session.update(5.0) <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_press_starts_run_and_clears_keys() {
        let mut session = session();
        session.press(Key::Fire);
        assert!(session.keys().fire);

        session.step();
        assert_eq!(session.state().mode, Mode::Running);
        assert!(!session.keys().any_held());
        assert_eq!(session.drain_events(), vec![GameEvent::RunStarted { level: 1 }]);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_non_finite_delta_is_ignored() {
        let mut session = session();
        assert_eq!(session.update(f64::NAN), 0);
        assert_eq!(session.update(f64::INFINITY), 0);
        assert_eq!(session.update(0.02), 1);
        assert_eq!(session.state().clock_ms, SIM_DT_MS);
    }

    #[test]
    fn test_held_keys_survive_input_clear() {
        let mut session = session();
        session.press(Key::Left);
        session.step();
        assert!(!session.keys().any_held());
        assert!(session.held.left);

        session.release(Key::Left);
        assert!(!session.held.any_held());
    }

    #[test]
    fn test_missing_sprite_fails_construction() {
        let settings = Settings {
            player_sprite: None,
            ..Settings::default()
        };
        assert!(Session::new(&settings, LevelTable::builtin()).is_err());
    }

    #[test]
    fn test_autopilot_plays_on_its_own() {
        let mut session = session();
        session.set_autopilot(true);
        for _ in 0..600 {
            session.step();
        }
        assert_ne!(session.state().mode, Mode::Home);
        let events = session.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::PlayerShot)));
    }
}
