//! Run state and core simulation types
//!
//! All state for one run lives in `RunState`, which the tick function takes
//! by mutable reference. Nothing here is global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::enemy::Enemy;
use super::entity::{InitError, Player, Projectile};
use super::geometry::Playfield;
use super::spawn::SpawnState;
use super::starfield::Starfield;
use crate::input::RestartGate;
use crate::levels::{Edge, LevelTable};
use crate::settings::Settings;

/// Coarse game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Title screen, waiting for a key
    Home,
    /// Active gameplay
    Running,
    /// Out of lives
    GameOver,
    /// Last configured level cleared
    Victory,
}

impl Mode {
    /// Run has ended and restart is gated
    pub fn is_finished(self) -> bool {
        matches!(self, Mode::GameOver | Mode::Victory)
    }
}

/// Discrete happenings for audio and other observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RunStarted { level: u32 },
    PlayerShot,
    EnemyShot { id: u32 },
    /// A player projectile destroyed an enemy
    EnemyHit { id: u32, points: u64 },
    /// The player lost a life
    PlayerHit { lives: u32 },
    EnemyEscaped { id: u32, edge: Edge, penalty: u64 },
    LevelAdvanced { level: u32 },
    GameOver { score: u64 },
    Victory { score: u64 },
}

/// Complete run state (deterministic for a given seed and input stream)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub field: Playfield,
    pub mode: Mode,
    /// Current level index (key into the level table)
    pub level: u32,
    /// Never negative; penalties floor at zero
    pub score: u64,
    pub lives: u32,
    pub initial_lives: u32,
    /// Monotonic simulation clock (ms)
    pub clock_ms: f64,
    pub run_started_at: f64,
    pub level_started_at: f64,
    pub player: Player,
    pub player_start: Vec2,
    pub enemies: Vec<Enemy>,
    /// Player projectiles
    pub player_shots: Vec<Projectile>,
    pub enemy_shots: Vec<Projectile>,
    pub spawn: SpawnState,
    pub starfield: Starfield,
    /// Decides when a key press (re)starts a run
    pub gate: RestartGate,
    pub end_cooldown_ms: f64,
    /// Pending events, drained by the host each frame
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    input_clear_requested: bool,
    next_id: u32,
}

impl RunState {
    /// Fresh state on the Home screen
    pub fn new(settings: &Settings, levels: &LevelTable) -> Result<Self, InitError> {
        let player = Player::from_settings(settings)?;
        let field = settings.playfield();
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let first = levels.first_level();
        let starfield = Starfield::new(levels.get(first).starfield, &field, &mut rng);

        Ok(Self {
            seed: settings.seed,
            rng,
            field,
            mode: Mode::Home,
            level: first,
            score: 0,
            lives: settings.initial_lives,
            initial_lives: settings.initial_lives,
            clock_ms: 0.0,
            run_started_at: 0.0,
            level_started_at: 0.0,
            player_start: player.pos,
            player,
            enemies: Vec::new(),
            player_shots: Vec::new(),
            enemy_shots: Vec::new(),
            spawn: SpawnState::default(),
            starfield,
            gate: RestartGate::ReadyToRestart,
            end_cooldown_ms: settings.end_cooldown_ms,
            events: Vec::new(),
            input_clear_requested: false,
            next_id: 1,
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ask the input layer to drop all held keys
    pub fn request_input_clear(&mut self) {
        self.input_clear_requested = true;
    }

    pub fn take_input_clear_request(&mut self) -> bool {
        std::mem::take(&mut self.input_clear_requested)
    }

    pub fn award(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Subtract a penalty, flooring the score at zero
    pub fn penalize(&mut self, points: u64) {
        self.score = self.score.saturating_sub(points);
    }

    /// Seconds since the current run started
    pub fn elapsed_secs(&self) -> f64 {
        (self.clock_ms - self.run_started_at).max(0.0) / 1000.0
    }

    /// Seconds since the current level started
    pub fn level_elapsed_secs(&self) -> f64 {
        (self.clock_ms - self.level_started_at).max(0.0) / 1000.0
    }

    /// Live hostiles; projectiles in flight don't count
    pub fn enemies_alive(&self) -> usize {
        self.enemies.len()
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
    }
}
