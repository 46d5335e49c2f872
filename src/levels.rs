//! Data-driven level configuration
//!
//! A level describes which enemies appear, how the spawner paces them, how
//! kills and escapes are scored, and the decorative star field. Tables load
//! from JSON and are validated once, so the simulation can rely on every
//! level having at least one archetype and one spawn edge.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Deserializer, Serialize};

use crate::consts::{FORMATION_GAP_FACTOR, LINE_FORMATION_COUNT};
use crate::sim::Visual;
use crate::sim::spawn::Weighted;
use crate::sim::starfield::StarfieldConfig;

/// Errors raised while loading configuration files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("level table is empty")]
    Empty,
    #[error("level {level} defines neither `enemy` nor a non-empty `enemyMix`")]
    MissingArchetype { level: u32 },
    #[error("level {level} has no spawn edges")]
    NoSpawnEdges { level: u32 },
    #[error("level {level}: `{field}` range is inverted")]
    InvertedRange { level: u32, field: &'static str },
    #[error("level {level}: `maxAlive` must be at least 1")]
    ZeroMaxAlive { level: u32 },
    #[error("level {level}: weights must not be negative")]
    NegativeWeight { level: u32 },
}

/// Playfield edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

impl Edge {
    /// Unit direction pointing from this edge into the playfield
    pub fn inward(self) -> Vec2 {
        match self {
            Edge::Top => Vec2::Y,
            Edge::Bottom => Vec2::NEG_Y,
            Edge::Left => Vec2::X,
            Edge::Right => Vec2::NEG_X,
        }
    }
}

/// Axis a zigzag oscillates along
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    #[default]
    X,
    Y,
}

impl Axis {
    pub fn unit(self) -> Vec2 {
        match self {
            Axis::X => Vec2::X,
            Axis::Y => Vec2::Y,
        }
    }
}

/// Movement pattern of an archetype. Homing only bends straight movers;
/// zigzag enemies follow their oscillation exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum MotionConfig {
    Straight {
        #[serde(default)]
        homing_strength: f32,
    },
    Zigzag {
        amplitude: f32,
        frequency: f32,
        /// Random per enemy when omitted
        #[serde(default)]
        phase: Option<f32>,
        #[serde(default)]
        axis: Axis,
    },
}

impl Default for MotionConfig {
    fn default() -> Self {
        MotionConfig::Straight {
            homing_strength: 0.0,
        }
    }
}

/// Enemy gun parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShooterConfig {
    pub cooldown_ms: f64,
    pub projectile_speed: f32,
    #[serde(default = "default_projectile_color")]
    pub projectile_color: String,
}

fn default_projectile_color() -> String {
    "#FF0000".to_string()
}

/// A named enemy template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archetype {
    pub visual: Visual,
    pub size: f32,
    #[serde(default)]
    pub motion: MotionConfig,
    /// Cap on speed once homing bends the velocity; defaults to the
    /// enemy's spawn speed
    #[serde(default)]
    pub speed_limit: Option<f32>,
    #[serde(default)]
    pub shooter: Option<ShooterConfig>,
}

fn default_weight() -> f64 {
    1.0
}

/// One weighted entry of an `enemyMix`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntry {
    #[serde(default = "default_weight")]
    pub weight: f64,
    pub enemy: Archetype,
}

impl Weighted for MixEntry {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Relative layout for a multi-enemy spawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Formation {
    #[default]
    Single,
    /// 2x2 block
    Square,
    /// Horizontal line of five
    Line,
}

impl Formation {
    /// Unknown names fall back to a single spawn point
    pub fn from_name(name: &str) -> Self {
        match name {
            "single" => Formation::Single,
            "square" => Formation::Square,
            "line" => Formation::Line,
            other => {
                log::warn!("Unknown formation '{}', spawning single", other);
                Formation::Single
            }
        }
    }

    /// Member offsets from the base spawn point for enemies of `size`
    pub fn offsets(self, size: f32) -> Vec<Vec2> {
        let gap = size * FORMATION_GAP_FACTOR;
        match self {
            Formation::Single => vec![Vec2::ZERO],
            Formation::Square => vec![
                Vec2::new(-gap / 2.0, 0.0),
                Vec2::new(gap / 2.0, 0.0),
                Vec2::new(-gap / 2.0, gap),
                Vec2::new(gap / 2.0, gap),
            ],
            Formation::Line => {
                let start = -((LINE_FORMATION_COUNT - 1) as f32 / 2.0) * gap;
                (0..LINE_FORMATION_COUNT)
                    .map(|i| Vec2::new(start + i as f32 * gap, 0.0))
                    .collect()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Formation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Formation::from_name(&name))
    }
}

/// One weighted entry of a level's formation list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormationEntry {
    #[serde(rename = "type", default)]
    pub kind: Formation,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl Weighted for FormationEntry {
    fn weight(&self) -> f64 {
        self.weight
    }
}

/// Spawner pacing and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnConfig {
    /// Delay between spawn batches, uniform in `[min, max]`
    pub interval_ms: (f64, f64),
    #[serde(default)]
    pub initial_delay_ms: f64,
    pub max_alive: usize,
    /// `None` spawns forever
    #[serde(default)]
    pub total_to_spawn: Option<u32>,
    pub edges: Vec<Edge>,
    /// Inward speed range (pixels per tick)
    pub speed: (f32, f32),
    /// Horizontal drift for enemies entering from top/bottom
    #[serde(default)]
    pub drift_x: (f32, f32),
    /// Vertical drift for enemies entering from left/right
    #[serde(default)]
    pub drift_y: (f32, f32),
    #[serde(default)]
    pub formations: Vec<FormationEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringConfig {
    pub hit_points: u64,
    pub miss_penalty: u64,
}

/// Everything the simulation needs to run one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelConfig {
    #[serde(default)]
    pub enemy: Option<Archetype>,
    #[serde(default)]
    pub enemy_mix: Vec<MixEntry>,
    pub spawn: SpawnConfig,
    pub scoring: ScoringConfig,
    /// Exits through these edges cost `missPenalty`
    #[serde(default)]
    pub escape_sides: Vec<Edge>,
    #[serde(default)]
    pub starfield: StarfieldConfig,
}

impl LevelConfig {
    pub fn is_escape_side(&self, edge: Edge) -> bool {
        self.escape_sides.contains(&edge)
    }

    fn validate(&self, level: u32) -> Result<(), ConfigError> {
        if self.enemy.is_none() && self.enemy_mix.is_empty() {
            return Err(ConfigError::MissingArchetype { level });
        }
        let spawn = &self.spawn;
        if spawn.edges.is_empty() {
            return Err(ConfigError::NoSpawnEdges { level });
        }
        if spawn.max_alive == 0 {
            return Err(ConfigError::ZeroMaxAlive { level });
        }
        if spawn.interval_ms.0 > spawn.interval_ms.1 {
            return Err(ConfigError::InvertedRange {
                level,
                field: "intervalMs",
            });
        }
        if spawn.speed.0 > spawn.speed.1 {
            return Err(ConfigError::InvertedRange {
                level,
                field: "speed",
            });
        }
        let negative_mix = self.enemy_mix.iter().any(|m| m.weight < 0.0);
        let negative_formation = spawn.formations.iter().any(|f| f.weight < 0.0);
        if negative_mix || negative_formation {
            return Err(ConfigError::NegativeWeight { level });
        }
        Ok(())
    }
}

/// Ordered, non-empty table of level configurations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<u32, LevelConfig>",
    into = "BTreeMap<u32, LevelConfig>"
)]
pub struct LevelTable {
    /// Sorted by level index, never empty
    levels: Vec<(u32, LevelConfig)>,
}

impl TryFrom<BTreeMap<u32, LevelConfig>> for LevelTable {
    type Error = ConfigError;

    fn try_from(map: BTreeMap<u32, LevelConfig>) -> Result<Self, Self::Error> {
        if map.is_empty() {
            return Err(ConfigError::Empty);
        }
        for (&level, config) in &map {
            config.validate(level)?;
        }
        Ok(Self {
            levels: map.into_iter().collect(),
        })
    }
}

impl From<LevelTable> for BTreeMap<u32, LevelConfig> {
    fn from(table: LevelTable) -> Self {
        table.levels.into_iter().collect()
    }
}

impl LevelTable {
    pub fn new(levels: BTreeMap<u32, LevelConfig>) -> Result<Self, ConfigError> {
        Self::try_from(levels)
    }

    /// Parse a JSON object keyed by level index
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let levels: BTreeMap<u32, LevelConfig> = serde_json::from_str(json)?;
        Self::try_from(levels)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_json(&json)?;
        log::info!("Loaded {} levels from {}", table.len(), path.display());
        Ok(table)
    }

    /// Config for `level`, falling back to the lowest configured level
    pub fn get(&self, level: u32) -> &LevelConfig {
        match self.levels.binary_search_by_key(&level, |(index, _)| *index) {
            Ok(i) => &self.levels[i].1,
            Err(_) => {
                log::warn!(
                    "No configuration for level {}, using level {}",
                    level,
                    self.first_level()
                );
                &self.levels[0].1
            }
        }
    }

    pub fn first_level(&self) -> u32 {
        self.levels[0].0
    }

    pub fn max_level(&self) -> u32 {
        self.levels.last().map_or(1, |(index, _)| *index)
    }

    /// The next configured level after `level`, if any (tables may be sparse)
    pub fn next_level(&self, level: u32) -> Option<u32> {
        self.levels
            .iter()
            .map(|(index, _)| *index)
            .find(|&index| index > level)
    }

    pub fn contains(&self, level: u32) -> bool {
        self.levels.iter().any(|(index, _)| *index == level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The three shipped levels
    pub fn builtin() -> Self {
        let levels = vec![(1, level_one()), (2, level_two()), (3, level_three())];
        Self { levels }
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Single straight archetype dropping from the top
fn level_one() -> LevelConfig {
    LevelConfig {
        enemy: Some(Archetype {
            visual: Visual::sprite("ennemi_1"),
            size: 30.0,
            motion: MotionConfig::default(),
            speed_limit: None,
            shooter: None,
        }),
        enemy_mix: Vec::new(),
        spawn: SpawnConfig {
            interval_ms: (350.0, 800.0),
            initial_delay_ms: 0.0,
            max_alive: 8,
            total_to_spawn: Some(45),
            edges: vec![Edge::Top],
            speed: (1.3, 2.3),
            drift_x: (-0.5, 0.5),
            drift_y: (0.0, 0.0),
            formations: Vec::new(),
        },
        scoring: ScoringConfig {
            hit_points: 10,
            miss_penalty: 5,
        },
        escape_sides: vec![Edge::Bottom],
        starfield: StarfieldConfig {
            count: 60,
            base_speed: 0.4,
            trail_base: 3.0,
            player_influence: 0.01,
        },
    }
}

/// Waves arriving in formations
fn level_two() -> LevelConfig {
    LevelConfig {
        enemy: Some(Archetype {
            visual: Visual::sprite("ennemi_2"),
            size: 28.0,
            motion: MotionConfig::default(),
            speed_limit: None,
            shooter: None,
        }),
        enemy_mix: Vec::new(),
        spawn: SpawnConfig {
            interval_ms: (420.0, 900.0),
            initial_delay_ms: 0.0,
            max_alive: 8,
            total_to_spawn: Some(40),
            edges: vec![Edge::Top],
            speed: (1.2, 2.0),
            drift_x: (-0.4, 0.4),
            drift_y: (0.0, 0.0),
            formations: vec![
                FormationEntry {
                    kind: Formation::Single,
                    weight: 50.0,
                },
                FormationEntry {
                    kind: Formation::Square,
                    weight: 25.0,
                },
                FormationEntry {
                    kind: Formation::Line,
                    weight: 25.0,
                },
            ],
        },
        scoring: ScoringConfig {
            hit_points: 15,
            miss_penalty: 7,
        },
        escape_sides: vec![Edge::Bottom],
        starfield: StarfieldConfig {
            count: 100,
            base_speed: 1.2,
            trail_base: 12.0,
            player_influence: 0.03,
        },
    }
}

/// Zigzaggers mixed with homing gunships
fn level_three() -> LevelConfig {
    LevelConfig {
        enemy: None,
        enemy_mix: vec![
            MixEntry {
                weight: 70.0,
                enemy: Archetype {
                    visual: Visual::sprite("ennemi_3"),
                    size: 28.0,
                    motion: MotionConfig::Zigzag {
                        amplitude: 28.0,
                        frequency: 0.08,
                        phase: None,
                        axis: Axis::X,
                    },
                    speed_limit: None,
                    shooter: None,
                },
            },
            MixEntry {
                weight: 30.0,
                enemy: Archetype {
                    visual: Visual::sprite("ennemi_4"),
                    size: 26.0,
                    motion: MotionConfig::Straight {
                        homing_strength: 0.035,
                    },
                    speed_limit: None,
                    shooter: Some(ShooterConfig {
                        cooldown_ms: 1500.0,
                        projectile_speed: 3.8,
                        projectile_color: "#FF0000".to_string(),
                    }),
                },
            },
        ],
        spawn: SpawnConfig {
            interval_ms: (320.0, 720.0),
            initial_delay_ms: 0.0,
            max_alive: 9,
            total_to_spawn: Some(55),
            edges: vec![Edge::Top],
            speed: (1.5, 2.6),
            drift_x: (-0.3, 0.3),
            drift_y: (0.0, 0.0),
            formations: Vec::new(),
        },
        scoring: ScoringConfig {
            hit_points: 20,
            miss_penalty: 10,
        },
        escape_sides: vec![Edge::Bottom],
        starfield: StarfieldConfig {
            count: 160,
            base_speed: 2.4,
            trail_base: 28.0,
            player_influence: 0.06,
        },
    }
}
