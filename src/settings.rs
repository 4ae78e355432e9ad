//! Simulation settings and level scripts
//!
//! Loaded from a JSON file; every field falls back to the stock tuning when
//! omitted.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::{AquariumLevel, CreatureKind, PopulationNode};

/// Errors that can occur when loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// JSON parsing failed
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no levels configured")]
    NoLevels,
    #[error("level {level} has no population nodes")]
    EmptyLevel { level: usize },
    #[error("level {level} wants zero {kind:?}")]
    EmptyNode { level: usize, kind: CreatureKind },
    #[error("level {level} has a target score of zero")]
    ZeroTargetScore { level: usize },
    #[error("arena must have a positive size, got {width}x{height}")]
    InvalidArena { width: f32, height: f32 },
}

/// Arena extents and spawn tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaSettings {
    pub width: f32,
    pub height: f32,
    /// Cap on live non-player creatures when repopulating
    pub max_population: usize,
    /// Chance per eligible tick that a power-up appears
    pub power_up_spawn_chance: f64,
    /// Frames skipped between collision checks (0 = every frame)
    pub collision_check_interval: u32,
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            width: ARENA_WIDTH,
            height: ARENA_HEIGHT,
            max_population: MAX_POPULATION,
            power_up_spawn_chance: POWER_UP_SPAWN_CHANCE,
            collision_check_interval: 0,
        }
    }
}

/// Player starting stats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub speed: f32,
    pub radius: f32,
    pub lives: u32,
    pub power: u32,
    /// Player bounds are the arena shrunk by this much
    pub bounds_margin: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            radius: PLAYER_RADIUS,
            lives: PLAYER_LIVES,
            power: PLAYER_POWER,
            bounds_margin: PLAYER_BOUNDS_MARGIN,
        }
    }
}

/// How collisions turn into score, power and damage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringRules {
    /// Frames of immunity after losing a life
    pub damage_debounce_frames: u32,
    /// Player score gained per point of creature value
    pub score_weight: u32,
    /// Power +1 each time the player score crosses a multiple of this
    pub power_step: u64,
    /// A life each time the player score crosses a multiple of this
    pub life_step: u64,
    pub max_lives: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            damage_debounce_frames: DAMAGE_DEBOUNCE_FRAMES,
            score_weight: 1,
            power_step: 10,
            life_step: 50,
            max_lives: 5,
        }
    }
}

/// Target population for one species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationEntry {
    pub kind: CreatureKind,
    pub count: u32,
}

/// Scripted level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelScript {
    pub target_score: u64,
    pub power_up_score: u64,
    pub population: Vec<PopulationEntry>,
}

impl LevelScript {
    fn new(target_score: u64, power_up_score: u64, population: &[(CreatureKind, u32)]) -> Self {
        Self {
            target_score,
            power_up_score,
            population: population
                .iter()
                .map(|&(kind, count)| PopulationEntry { kind, count })
                .collect(),
        }
    }
}

/// The stock five-level campaign
pub fn stock_levels() -> Vec<LevelScript> {
    use CreatureKind::*;
    vec![
        LevelScript::new(10, 5, &[(NPCreature, 8), (NewNemoCreature, 4)]),
        LevelScript::new(
            15,
            7,
            &[(NPCreature, 12), (NewNemoCreature, 6), (FastNPCreature, 6)],
        ),
        LevelScript::new(
            20,
            10,
            &[(NPCreature, 30), (BiggerFish, 2), (FastNPCreature, 8)],
        ),
        LevelScript::new(
            35,
            17,
            &[(BiggerFish, 20), (FastNPCreature, 20), (SharkCreature, 6)],
        ),
        LevelScript::new(
            50,
            25,
            &[(BiggerFish, 5), (FastNPCreature, 5), (SharkCreature, 15)],
        ),
    ]
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for spawn positions and power-up rolls
    pub seed: u64,
    pub arena: ArenaSettings,
    pub player: PlayerSettings,
    pub scoring: ScoringRules,
    pub levels: Vec<LevelScript>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            arena: ArenaSettings::default(),
            player: PlayerSettings::default(),
            scoring: ScoringRules::default(),
            levels: stock_levels(),
        }
    }
}

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 0x00ac_0a21_0000_0001;

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file on disk
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&content)?;
        log::info!(
            "Loaded settings from {} ({} levels)",
            path.display(),
            settings.levels.len()
        );
        Ok(settings)
    }

    /// Write settings to a JSON file on disk
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Reject settings the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return Err(ConfigError::InvalidArena {
                width: self.arena.width,
                height: self.arena.height,
            });
        }
        if self.levels.is_empty() {
            return Err(ConfigError::NoLevels);
        }
        for (level, script) in self.levels.iter().enumerate() {
            if script.population.is_empty() {
                return Err(ConfigError::EmptyLevel { level });
            }
            if script.target_score == 0 {
                return Err(ConfigError::ZeroTargetScore { level });
            }
            if let Some(entry) = script.population.iter().find(|e| e.count == 0) {
                return Err(ConfigError::EmptyNode {
                    level,
                    kind: entry.kind,
                });
            }
        }
        Ok(())
    }

    /// Instantiate the scripted levels, numbered from zero
    pub fn build_levels(&self) -> Vec<AquariumLevel> {
        self.levels
            .iter()
            .enumerate()
            .map(|(number, script)| {
                let nodes = script
                    .population
                    .iter()
                    .map(|entry| PopulationNode::new(entry.kind, entry.count))
                    .collect();
                AquariumLevel::new(number, script.target_score, script.power_up_score, nodes)
            })
            .collect()
    }
}
