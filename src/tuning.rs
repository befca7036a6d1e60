//! Game balance
//!
//! Every gameplay number the simulation reads lives here so a session can be
//! rebalanced from a JSON file without recompiling. Missing fields fall back to
//! the stock values.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{StorageError, read_json, write_json};

/// Player balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    /// Health removed per second from whatever the beam is touching
    pub beam_damage_per_second: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 5.0,
            max_speed: 10.0,
            acceleration: 300.0,
            beam_damage_per_second: 5.0,
        }
    }
}

/// Walking enemy balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerTuning {
    pub max_health: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub score_value: u32,
    /// Reach of the melee probe
    pub attack_distance: f32,
    /// Windup between starting an attack and resolving the hit
    pub attack_delay: f32,
    pub attack_damage: f32,
    /// Wait armed every frame the walker spends approaching
    pub approach_wait: f32,
    /// Bounds of the wait drawn when a windup starts
    pub wait_min: f32,
    pub wait_max: f32,
    /// Wait after a strike lands
    pub recover_wait: f32,
}

impl Default for WalkerTuning {
    fn default() -> Self {
        Self {
            max_health: 3.0,
            max_speed: 7.0,
            acceleration: 100.0,
            score_value: 1,
            attack_distance: 0.75,
            attack_delay: 0.3,
            attack_damage: 1.0,
            approach_wait: 0.2,
            wait_min: 0.5,
            wait_max: 0.7,
            recover_wait: 1.0,
        }
    }
}

impl WalkerTuning {
    /// Walkers stop and attack once the player is this close
    pub fn engage_distance(&self) -> f32 {
        self.attack_distance * 0.9
    }
}

/// Sliding trap balance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapTuning {
    pub max_health: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    /// Half width of the lane a trap watches for the player
    pub detection_band: f32,
    pub player_damage: f32,
    pub enemy_damage: f32,
    pub traps_per_side: usize,
}

impl Default for TrapTuning {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            max_speed: 10.0,
            acceleration: 300.0,
            detection_band: 0.5,
            player_damage: 1.0,
            enemy_damage: 10.0,
            traps_per_side: 2,
        }
    }
}

/// Spawn cadence and difficulty ramp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    pub initial_spawn_interval: f32,
    pub min_spawn_interval: f32,
    pub spawn_interval_step: f32,
    pub initial_max_enemies: usize,
    pub max_enemies_ceiling: usize,
    /// Seconds between difficulty steps
    pub difficulty_interval: f32,
    /// Force-release dying enemies after this many seconds.
    /// `None` waits for the presentation indefinitely.
    pub death_timeout: Option<f32>,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            initial_spawn_interval: 1.0,
            min_spawn_interval: 0.2,
            spawn_interval_step: 0.1,
            initial_max_enemies: 2,
            max_enemies_ceiling: 20,
            difficulty_interval: 5.0,
            death_timeout: None,
        }
    }
}

/// Complete balance sheet for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Deceleration applied to actors that are not trying to move
    pub friction: f32,
    pub player: PlayerTuning,
    pub walker: WalkerTuning,
    pub trap: TrapTuning,
    pub director: DirectorTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            friction: 150.0,
            player: PlayerTuning::default(),
            walker: WalkerTuning::default(),
            trap: TrapTuning::default(),
            director: DirectorTuning::default(),
        }
    }
}

impl Tuning {
    /// Load tuning from a JSON file
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let tuning: Self = read_json(path)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Load tuning, falling back to defaults when the file is missing or bad
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(tuning) => tuning,
            Err(e) if e.is_not_found() => {
                log::info!("No tuning at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring tuning file: {e}");
                Self::default()
            }
        }
    }

    /// Write tuning as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), StorageError> {
        write_json(path, self)
    }
}
