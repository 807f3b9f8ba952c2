//! Session configuration
//!
//! Every tunable of a session lives here. The browser host reads these from a
//! JSON blob on the page; the native host reads an optional JSON file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Why a set of settings cannot start a session
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("grid size {size} is too small (minimum {min})")]
    GridTooSmall { size: usize, min: usize },
    #[error("grid size {0} must be odd so the border and pillar pattern line up")]
    GridSizeEven(usize),
    #[error("soft block density {0} must be within 0.0..=1.0")]
    DensityOutOfRange(f64),
    #[error("at least one enemy is required")]
    NoEnemies,
    #[error("{requested} enemies requested but a {size}x{size} board only has {capacity} open cells")]
    TooManyEnemies {
        requested: usize,
        size: usize,
        capacity: usize,
    },
    #[error("tick period must be greater than zero")]
    ZeroTick,
    #[error("enemy step interval must be greater than zero")]
    ZeroEnemyStep,
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Board ===
    /// Edge length of the square board (odd)
    pub grid_size: usize,
    /// Chance that an open interior cell starts as a soft block (0.0 - 1.0)
    pub soft_block_density: f64,
    /// Enemies placed at session start
    pub enemy_count: usize,

    // === Bombs ===
    /// Fuse length in milliseconds
    pub bomb_timer_ms: u32,
    /// Tiles reached by each of the four blast rays
    pub blast_range: u32,
    /// How long an explosion stays on the board
    pub explosion_duration_ms: u32,
    /// Live bombs caught in a blast detonate in the same tick
    pub chain_reactions: bool,

    // === Timing ===
    /// Simulation tick period in milliseconds
    pub tick_ms: u32,
    /// Enemies step once every this many ticks
    pub enemy_step_ticks: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            soft_block_density: SOFT_BLOCK_DENSITY,
            enemy_count: ENEMY_COUNT,

            bomb_timer_ms: BOMB_TIMER_MS,
            blast_range: BLAST_RANGE,
            explosion_duration_ms: EXPLOSION_DURATION_MS,
            chain_reactions: false,

            tick_ms: TICK_MS,
            enemy_step_ticks: ENEMY_STEP_TICKS,
        }
    }
}

impl Settings {
    /// Parse settings from JSON. Missing keys fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the preconditions a session needs before it can start
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.grid_size < MIN_GRID_SIZE {
            return Err(SettingsError::GridTooSmall {
                size: self.grid_size,
                min: MIN_GRID_SIZE,
            });
        }
        if self.grid_size % 2 == 0 {
            return Err(SettingsError::GridSizeEven(self.grid_size));
        }
        if !(0.0..=1.0).contains(&self.soft_block_density) {
            return Err(SettingsError::DensityOutOfRange(self.soft_block_density));
        }
        if self.enemy_count == 0 {
            return Err(SettingsError::NoEnemies);
        }
        let capacity = self.open_cell_capacity();
        if self.enemy_count > capacity {
            return Err(SettingsError::TooManyEnemies {
                requested: self.enemy_count,
                size: self.grid_size,
                capacity,
            });
        }
        if self.tick_ms == 0 {
            return Err(SettingsError::ZeroTick);
        }
        if self.enemy_step_ticks == 0 {
            return Err(SettingsError::ZeroEnemyStep);
        }
        Ok(())
    }

    /// Interior cells that are never hard blocks, excluding the spawn cell.
    ///
    /// This is the upper bound for enemy placement; soft blocks can only
    /// shrink it further.
    pub fn open_cell_capacity(&self) -> usize {
        if self.grid_size < 3 {
            return 0;
        }
        let interior = self.grid_size - 2;
        // Pillars sit on even rows/cols strictly inside the border
        let pillars_per_axis = (1..=interior).filter(|i| i % 2 == 0).count();
        (interior * interior)
            .saturating_sub(pillars_per_axis * pillars_per_axis)
            .saturating_sub(1)
    }
}
