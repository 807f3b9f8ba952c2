//! Bomber Girl - a grid arena bomb game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board, enemies, bombs, explosions, tick pipeline)
//! - `session`: Host-facing driver (clock, explosion clear timers, win/loss callbacks)
//! - `input`: Keyboard mapping for the screen host
//! - `settings`: Session configuration
//! - `view`: Text rendering of the board

pub mod error;
pub mod input;
pub mod session;
pub mod settings;
pub mod sim;
pub mod view;

pub use error::SessionError;
pub use input::{Command, command_for_key};
pub use session::{Session, SessionHost};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Default board edge length (must be odd)
    pub const GRID_SIZE: usize = 15;
    /// Smallest board that leaves room for the spawn cell and an enemy
    pub const MIN_GRID_SIZE: usize = 5;
    /// Chance that an open interior cell starts as a soft block
    pub const SOFT_BLOCK_DENSITY: f64 = 0.3;
    /// Enemies placed at session start
    pub const ENEMY_COUNT: usize = 5;

    /// Fixed simulation tick period
    pub const TICK_MS: u32 = 300;
    /// Enemies take one step every this many ticks
    pub const ENEMY_STEP_TICKS: u32 = 1;
    /// Maximum ticks run per `Session::advance` call (backlog beyond this is dropped)
    pub const MAX_CATCHUP_TICKS: u32 = 8;

    /// Bomb fuse length
    pub const BOMB_TIMER_MS: u32 = 2100;
    /// Tiles reached by each blast ray
    pub const BLAST_RANGE: u32 = 2;
    /// How long a blast stays on screen (and stays lethal)
    pub const EXPLOSION_DURATION_MS: u32 = 500;

    /// Random probes per board cell before enemy placement gives up
    pub const SPAWN_ATTEMPTS_PER_CELL: usize = 64;
}
