//! Game state and core simulation types
//!
//! Everything a session mutates lives in `SimulationState`. Randomness is not
//! stored here; callers pass a `RandomSource` into the operations that need one.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, spawn_enemies};
use super::grid::{Grid, Position, SPAWN};
use super::rng::RandomSource;
use crate::error::SessionError;
use crate::settings::Settings;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Board, enemies and player not set up yet
    Initializing,
    /// Ticks and input are processed
    Running,
    /// Every enemy eliminated
    Won,
    /// Player caught in a blast
    Lost,
}

impl GamePhase {
    /// Won and Lost never change again
    pub fn is_terminal(self) -> bool {
        matches!(self, GamePhase::Won | GamePhase::Lost)
    }
}

/// A placed bomb
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bomb {
    pub pos: Position,
    /// Milliseconds until detonation; expired at or below zero
    pub remaining_ms: i64,
    pub range: u32,
}

impl Bomb {
    pub fn is_expired(&self) -> bool {
        self.remaining_ms <= 0
    }
}

/// Cells of one tick's detonations, on display until cleared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplosionBatch {
    /// Unique per session, increasing
    pub generation: u64,
    pub cells: BTreeSet<Position>,
    /// Session time at which the batch went off
    pub started_ms: u64,
}

/// Things that happened during a tick, for the host's sound/animation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    BombDetonated { pos: Position },
    BlockDestroyed { pos: Position },
    ExplosionStarted { generation: u64, clear_after_ms: u32 },
    ExplosionCleared { generation: u64 },
    EnemyKilled { id: u32, pos: Position },
    PlayerKilled,
    AllEnemiesCleared,
}

/// Complete state of one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub settings: Settings,
    pub phase: GamePhase,
    pub grid: Grid,
    pub player: Position,
    /// Live enemies, sorted by id
    pub enemies: Vec<Enemy>,
    /// Live bombs, in placement order
    pub bombs: Vec<Bomb>,
    /// Explosions still on display
    pub explosions: Vec<ExplosionBatch>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Session time in milliseconds (ticks * tick period)
    pub time_ms: u64,
    next_generation: u64,
}

impl SimulationState {
    /// Validate settings, generate a board and place the enemies
    pub fn new(settings: &Settings, rng: &mut dyn RandomSource) -> Result<Self, SessionError> {
        settings.validate()?;
        let grid = Grid::generate(settings.grid_size, settings.soft_block_density, rng);
        let enemies = spawn_enemies(&grid, settings.enemy_count, rng)?;
        let state = Self::from_parts(settings.clone(), grid, enemies);
        log::info!(
            "Session ready: {}x{} board, {} soft blocks, {} enemies",
            state.grid.size(),
            state.grid.size(),
            state.grid.count(super::grid::Cell::SoftBlock),
            state.enemies.len()
        );
        Ok(state)
    }

    /// Assemble a running session from a prepared board and enemy list.
    /// The player starts on the spawn cell.
    pub fn from_parts(settings: Settings, grid: Grid, mut enemies: Vec<Enemy>) -> Self {
        enemies.sort_by_key(|e| e.id);
        let mut state = Self {
            settings,
            phase: GamePhase::Initializing,
            grid,
            player: SPAWN,
            enemies,
            bombs: Vec::new(),
            explosions: Vec::new(),
            time_ticks: 0,
            time_ms: 0,
            next_generation: 1,
        };
        state.phase = GamePhase::Running;
        state
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn bomb_at(&self, pos: Position) -> Option<&Bomb> {
        self.bombs.iter().find(|b| b.pos == pos)
    }

    pub fn enemies_remaining(&self) -> usize {
        self.enemies.len()
    }

    /// Union of every explosion still on display
    pub fn explosion_cells(&self) -> BTreeSet<Position> {
        self.explosions
            .iter()
            .flat_map(|b| b.cells.iter().copied())
            .collect()
    }

    pub fn is_exploding(&self, pos: Position) -> bool {
        self.explosions.iter().any(|b| b.cells.contains(&pos))
    }

    /// Put a batch on display and return its generation
    pub(crate) fn push_explosion(&mut self, cells: BTreeSet<Position>) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        self.explosions.push(ExplosionBatch {
            generation,
            cells,
            started_ms: self.time_ms,
        });
        generation
    }

    /// Remove exactly the batch tagged `generation`.
    ///
    /// A stale or repeated clear is a no-op and never touches newer batches.
    pub fn clear_explosion(&mut self, generation: u64) -> bool {
        let before = self.explosions.len();
        self.explosions.retain(|b| b.generation != generation);
        before != self.explosions.len()
    }

    /// Read-only view for presentation
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            phase: self.phase,
            grid: &self.grid,
            player: self.player,
            enemies: self.enemies.iter().map(|e| e.pos).collect(),
            bombs: self.bombs.iter().map(|b| b.pos).collect(),
            explosions: self.explosion_cells().into_iter().collect(),
            enemies_remaining: self.enemies.len(),
            time_ticks: self.time_ticks,
        }
    }
}

/// What a renderer needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub grid: &'a Grid,
    pub player: Position,
    pub enemies: Vec<Position>,
    pub bombs: Vec<Position>,
    /// Sorted, deduplicated
    pub explosions: Vec<Position>,
    pub enemies_remaining: usize,
    pub time_ticks: u64,
}
