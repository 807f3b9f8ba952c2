//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Randomness only through an injected `RandomSource`
//! - Stable iteration order (enemies by ID, bombs by placement)
//! - No rendering or platform dependencies

pub mod actions;
pub mod blast;
pub mod enemy;
pub mod grid;
pub mod rng;
pub mod state;
pub mod tick;

pub use actions::{move_player, place_bomb};
pub use blast::{Detonation, blast_cells, detonate};
pub use enemy::{Enemy, spawn_enemies};
pub use grid::{Cell, Direction, Grid, Position, SPAWN};
pub use rng::{RandomSource, RngState, SequenceRandom};
pub use state::{Bomb, ExplosionBatch, GameEvent, GamePhase, SimulationState, Snapshot};
pub use tick::tick;
