//! Enemy placement and random-walk movement
//!
//! Enemies do not chase anyone: each step picks one of the four directions
//! uniformly and takes it if the target cell is empty. Other enemies and the
//! player are not obstacles, so enemies may share cells while moving.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::grid::{Direction, Grid, Position, SPAWN};
use super::rng::RandomSource;
use crate::consts::SPAWN_ATTEMPTS_PER_CELL;
use crate::error::SessionError;

/// A wandering enemy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub pos: Position,
    /// Direction of the last successful step
    pub facing: Direction,
}

impl Enemy {
    /// Try one random step. Facing only changes when the step succeeds.
    pub fn wander(&mut self, grid: &Grid, rng: &mut dyn RandomSource) -> bool {
        let dir = rng.next_direction();
        match self.pos.step(dir) {
            Some(target) if grid.is_passable(target) => {
                self.pos = target;
                self.facing = dir;
                true
            }
            _ => false,
        }
    }
}

/// Place `count` enemies on distinct empty interior cells, never on spawn.
///
/// Sampling is random with a bounded number of probes; a board without
/// enough empty cells fails up front.
pub fn spawn_enemies(
    grid: &Grid,
    count: usize,
    rng: &mut dyn RandomSource,
) -> Result<Vec<Enemy>, SessionError> {
    let available = grid.empty_cells().filter(|&p| p != SPAWN).count();
    if count > available {
        return Err(SessionError::NotEnoughRoom {
            requested: count,
            available,
        });
    }

    let size = grid.size();
    let interior = size.saturating_sub(2).max(1);
    let max_attempts = size * size * SPAWN_ATTEMPTS_PER_CELL;

    let mut enemies = Vec::with_capacity(count);
    let mut occupied = HashSet::with_capacity(count);
    let mut attempts = 0;

    while enemies.len() < count {
        if attempts == max_attempts {
            return Err(SessionError::SpawnExhausted {
                placed: enemies.len(),
                requested: count,
                attempts,
            });
        }
        attempts += 1;

        let pos = Position::new(rng.next_below(interior) + 1, rng.next_below(interior) + 1);
        if pos == SPAWN || !grid.is_passable(pos) || occupied.contains(&pos) {
            continue;
        }

        occupied.insert(pos);
        enemies.push(Enemy {
            id: enemies.len() as u32,
            pos,
            facing: rng.next_direction(),
        });
    }

    log::debug!("Spawned {} enemies in {} attempts", enemies.len(), attempts);
    Ok(enemies)
}
