//! Blast propagation
//!
//! A blast covers the bomb's own cell plus four independent rays. A ray stops
//! before the board edge or a hard block, and stops *after* the first soft
//! block it reaches.

use std::collections::BTreeSet;

use super::grid::{Cell, Direction, Grid, Position};

/// Cells reached by one bomb at `origin`. The origin always comes first.
pub fn blast_cells(grid: &Grid, origin: Position, range: u32) -> Vec<Position> {
    let mut cells = vec![origin];

    for dir in Direction::ALL {
        for distance in 1..=range as usize {
            let Some(pos) = origin.offset(dir, distance) else {
                break;
            };
            let Some(cell) = grid.get(pos) else {
                break;
            };
            if cell.blocks_blast() {
                break;
            }
            cells.push(pos);
            if cell == Cell::SoftBlock {
                break;
            }
        }
    }

    cells
}

/// Result of detonating every bomb that expired in one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detonation {
    /// Union of all blast cells
    pub cells: BTreeSet<Position>,
    /// Soft blocks removed from the board
    pub destroyed: Vec<Position>,
}

/// Blast every origin against the board as it stood at the start of the tick,
/// then clear the soft blocks the blasts reached.
///
/// Computing all rays first means two bombs going off together cannot reach
/// through a block that only one of them destroyed.
pub fn detonate(grid: &mut Grid, origins: &[(Position, u32)]) -> Detonation {
    let cells: BTreeSet<Position> = origins
        .iter()
        .flat_map(|&(origin, range)| blast_cells(grid, origin, range))
        .collect();

    let destroyed = cells
        .iter()
        .copied()
        .filter(|&pos| grid.destroy_soft_block(pos))
        .collect();

    Detonation { cells, destroyed }
}
