//! Player input handlers
//!
//! Input is applied the moment it arrives, between ticks. Anything that cannot
//! happen (walking into a wall, a second bomb on the same cell, input after the
//! session ended) is silently ignored.

use super::grid::Direction;
use super::state::{Bomb, SimulationState};

/// Step the player one tile. Returns true if the player moved.
pub fn move_player(state: &mut SimulationState, dir: Direction) -> bool {
    if !state.is_running() {
        return false;
    }
    match state.player.step(dir) {
        Some(target) if state.grid.is_passable(target) => {
            state.player = target;
            true
        }
        _ => false,
    }
}

/// Drop a bomb on the player's cell. Returns true if a bomb was placed.
pub fn place_bomb(state: &mut SimulationState) -> bool {
    if !state.is_running() || state.bomb_at(state.player).is_some() {
        return false;
    }
    let bomb = Bomb {
        pos: state.player,
        remaining_ms: i64::from(state.settings.bomb_timer_ms),
        range: state.settings.blast_range,
    };
    log::debug!(
        "Bomb placed at ({}, {}), fuse {}ms",
        bomb.pos.row,
        bomb.pos.col,
        bomb.remaining_ms
    );
    state.bombs.push(bomb);
    true
}
