//! Text rendering of a snapshot
//!
//! One glyph per cell, one line per row. Used by the browser host's board
//! element and by the native autoplay demo.

use crate::sim::{Cell, Position, Snapshot};

pub const GLYPH_EMPTY: char = '.';
pub const GLYPH_HARD: char = '#';
pub const GLYPH_SOFT: char = '+';
pub const GLYPH_PLAYER: char = '@';
pub const GLYPH_ENEMY: char = 'E';
pub const GLYPH_BOMB: char = 'o';
pub const GLYPH_EXPLOSION: char = '*';

/// Draw the board. Explosions cover everything, then the player, enemies, bombs.
pub fn board_text(snapshot: &Snapshot<'_>) -> String {
    let size = snapshot.grid.size();
    let mut out = String::with_capacity(size * (size + 1));

    for (row, cells) in snapshot.grid.rows().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            let pos = Position::new(row, col);
            let glyph = if snapshot.explosions.binary_search(&pos).is_ok() {
                GLYPH_EXPLOSION
            } else if snapshot.player == pos {
                GLYPH_PLAYER
            } else if snapshot.enemies.contains(&pos) {
                GLYPH_ENEMY
            } else if snapshot.bombs.contains(&pos) {
                GLYPH_BOMB
            } else {
                match cell {
                    Cell::Empty => GLYPH_EMPTY,
                    Cell::SoftBlock => GLYPH_SOFT,
                    Cell::HardBlock => GLYPH_HARD,
                }
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}
