//! Board cells, positions and board generation

use serde::{Deserialize, Serialize};

use super::rng::RandomSource;

/// What occupies a board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Destructible: removed by the first blast that reaches it
    SoftBlock,
    /// Indestructible border or pillar
    HardBlock,
}

impl Cell {
    /// Can a player or enemy stand here?
    pub fn is_passable(self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Does a blast ray stop *before* this cell?
    pub fn blocks_blast(self) -> bool {
        matches!(self, Cell::HardBlock)
    }
}

/// Cardinal movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Position of this direction in `ALL`
    pub fn index(self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }

    /// (row, col) step
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }
}

/// A board coordinate, 0-indexed from the top-left corner
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Move `distance` tiles in `dir`. `None` if that leaves the top/left edge;
    /// the bottom/right edge is checked against the grid by the caller.
    pub fn offset(self, dir: Direction, distance: usize) -> Option<Self> {
        let (dr, dc) = dir.delta();
        let row = self.row.checked_add_signed(dr * distance as isize)?;
        let col = self.col.checked_add_signed(dc * distance as isize)?;
        Some(Self { row, col })
    }

    /// One tile in `dir`
    pub fn step(self, dir: Direction) -> Option<Self> {
        self.offset(dir, 1)
    }
}

/// Where the player starts; never a block
pub const SPAWN: Position = Position::new(1, 1);

/// Square board of cells, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a board: hard border, hard pillars on (even, even) cells, and
    /// soft blocks scattered over the rest with probability `density`.
    ///
    /// One draw is taken per candidate cell in row-major order, so a seeded
    /// source always yields the same board.
    pub fn generate(size: usize, density: f64, rng: &mut dyn RandomSource) -> Self {
        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size {
            for col in 0..size {
                let pos = Position::new(row, col);
                let cell = if Self::is_structural(size, pos) {
                    Cell::HardBlock
                } else if pos != SPAWN && rng.next_f64() < density {
                    Cell::SoftBlock
                } else {
                    Cell::Empty
                };
                cells.push(cell);
            }
        }
        Self { size, cells }
    }

    /// Border and pillar cells: always hard, whatever the density
    pub fn is_structural(size: usize, pos: Position) -> bool {
        let last = size.saturating_sub(1);
        pos.row == 0
            || pos.col == 0
            || pos.row == last
            || pos.col == last
            || (pos.row % 2 == 0 && pos.col % 2 == 0)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.row < self.size && pos.col < self.size
    }

    /// Cell at `pos`, or `None` off the board
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.in_bounds(pos)
            .then(|| self.cells[pos.row * self.size + pos.col])
    }

    /// In bounds and empty
    pub fn is_passable(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(Cell::is_passable)
    }

    /// Turn a soft block into an empty cell. Returns true if a block was removed.
    pub fn destroy_soft_block(&mut self, pos: Position) -> bool {
        if self.get(pos) != Some(Cell::SoftBlock) {
            return false;
        }
        self.cells[pos.row * self.size + pos.col] = Cell::Empty;
        true
    }

    /// Rows, top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.size.max(1))
    }

    /// Every empty cell, row-major
    pub fn empty_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.cells.len())
            .filter(|&i| self.cells[i] == Cell::Empty)
            .map(|i| Position::new(i / self.size, i % self.size))
    }

    pub fn count(&self, kind: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == kind).count()
    }

    /// Build a board from text rows: `#` hard, `+` soft, anything else empty
    #[cfg(test)]
    pub(crate) fn from_ascii(rows: &[&str]) -> Self {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for row in rows {
            assert_eq!(row.chars().count(), size, "board must be square");
            cells.extend(row.chars().map(|ch| match ch {
                '#' => Cell::HardBlock,
                '+' => Cell::SoftBlock,
                _ => Cell::Empty,
            }));
        }
        Self { size, cells }
    }

    /// Open board of `size` with only the structural blocks
    #[cfg(test)]
    pub(crate) fn open(size: usize) -> Self {
        Self::generate(size, 0.0, &mut super::rng::SequenceRandom::constant(0.5))
    }
}
