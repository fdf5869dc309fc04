//! Board state representation and make/unmake move application

use std::fmt;

use serde::{Deserialize, Serialize};

/// Cell value for an unoccupied square
pub const EMPTY: i8 = 0;

/// A player side.
///
/// Sides are signed units: `Nought` is +1 and `Cross` is -1. The opponent
/// of a side is its negation, and a line of `n` equal pieces sums to
/// exactly `+n` or `-n`, which is how [`crate::rules::winner`] detects
/// wins without inspecting individual cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Nought,
    Cross,
}

impl Side {
    /// Signed unit value of this side (+1 for noughts, -1 for crosses)
    pub fn value(self) -> i8 {
        match self {
            Side::Nought => 1,
            Side::Cross => -1,
        }
    }

    /// Get the opponent side
    pub fn opponent(self) -> Side {
        match self {
            Side::Nought => Side::Cross,
            Side::Cross => Side::Nought,
        }
    }

    /// Game token used when rendering boards
    pub fn token(self) -> char {
        match self {
            Side::Nought => 'o',
            Side::Cross => 'x',
        }
    }

    /// Convert a signed cell value back to a side, if it is one
    pub fn from_value(value: i8) -> Option<Side> {
        match value {
            1 => Some(Side::Nought),
            -1 => Some(Side::Cross),
            _ => None,
        }
    }
}

/// A move coordinate, 0-indexed from the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: usize,
    pub col: usize,
}

impl Move {
    pub fn new(row: usize, col: usize) -> Self {
        Move { row, col }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// An n x n game board of signed cell values.
///
/// Cells hold `0` (empty), `+1` (nought) or `-1` (cross). The board is
/// square and its size is fixed at construction; the search engines are
/// size-generic over it.
///
/// Search code mutates a board in place via [`Board::apply`] and
/// [`Board::retract`] (make/unmake) to avoid allocating a copy per node.
/// Prefer [`Board::with_move`], which retracts on every exit path, over
/// pairing the two calls manually.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawBoard")]
pub struct Board {
    size: usize,
    cells: Vec<i8>,
}

/// Unvalidated wire form of a board; deserialization routes through
/// [`TryFrom`] so the same invariants hold as for [`Board::from_rows`].
#[derive(Deserialize)]
struct RawBoard {
    size: usize,
    cells: Vec<i8>,
}

impl TryFrom<RawBoard> for Board {
    type Error = crate::Error;

    fn try_from(raw: RawBoard) -> Result<Self, crate::Error> {
        let mut board = Board::new(raw.size)?;
        if raw.cells.len() != board.cells.len() {
            return Err(crate::Error::InvalidCellCount {
                expected: board.cells.len(),
                got: raw.cells.len(),
            });
        }
        for (idx, &value) in raw.cells.iter().enumerate() {
            if value != EMPTY && Side::from_value(value).is_none() {
                return Err(crate::Error::InvalidCellValue {
                    value,
                    row: idx / raw.size,
                    col: idx % raw.size,
                });
            }
        }
        board.cells = raw.cells;
        Ok(board)
    }
}

impl Board {
    /// Create an empty board of the given side length.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidBoardSize`] if `size` is zero.
    pub fn new(size: usize) -> Result<Self, crate::Error> {
        if size == 0 {
            return Err(crate::Error::InvalidBoardSize { size });
        }
        Ok(Board {
            size,
            cells: vec![EMPTY; size * size],
        })
    }

    /// Create a board from rows of signed cell values.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is not square, or any cell value is
    /// outside {-1, 0, 1}.
    pub fn from_rows(rows: &[Vec<i8>]) -> Result<Self, crate::Error> {
        let size = rows.len();
        let mut board = Board::new(size)?;
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(crate::Error::InvalidBoardShape {
                    row,
                    expected: size,
                    got: values.len(),
                });
            }
            for (col, &value) in values.iter().enumerate() {
                if value != EMPTY && Side::from_value(value).is_none() {
                    return Err(crate::Error::InvalidCellValue { value, row, col });
                }
                board.cells[row * size + col] = value;
            }
        }
        Ok(board)
    }

    /// Side length of the board
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells (n^2)
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get the signed value of a cell
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn cell(&self, row: usize, col: usize) -> i8 {
        assert!(row < self.size && col < self.size, "cell out of bounds");
        self.cells[row * self.size + col]
    }

    /// Get the side occupying a cell, if any
    pub fn side_at(&self, mv: Move) -> Option<Side> {
        Side::from_value(self.cell(mv.row, mv.col))
    }

    /// Check whether coordinates are on the board
    pub fn in_bounds(&self, mv: Move) -> bool {
        mv.row < self.size && mv.col < self.size
    }

    /// Check if a cell is empty (false when out of bounds)
    pub fn is_empty_cell(&self, mv: Move) -> bool {
        self.in_bounds(mv) && self.cell(mv.row, mv.col) == EMPTY
    }

    /// Place a side's piece on an empty cell (the "make" half of
    /// make/unmake).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] or [`crate::Error::InvalidMove`]
    /// if the cell is not a legal target. The board is unchanged on error.
    pub fn apply(&mut self, mv: Move, side: Side) -> Result<(), crate::Error> {
        if !self.in_bounds(mv) {
            return Err(crate::Error::OutOfBounds {
                row: mv.row,
                col: mv.col,
                size: self.size,
            });
        }
        let idx = mv.row * self.size + mv.col;
        if self.cells[idx] != EMPTY {
            return Err(crate::Error::InvalidMove {
                row: mv.row,
                col: mv.col,
            });
        }
        self.cells[idx] = side.value();
        Ok(())
    }

    /// Clear a cell (the "unmake" half of make/unmake).
    ///
    /// Only ever called on a cell previously filled by [`Board::apply`];
    /// cells are never reset otherwise.
    pub fn retract(&mut self, mv: Move) {
        assert!(self.in_bounds(mv), "retract out of bounds");
        self.cells[mv.row * self.size + mv.col] = EMPTY;
    }

    /// Apply a move, run `f` on the resulting position, then retract the
    /// move before returning.
    ///
    /// This is the scoped form of make/unmake used by the recursive
    /// search: the retract happens on every exit path of `f`, so sibling
    /// branches never observe a leaked mutation.
    ///
    /// # Errors
    ///
    /// Returns the [`Board::apply`] error if the move is illegal; `f` is
    /// not called in that case.
    pub fn with_move<T>(
        &mut self,
        mv: Move,
        side: Side,
        f: impl FnOnce(&mut Board) -> T,
    ) -> Result<T, crate::Error> {
        self.apply(mv, side)?;
        let result = f(self);
        self.retract(mv);
        Ok(result)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let token = match Side::from_value(self.cell(row, col)) {
                    Some(side) => side.token(),
                    None => '.',
                };
                write!(f, "{token}")?;
            }
            if row + 1 < self.size {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
