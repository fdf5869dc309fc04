//! Error types for the mnk-search crate

use thiserror::Error;

/// Main error type for the mnk-search crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("cell ({row}, {col}) is outside the {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },

    #[error("invalid move: cell ({row}, {col}) is already occupied")]
    InvalidMove { row: usize, col: usize },

    #[error("invalid board size {size} (must be at least 1)")]
    InvalidBoardSize { size: usize },

    #[error("row {row} has {got} cells, expected {expected}")]
    InvalidBoardShape {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("invalid cell value {value} at ({row}, {col}) (must be -1, 0 or 1)")]
    InvalidCellValue { value: i8, row: usize, col: usize },

    #[error("board has {got} cells, expected {expected}")]
    InvalidCellCount { expected: usize, got: usize },

    #[error("game already over")]
    GameOver,

    #[error("no valid moves available")]
    NoValidMoves,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;
