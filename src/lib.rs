//! Game-tree search for generalized n-in-a-row Tic-Tac-Toe
//!
//! This crate provides:
//! - A size-generic board with in-place make/unmake move application
//! - A pure rule oracle (legal moves, winner, terminal tests)
//! - An exhaustive minimax solver with optional depth-aware scoring
//! - A Monte Carlo tree search engine with random-walk and UCB1 policies
//! - Read-only access to the MCTS search tree for external tooling
//!
//! The turn-taking game loop, human input and rendering are deliberately
//! external: callers hand an engine a board and a side, get back a move
//! coordinate, and apply it themselves.

pub mod board;
pub mod error;
pub mod rules;
pub mod search;

pub use board::{Board, EMPTY, Move, Side};
pub use error::{Error, Result};
pub use search::{
    Budget, Engine, Mcts, MctsConfig, Minimax, Node, NodeId, Scoring, SearchTree, SelectionPolicy,
};
