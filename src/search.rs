//! Search engines and the shared tree structure.
//!
//! Both engines implement [`Engine`], take the caller's board by
//! reference, and return a move without observably mutating the board.
//! The caller (a game loop) is expected to validate and apply the move
//! through the rule oracle and ask again next turn.

pub mod mcts;
pub mod minimax;
pub mod tree;

pub use mcts::{Budget, Mcts, MctsConfig, SelectionPolicy};
pub use minimax::{Minimax, Scoring};
pub use tree::{Node, NodeId, SearchTree};

use crate::board::{Board, Move, Side};

/// A move-choosing engine.
///
/// Takes `&mut self` because stochastic engines advance their RNG and
/// retain their search tree; the board argument is never mutated.
pub trait Engine {
    /// Choose a move for `side` on `board`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GameOver`] when the position is terminal;
    /// other variants indicate a caller bug (e.g. a board inconsistent
    /// with the rule oracle) and should be propagated, not corrected.
    fn choose_move(&mut self, board: &Board, side: Side) -> Result<Move, crate::Error>;
}
