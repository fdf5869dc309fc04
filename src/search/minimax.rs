//! Exhaustive minimax solver.
//!
//! Full-width depth-first search over every legal continuation, using
//! make/unmake on a single scratch board rather than copying per node.
//! On small boards this solves the game outright; there is no depth
//! cutoff and no time budget (callers wanting bounded search impose
//! their own).

use serde::{Deserialize, Serialize};

use crate::board::{Board, Move, Side};
use crate::rules;
use crate::search::Engine;

/// Leaf scoring variant for the solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scoring {
    /// Flat +-1 for a win/loss regardless of distance
    Flat,
    /// Win at depth d scores `base - d`, loss scores `d - base`, with
    /// `base = n^2 + 1`. Faster wins and slower losses score better, so
    /// the solver takes an immediate win instead of an equally certain
    /// delayed one. The winner is unchanged, only the preference among
    /// equally-winning lines.
    DepthAware,
}

/// Minimax engine.
///
/// `best_move` and `evaluate` are pure functions of (board, side): the
/// caller's board is cloned once per call and never observably mutated,
/// and ties between equally-valued moves always resolve to the first in
/// row-major order.
#[derive(Debug, Clone, Copy)]
pub struct Minimax {
    scoring: Scoring,
}

impl Minimax {
    /// Create a solver with flat +-1 leaf scoring
    pub fn new() -> Self {
        Minimax {
            scoring: Scoring::Flat,
        }
    }

    /// Create a solver with the given leaf scoring
    pub fn with_scoring(scoring: Scoring) -> Self {
        Minimax { scoring }
    }

    /// Game-theoretic value of the position for `side`.
    ///
    /// Positive means `side` wins with optimal play, negative means the
    /// opponent does, zero is a draw. Terminal boards are valued
    /// directly without recursing.
    pub fn evaluate(&self, board: &Board, side: Side) -> Result<i32, crate::Error> {
        let mut scratch = board.clone();
        let base = win_base(board);
        let (value, _) = self.solve(&mut scratch, side, side, 0, base)?;
        Ok(value)
    }

    /// Optimal move for `side` and the value it achieves.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GameOver`] if the position is already
    /// terminal (there is no move to return; use [`Minimax::evaluate`]
    /// for the terminal value).
    pub fn best_move(&self, board: &Board, side: Side) -> Result<(i32, Move), crate::Error> {
        if rules::is_terminal(board) {
            return Err(crate::Error::GameOver);
        }
        let mut scratch = board.clone();
        let base = win_base(board);
        let (value, mv) = self.solve(&mut scratch, side, side, 0, base)?;
        // A non-terminal position always has at least one candidate
        let mv = mv.ok_or(crate::Error::NoValidMoves)?;
        Ok((value, mv))
    }

    /// Recursive depth-first search.
    ///
    /// `searcher` is the side the search was invoked for and stays fixed
    /// down the whole recursion; `to_move` alternates every ply. Leaf
    /// values are always from the searcher's perspective, so `to_move ==
    /// searcher` levels maximize and the others minimize.
    fn solve(
        &self,
        board: &mut Board,
        to_move: Side,
        searcher: Side,
        depth: u32,
        base: i32,
    ) -> Result<(i32, Option<Move>), crate::Error> {
        if let Some(winning_side) = rules::winner(board) {
            let value = self.leaf_value(winning_side == searcher, depth, base);
            return Ok((value, None));
        }
        if rules::is_board_full(board) {
            return Ok((0, None));
        }

        let mut best_value: Option<i32> = None;
        let mut best_move: Option<Move> = None;

        for mv in rules::empty_cells(board) {
            let (value, _) = board.with_move(mv, to_move, |b| {
                self.solve(b, to_move.opponent(), searcher, depth + 1, base)
            })??;

            // Strict comparison keeps the first optimal move in
            // row-major order.
            let improved = match best_value {
                None => true,
                Some(best) if to_move == searcher => value > best,
                Some(best) => value < best,
            };
            if improved {
                best_value = Some(value);
                best_move = Some(mv);
            }
        }

        // Unreachable with a consistent rule oracle: a non-terminal
        // board always has empty cells.
        let value = best_value.ok_or(crate::Error::NoValidMoves)?;
        Ok((value, best_move))
    }

    fn leaf_value(&self, searcher_won: bool, depth: u32, base: i32) -> i32 {
        match self.scoring {
            Scoring::Flat => {
                if searcher_won {
                    1
                } else {
                    -1
                }
            }
            Scoring::DepthAware => {
                if searcher_won {
                    base - depth as i32
                } else {
                    depth as i32 - base
                }
            }
        }
    }
}

/// Depth-aware win score base; exceeds the deepest possible search (n^2
/// plies), so a win at any depth still outscores every draw and loss.
fn win_base(board: &Board) -> i32 {
    board.cell_count() as i32 + 1
}

impl Default for Minimax {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Minimax {
    fn choose_move(&mut self, board: &Board, side: Side) -> Result<Move, crate::Error> {
        self.best_move(board, side).map(|(_, mv)| mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[Vec<i8>]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_completes_winning_row() {
        let b = board(&[vec![-1, -1, 0], vec![0, 0, 0], vec![0, 0, 0]]);
        let (value, mv) = Minimax::new().best_move(&b, Side::Cross).unwrap();
        assert_eq!(mv, Move::new(0, 2));
        assert_eq!(value, 1);
    }

    #[test]
    fn test_blocks_opponent_win() {
        // Noughts to move; crosses threaten the top row at (0, 2)
        let b = board(&[vec![-1, -1, 0], vec![0, 1, 0], vec![0, 0, 0]]);
        let (_, mv) = Minimax::new().best_move(&b, Side::Nought).unwrap();
        assert_eq!(mv, Move::new(0, 2));
    }

    #[test]
    fn test_terminal_board_is_game_over() {
        let b = board(&[vec![-1, -1, -1], vec![1, 1, 0], vec![0, 0, 0]]);
        let result = Minimax::new().best_move(&b, Side::Nought);
        assert!(matches!(result, Err(crate::Error::GameOver)));
    }

    #[test]
    fn test_evaluate_terminal_board() {
        let b = board(&[vec![-1, -1, -1], vec![1, 1, 0], vec![0, 0, 0]]);
        assert_eq!(Minimax::new().evaluate(&b, Side::Cross).unwrap(), 1);
        assert_eq!(Minimax::new().evaluate(&b, Side::Nought).unwrap(), -1);

        let draw = board(&[vec![1, -1, -1], vec![-1, 1, 1], vec![1, -1, -1]]);
        assert_eq!(Minimax::new().evaluate(&draw, Side::Nought).unwrap(), 0);
    }

    #[test]
    fn test_caller_board_not_mutated() {
        let b = board(&[vec![-1, -1, 0], vec![0, 1, 0], vec![0, 0, 0]]);
        let before = b.clone();
        Minimax::new().best_move(&b, Side::Cross).unwrap();
        assert_eq!(b, before);
    }

    #[test]
    fn test_depth_aware_takes_immediate_win() {
        // Crosses win immediately at (1, 2), but (0, 1) also forces a win
        // two plies later via a double threat. Flat scoring values both at
        // +1 and row-major order makes it report the delayed win first;
        // depth-aware scoring must take the one-ply win.
        let b = board(&[vec![1, 0, 0], vec![-1, -1, 0], vec![0, 0, 1]]);

        let (flat_value, flat_mv) = Minimax::new().best_move(&b, Side::Cross).unwrap();
        assert_eq!(flat_value, 1);
        assert_eq!(flat_mv, Move::new(0, 1));

        let solver = Minimax::with_scoring(Scoring::DepthAware);
        let (value, mv) = solver.best_move(&b, Side::Cross).unwrap();
        assert_eq!(mv, Move::new(1, 2));
        // Win at depth 1: base (10) - 1
        assert_eq!(value, 9);
    }

    #[test]
    fn test_depth_aware_agrees_with_flat_on_outcome_sign() {
        let b = board(&[vec![-1, 0, 0], vec![0, 0, 0], vec![0, 0, -1]]);
        let flat = Minimax::new().evaluate(&b, Side::Cross).unwrap();
        let aware = Minimax::with_scoring(Scoring::DepthAware)
            .evaluate(&b, Side::Cross)
            .unwrap();
        assert_eq!(flat.signum(), aware.signum());
    }

    #[test]
    fn test_deterministic_across_calls() {
        let b = board(&[vec![1, 0, -1], vec![0, -1, 0], vec![0, 1, 0]]);
        let solver = Minimax::new();
        let first = solver.best_move(&b, Side::Nought).unwrap();
        let second = solver.best_move(&b, Side::Nought).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_engine_trait() {
        let b = board(&[vec![-1, -1, 0], vec![0, 0, 0], vec![0, 0, 0]]);
        let mut engine = Minimax::new();
        assert_eq!(engine.choose_move(&b, Side::Cross).unwrap(), Move::new(0, 2));
    }
}
