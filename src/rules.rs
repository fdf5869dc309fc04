//! Rule oracle: pure queries over a board state.
//!
//! Every function here is a pure function of its arguments. The search
//! engines consume only this module's answers (legal-move enumeration,
//! terminal and winner tests) plus the board's make/unmake operations.

use crate::board::{Board, EMPTY, Move, Side};

/// All empty cells on the board, in row-major order.
///
/// An empty result means the board is full. The ordering is load-bearing:
/// minimax enumerates candidates in this order and breaks ties by taking
/// the first optimal one.
pub fn empty_cells(board: &Board) -> Vec<Move> {
    let n = board.size();
    let mut cells = Vec::new();
    for row in 0..n {
        for col in 0..n {
            if board.cell(row, col) == EMPTY {
                cells.push(Move::new(row, col));
            }
        }
    }
    cells
}

/// Check whether a move targets an empty cell within bounds
pub fn is_valid_move(board: &Board, mv: Move) -> bool {
    board.is_empty_cell(mv)
}

/// Find the winning side, if any line is fully occupied by one side.
///
/// Scans every row, every column and both diagonals. A line of `n` equal
/// pieces sums to `+n` (noughts) or `-n` (crosses); mixed or incomplete
/// lines cannot reach magnitude `n`. Winner detection is independent of
/// fullness: a full board with no winning line returns `None` (a draw),
/// so callers distinguish "draw" from "game continues" via
/// [`is_board_full`].
pub fn winner(board: &Board) -> Option<Side> {
    let n = board.size();
    let target = n as i32;

    for row in 0..n {
        let sum: i32 = (0..n).map(|col| board.cell(row, col) as i32).sum();
        if sum.abs() == target {
            return Side::from_value(sum.signum() as i8);
        }
    }

    for col in 0..n {
        let sum: i32 = (0..n).map(|row| board.cell(row, col) as i32).sum();
        if sum.abs() == target {
            return Side::from_value(sum.signum() as i8);
        }
    }

    let diag: i32 = (0..n).map(|i| board.cell(i, i) as i32).sum();
    if diag.abs() == target {
        return Side::from_value(diag.signum() as i8);
    }

    let anti: i32 = (0..n).map(|i| board.cell(i, n - 1 - i) as i32).sum();
    if anti.abs() == target {
        return Side::from_value(anti.signum() as i8);
    }

    None
}

/// Check whether the last move completed a winning line.
///
/// Only the row, column and (anti-)diagonal through `mv` are summed, so
/// this is O(n) where [`winner`] is O(n^2). Used by MCTS rollouts, which
/// know exactly which cell changed; the answer is only meaningful when
/// `mv` was in fact the most recent move.
pub fn is_winning_move(board: &Board, mv: Move) -> bool {
    let n = board.size();
    let target = n as i32;
    let Move { row, col } = mv;

    let row_sum: i32 = (0..n).map(|c| board.cell(row, c) as i32).sum();
    if row_sum.abs() == target {
        return true;
    }

    let col_sum: i32 = (0..n).map(|r| board.cell(r, col) as i32).sum();
    if col_sum.abs() == target {
        return true;
    }

    if row == col {
        let diag: i32 = (0..n).map(|i| board.cell(i, i) as i32).sum();
        if diag.abs() == target {
            return true;
        }
    }

    if row == n - 1 - col {
        let anti: i32 = (0..n).map(|i| board.cell(i, n - 1 - i) as i32).sum();
        if anti.abs() == target {
            return true;
        }
    }

    false
}

/// Check whether every cell is occupied
pub fn is_board_full(board: &Board) -> bool {
    let n = board.size();
    (0..n).all(|row| (0..n).all(|col| board.cell(row, col) != EMPTY))
}

/// Check whether the game is over (a side has won, or the board is full)
pub fn is_terminal(board: &Board) -> bool {
    winner(board).is_some() || is_board_full(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[Vec<i8>]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    #[test]
    fn test_winner_empty_board() {
        let b = board(&[vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]]);
        assert_eq!(winner(&b), None);
    }

    #[test]
    fn test_winner_rows() {
        let b = board(&[vec![1, 1, 1], vec![0, -1, 0], vec![0, 0, -1]]);
        assert_eq!(winner(&b), Some(Side::Nought));

        let b = board(&[vec![0, 0, 0], vec![-1, -1, -1], vec![0, 0, 0]]);
        assert_eq!(winner(&b), Some(Side::Cross));

        let b = board(&[vec![0, 0, 0], vec![0, 0, 0], vec![1, -1, 1]]);
        assert_eq!(winner(&b), None);
    }

    #[test]
    fn test_winner_columns() {
        let b = board(&[vec![1, 0, 0], vec![1, 0, 0], vec![1, 0, 0]]);
        assert_eq!(winner(&b), Some(Side::Nought));

        let b = board(&[vec![0, -1, 0], vec![0, -1, 0], vec![0, -1, 0]]);
        assert_eq!(winner(&b), Some(Side::Cross));

        let b = board(&[vec![1, -1, -1], vec![1, 0, 0], vec![-1, 0, 0]]);
        assert_eq!(winner(&b), None);
    }

    #[test]
    fn test_winner_diagonals() {
        let b = board(&[vec![1, 0, 0], vec![-1, 1, 0], vec![1, 0, 1]]);
        assert_eq!(winner(&b), Some(Side::Nought));

        let b = board(&[vec![0, 0, 1], vec![0, 1, -1], vec![1, -1, -1]]);
        assert_eq!(winner(&b), Some(Side::Nought));

        let b = board(&[vec![-1, 0, 0], vec![0, -1, 0], vec![0, 0, -1]]);
        assert_eq!(winner(&b), Some(Side::Cross));

        let b = board(&[vec![0, 0, -1], vec![1, -1, 0], vec![-1, 0, 0]]);
        assert_eq!(winner(&b), Some(Side::Cross));
    }

    #[test]
    fn test_winner_mixed_signs_cancel() {
        // A line with both sides present can never sum to +-n
        let b = board(&[vec![-1, 0, 0], vec![-1, 1, 0], vec![1, 0, 1]]);
        assert_eq!(winner(&b), None);
    }

    #[test]
    fn test_full_board_no_winner_is_draw() {
        let b = board(&[vec![1, -1, -1], vec![-1, 1, 1], vec![1, -1, -1]]);
        assert_eq!(winner(&b), None);
        assert!(is_board_full(&b));
        assert!(is_terminal(&b));
    }

    #[test]
    fn test_is_board_full() {
        let b = board(&[vec![0, 0, 0], vec![0, 0, 0], vec![0, 0, 0]]);
        assert!(!is_board_full(&b));

        let b = board(&[vec![-1, 1, 1], vec![0, 1, -1], vec![1, 1, -1]]);
        assert!(!is_board_full(&b));

        let b = board(&[vec![1, 1, 1], vec![1, 1, 1], vec![1, 1, 1]]);
        assert!(is_board_full(&b));
    }

    #[test]
    fn test_empty_cells_row_major() {
        let b = board(&[vec![1, 0, 1], vec![1, 1, 1], vec![0, 1, 1]]);
        assert_eq!(empty_cells(&b), vec![Move::new(0, 1), Move::new(2, 0)]);

        let b = board(&[vec![1, 1, 1], vec![0, 0, 0], vec![-1, 1, 1]]);
        assert_eq!(
            empty_cells(&b),
            vec![Move::new(1, 0), Move::new(1, 1), Move::new(1, 2)]
        );
    }

    #[test]
    fn test_empty_cells_full_and_empty_boards() {
        let b = board(&[vec![1, -1, -1], vec![-1, 1, 1], vec![1, -1, 1]]);
        assert!(empty_cells(&b).is_empty());

        let b = Board::new(3).unwrap();
        let cells = empty_cells(&b);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], Move::new(0, 0));
        assert_eq!(cells[8], Move::new(2, 2));
    }

    #[test]
    fn test_is_valid_move() {
        let b = Board::new(3).unwrap();
        assert!(is_valid_move(&b, Move::new(0, 0)));
        assert!(is_valid_move(&b, Move::new(1, 2)));
        assert!(!is_valid_move(&b, Move::new(3, 0)));

        let b = board(&[vec![1, -1, -1], vec![-1, 1, 1], vec![1, -1, 1]]);
        assert!(!is_valid_move(&b, Move::new(0, 0)));
        assert!(!is_valid_move(&b, Move::new(2, 1)));
    }

    #[test]
    fn test_is_winning_move_checks_lines_through_cell() {
        let mut b = Board::new(3).unwrap();
        b.apply(Move::new(0, 0), Side::Cross).unwrap();
        b.apply(Move::new(0, 1), Side::Cross).unwrap();
        b.apply(Move::new(0, 2), Side::Cross).unwrap();
        assert!(is_winning_move(&b, Move::new(0, 2)));
        // A cell off the completed row sees no winning line through it
        assert!(!is_winning_move(&b, Move::new(2, 2)));
    }

    #[test]
    fn test_is_winning_move_anti_diagonal() {
        let b = board(&[vec![0, 0, 1], vec![0, 1, 0], vec![1, 0, 0]]);
        assert!(is_winning_move(&b, Move::new(1, 1)));
        assert!(is_winning_move(&b, Move::new(2, 0)));
    }

    #[test]
    fn test_winner_agrees_with_is_winning_move_on_last_move() {
        let mut b = Board::new(3).unwrap();
        let moves = [
            (Move::new(1, 1), Side::Nought),
            (Move::new(0, 0), Side::Cross),
            (Move::new(0, 2), Side::Nought),
            (Move::new(2, 2), Side::Cross),
            (Move::new(2, 0), Side::Nought),
        ];
        for (mv, side) in moves {
            b.apply(mv, side).unwrap();
            assert_eq!(winner(&b).is_some(), is_winning_move(&b, mv));
        }
        assert_eq!(winner(&b), Some(Side::Nought));
    }

    #[test]
    fn test_size_generic_winner() {
        // 4x4 board, crosses complete the second column
        let b = board(&[
            vec![0, -1, 0, 1],
            vec![1, -1, 0, 0],
            vec![0, -1, 1, 0],
            vec![0, -1, 0, 1],
        ]);
        assert_eq!(winner(&b), Some(Side::Cross));
        assert!(!is_board_full(&b));
    }
}
