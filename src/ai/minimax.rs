use tracing::{debug, instrument};

use crate::game::{winner, Board, Cell, Position, Side};

/// Terminal value of a won position, before the depth adjustment.
pub const WIN_SCORE: i32 = 10;

/// Score a finished 3x3 position from the opponent's point of view:
/// `+WIN_SCORE` if the opponent has a line, `-WIN_SCORE` if the player does,
/// `0` for a full board without a line, `None` while play can continue.
pub fn evaluate(board: &Board) -> Option<i32> {
    match winner(board) {
        Some(Side::Opponent) => Some(WIN_SCORE),
        Some(Side::Player) => Some(-WIN_SCORE),
        None if board.is_full() => Some(0),
        None => None,
    }
}

/// Exhaustive minimax with alpha-beta pruning for the unextended 3x3 board.
///
/// The opponent is the maximizing side. Every recursive call works on its own
/// board copy, so the caller's board is never modified.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimaxSolver;

impl MinimaxSolver {
    pub fn new() -> Self {
        MinimaxSolver
    }

    /// The opponent's best reply, or `None` if the board is full, already
    /// won, or has been extended.
    ///
    /// Ties keep the first candidate in row-major order.
    #[instrument(level = "debug", skip_all)]
    pub fn best_opponent_move(&self, board: &Board) -> Option<Position> {
        let mut best: Option<(Position, i32)> = None;
        for (pos, score) in self.score_moves(board) {
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((pos, score));
            }
        }
        if let Some((pos, score)) = best {
            debug!(row = pos.row, col = pos.col, score, "minimax move");
        }
        best.map(|(pos, _)| pos)
    }

    /// Score of every opponent move, row-major. Empty when there is nothing
    /// to search.
    pub fn score_moves(&self, board: &Board) -> Vec<(Position, i32)> {
        if board.is_extended() || evaluate(board).is_some() {
            return Vec::new();
        }
        board
            .empty_positions()
            .map(|pos| {
                let next = board.with(pos, Cell::Opponent);
                (pos, self.alphabeta(&next, 0, false, i32::MIN, i32::MAX))
            })
            .collect()
    }

    fn alphabeta(
        &self,
        board: &Board,
        depth: i32,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        if let Some(score) = evaluate(board) {
            return score - depth;
        }

        if maximizing {
            let mut max_eval = i32::MIN;
            for pos in board.empty_positions() {
                let next = board.with(pos, Cell::Opponent);
                let eval = self.alphabeta(&next, depth + 1, false, alpha, beta);
                max_eval = max_eval.max(eval);
                alpha = alpha.max(eval);
                if beta <= alpha {
                    break;
                }
            }
            max_eval
        } else {
            let mut min_eval = i32::MAX;
            for pos in board.empty_positions() {
                let next = board.with(pos, Cell::Player);
                let eval = self.alphabeta(&next, depth + 1, true, alpha, beta);
                min_eval = min_eval.min(eval);
                beta = beta.min(eval);
                if beta <= alpha {
                    break;
                }
            }
            min_eval
        }
    }
}
