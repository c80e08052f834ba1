//! Three-in-a-row detection over a board of any supported width.

use super::board::{Board, Cell, Position, ROWS};
use super::player::Side;

/// A completed line, given by its two end cells. The middle cell is the
/// midpoint of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Line {
    pub start: Position,
    pub end: Position,
}

impl Line {
    pub fn new(start: Position, end: Position) -> Self {
        Line { start, end }
    }

    pub fn middle(&self) -> Position {
        Position::new(
            (self.start.row + self.end.row) / 2,
            (self.start.col + self.end.col) / 2,
        )
    }

    /// All three cells from start to end
    pub fn cells(&self) -> [Position; 3] {
        [self.start, self.middle(), self.end]
    }
}

fn same_mark(board: &Board, a: Position, b: Position, c: Position) -> bool {
    let first = board.get(a);
    first != Cell::Empty && first == board.get(b) && first == board.get(c)
}

/// Find the first completed line on the board.
///
/// Scan order is rows top to bottom (every start column), columns left to
/// right, then each primary-diagonal window (top-left to bottom-right), then
/// each anti-diagonal window (bottom-left to top-right). The first hit is
/// returned even if other lines are also complete.
pub fn find_winning_line(board: &Board) -> Option<Line> {
    let width = board.width();

    for row in 0..ROWS {
        for col in 0..=width - 3 {
            let (a, b, c) = (
                Position::new(row, col),
                Position::new(row, col + 1),
                Position::new(row, col + 2),
            );
            if same_mark(board, a, b, c) {
                return Some(Line::new(a, c));
            }
        }
    }

    for col in 0..width {
        let (a, b, c) = (
            Position::new(0, col),
            Position::new(1, col),
            Position::new(2, col),
        );
        if same_mark(board, a, b, c) {
            return Some(Line::new(a, c));
        }
    }

    for col in 0..=width - 3 {
        let (a, b, c) = (
            Position::new(0, col),
            Position::new(1, col + 1),
            Position::new(2, col + 2),
        );
        if same_mark(board, a, b, c) {
            return Some(Line::new(a, c));
        }
    }

    for col in 0..=width - 3 {
        let (a, b, c) = (
            Position::new(2, col),
            Position::new(1, col + 1),
            Position::new(0, col + 2),
        );
        if same_mark(board, a, b, c) {
            return Some(Line::new(a, c));
        }
    }

    None
}

/// Owner of the first completed line, if any
pub fn winner(board: &Board) -> Option<Side> {
    find_winning_line(board).and_then(|line| board.get(line.start).side())
}
