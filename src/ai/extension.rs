//! Deciding whether, and how, the computer can turn a drawn 3x3 board into a
//! win by adding one column.
//!
//! Each direction is examined on its own with four checks, tried in a fixed
//! order; the first check that succeeds decides that direction's strategy:
//!
//! 1. [`Strategy::Immediate`]: one mark in the new column completes a line.
//! 2. [`Strategy::RowCompletion`]: a row already holds two opponent marks next
//!    to the new column.
//! 3. [`Strategy::Diagonal`]: a fixed diagonal pair for that direction.
//! 4. [`Strategy::TwoStep`]: two marks in the new column complete a line.
//!
//! A later check is never consulted once an earlier one succeeds, even when
//! it would rank higher.

use tracing::{debug, info, instrument};

use crate::game::{find_winning_line, Board, Cell, Direction, Position, ROWS};

/// Strategy tags in ascending rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    TwoStep,
    Diagonal,
    RowCompletion,
    Immediate,
}

impl StrategyKind {
    /// Numeric rank used when both directions offer a strategy
    pub fn priority(self) -> u8 {
        match self {
            StrategyKind::Immediate => 10,
            StrategyKind::RowCompletion => 8,
            StrategyKind::Diagonal => 7,
            StrategyKind::TwoStep => 6,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StrategyKind::Immediate => "immediate",
            StrategyKind::RowCompletion => "row",
            StrategyKind::Diagonal => "diagonal",
            StrategyKind::TwoStep => "two-step",
        }
    }
}

/// How the computer intends to play the new column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Mark `row` of the new column; this completes a line.
    Immediate { row: usize },
    /// Mark `row` of the new column next to two opponent marks.
    RowCompletion { row: usize },
    /// Mark the top cell of the new column.
    Diagonal,
    /// Mark two cells of the new column, one after the other. Positions are
    /// on the widened board.
    TwoStep { first: Position, second: Position },
}

impl Strategy {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Immediate { .. } => StrategyKind::Immediate,
            Strategy::RowCompletion { .. } => StrategyKind::RowCompletion,
            Strategy::Diagonal => StrategyKind::Diagonal,
            Strategy::TwoStep { .. } => StrategyKind::TwoStep,
        }
    }

    pub fn priority(&self) -> u8 {
        self.kind().priority()
    }

    /// Cells to mark on the board widened towards `direction`, in order.
    pub fn placements(&self, direction: Direction) -> Vec<Position> {
        let col = direction.new_column();
        match *self {
            Strategy::Immediate { row } | Strategy::RowCompletion { row } => {
                vec![Position::new(row, col)]
            }
            Strategy::Diagonal => vec![Position::new(0, col)],
            Strategy::TwoStep { first, second } => vec![first, second],
        }
    }
}

/// The chosen direction and what to play there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExtensionPlan {
    pub direction: Direction,
    pub strategy: Strategy,
}

impl ExtensionPlan {
    /// Cells to mark after widening, in order
    pub fn placements(&self) -> Vec<Position> {
        self.strategy.placements(self.direction)
    }
}

/// Evaluate both directions on a drawn 3x3 board and pick one.
///
/// When both directions have a strategy the higher priority wins, with ties
/// going to the right. `None` means the round is a draw.
#[instrument(level = "debug", skip_all)]
pub fn plan_extension(board: &Board) -> Option<ExtensionPlan> {
    let right = evaluate_direction(board, Direction::Right);
    let left = evaluate_direction(board, Direction::Left);
    debug!(?right, ?left, "extension candidates");

    let plan = match (right, left) {
        (Some(r), Some(l)) if r.priority() >= l.priority() => Some((Direction::Right, r)),
        (Some(_), Some(l)) => Some((Direction::Left, l)),
        (Some(r), None) => Some((Direction::Right, r)),
        (None, Some(l)) => Some((Direction::Left, l)),
        (None, None) => None,
    }
    .map(|(direction, strategy)| ExtensionPlan { direction, strategy });

    match &plan {
        Some(p) => info!(
            direction = p.direction.name(),
            strategy = p.strategy.kind().name(),
            "extension planned"
        ),
        None => info!("no winning extension"),
    }
    plan
}

/// First successful check for one direction. `None` if the board has already
/// been extended or no check succeeds.
pub fn evaluate_direction(board: &Board, direction: Direction) -> Option<Strategy> {
    let wide = board.widened(direction).ok()?;
    find_immediate_win(&wide, direction)
        .or_else(|| find_row_completion(board, direction))
        .or_else(|| find_diagonal(board, direction))
        .or_else(|| {
            find_two_step_win(&wide, direction.new_column())
                .map(|(first, second)| Strategy::TwoStep { first, second })
        })
}

/// Check 1: a single opponent mark in the new column of `wide` completes a
/// line. Rows are tried top to bottom.
pub fn find_immediate_win(wide: &Board, direction: Direction) -> Option<Strategy> {
    let col = direction.new_column();
    (0..ROWS)
        .map(|row| Position::new(row, col))
        .find(|&pos| {
            wide.get(pos) == Cell::Empty
                && find_winning_line(&wide.with(pos, Cell::Opponent)).is_some()
        })
        .map(|pos| Strategy::Immediate { row: pos.row })
}

/// Check 2: on the unwidened board, the two cells of a row nearest the new
/// column both belong to the opponent.
pub fn find_row_completion(board: &Board, direction: Direction) -> Option<Strategy> {
    let (a, b) = match direction {
        Direction::Right => (1, 2),
        Direction::Left => (0, 1),
    };
    (0..ROWS)
        .find(|&row| {
            board.get(Position::new(row, a)) == Cell::Opponent
                && board.get(Position::new(row, b)) == Cell::Opponent
        })
        .map(|row| Strategy::RowCompletion { row })
}

/// Check 3: one fixed diagonal pair per direction on the unwidened board,
/// (1,2)+(2,1) for the right and (1,1)+(2,2) for the left.
pub fn find_diagonal(board: &Board, direction: Direction) -> Option<Strategy> {
    let pair = match direction {
        Direction::Right => [Position::new(1, 2), Position::new(2, 1)],
        Direction::Left => [Position::new(1, 1), Position::new(2, 2)],
    };
    pair.iter()
        .all(|&pos| board.get(pos) == Cell::Opponent)
        .then_some(Strategy::Diagonal)
}

/// Check 4: two opponent marks in column `col` of `wide` that together
/// complete a line. Pairs of empty rows are tried in ascending order.
pub fn find_two_step_win(wide: &Board, col: usize) -> Option<(Position, Position)> {
    let open: Vec<Position> = (0..ROWS)
        .map(|row| Position::new(row, col))
        .filter(|&pos| wide.get(pos) == Cell::Empty)
        .collect();

    for (i, &first) in open.iter().enumerate() {
        for &second in &open[i + 1..] {
            let trial = wide
                .with(first, Cell::Opponent)
                .with(second, Cell::Opponent);
            if find_winning_line(&trial).is_some() {
                return Some((first, second));
            }
        }
    }
    None
}
