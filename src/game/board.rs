use std::fmt;

use super::player::{Side, Symbol};
use crate::error::{BoardError, MoveError};

pub const ROWS: usize = 3;
/// Width of a fresh board.
pub const BASE_COLS: usize = 3;
/// Width after the one-time extension.
pub const EXTENDED_COLS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Player,
    Opponent,
}

impl Cell {
    /// Side owning this cell, if any
    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            Cell::Player => Some(Side::Player),
            Cell::Opponent => Some(Side::Opponent),
        }
    }
}

/// Row/column coordinate on the board. Row 0 is the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Side of the board a new column is added on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Left,
}

impl Direction {
    /// Both directions in evaluation order.
    pub const ALL: [Direction; 2] = [Direction::Right, Direction::Left];

    /// Index of the added column on the widened board
    pub fn new_column(self) -> usize {
        match self {
            Direction::Right => EXTENDED_COLS - 1,
            Direction::Left => 0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::Left => "left",
        }
    }
}

/// Three rows of cells, three columns wide until the board is extended.
///
/// Cells beyond `cols` are always `Cell::Empty`, so two boards of the same
/// width compare equal exactly when their visible cells do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [[Cell; EXTENDED_COLS]; ROWS],
    cols: usize,
}

impl Board {
    /// Create a new empty 3x3 board
    pub fn new() -> Self {
        Board {
            cells: [[Cell::Empty; EXTENDED_COLS]; ROWS],
            cols: BASE_COLS,
        }
    }

    /// Number of columns currently in play
    pub fn width(&self) -> usize {
        self.cols
    }

    /// Whether the extra column has been added
    pub fn is_extended(&self) -> bool {
        self.cols == EXTENDED_COLS
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.row < ROWS && pos.col < self.cols
    }

    /// Get the cell at a specific position
    pub fn get(&self, pos: Position) -> Cell {
        self.cells[pos.row][pos.col]
    }

    /// Put a mark on an empty, in-range cell.
    pub fn place(&mut self, pos: Position, cell: Cell) -> Result<(), MoveError> {
        if cell == Cell::Empty {
            return Err(MoveError::EmptyMark);
        }
        if !self.contains(pos) {
            return Err(MoveError::OutOfRange(pos));
        }
        if self.get(pos) != Cell::Empty {
            return Err(MoveError::Occupied(pos));
        }
        self.cells[pos.row][pos.col] = cell;
        Ok(())
    }

    /// Copy of this board with one more mark. The caller guarantees `pos` is
    /// an empty cell in range.
    pub(crate) fn with(&self, pos: Position, cell: Cell) -> Board {
        debug_assert!(self.contains(pos) && self.get(pos) == Cell::Empty);
        let mut next = *self;
        next.cells[pos.row][pos.col] = cell;
        next
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.positions().all(|pos| self.get(pos) != Cell::Empty)
    }

    /// Every in-range position, row-major
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..ROWS).flat_map(move |row| (0..cols).map(move |col| Position::new(row, col)))
    }

    /// Empty positions, row-major
    pub fn empty_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.positions().filter(|&pos| self.get(pos) == Cell::Empty)
    }

    /// Copy of this board with an empty column added on `direction`'s side.
    pub fn widened(&self, direction: Direction) -> Result<Board, BoardError> {
        if self.is_extended() {
            return Err(BoardError::AlreadyExtended);
        }
        let mut next = Board {
            cells: [[Cell::Empty; EXTENDED_COLS]; ROWS],
            cols: EXTENDED_COLS,
        };
        let offset = match direction {
            Direction::Right => 0,
            Direction::Left => 1,
        };
        for row in 0..ROWS {
            for col in 0..BASE_COLS {
                next.cells[row][col + offset] = self.cells[row][col];
            }
        }
        Ok(next)
    }

    /// Build a board from text rows, one character per cell. The player's
    /// symbol maps to `Cell::Player`, the other symbol to `Cell::Opponent`,
    /// and `.`, `-`, `_` or a space to `Cell::Empty`.
    pub fn parse(rows: &[&str], player: Symbol) -> Result<Board, BoardError> {
        if rows.len() != ROWS {
            return Err(BoardError::Parse(format!(
                "expected {ROWS} rows, got {}",
                rows.len()
            )));
        }
        let width = rows[0].chars().count();
        if width != BASE_COLS && width != EXTENDED_COLS {
            return Err(BoardError::Parse(format!(
                "rows must be {BASE_COLS} or {EXTENDED_COLS} cells wide, got {width}"
            )));
        }

        let mut board = Board::new();
        board.cols = width;
        for (row, text) in rows.iter().enumerate() {
            if text.chars().count() != width {
                return Err(BoardError::Parse(format!("row {row} has a different width")));
            }
            for (col, c) in text.chars().enumerate() {
                board.cells[row][col] = match c {
                    '.' | '-' | '_' | ' ' => Cell::Empty,
                    c => match Symbol::from_char(c) {
                        Some(s) if s == player => Cell::Player,
                        Some(_) => Cell::Opponent,
                        None => {
                            return Err(BoardError::Parse(format!(
                                "unexpected character {c:?} at ({row}, {col})"
                            )))
                        }
                    },
                };
            }
        }
        Ok(board)
    }

    /// Text rendering using the round's symbols, one line per row.
    pub fn render(&self, player: Symbol) -> String {
        let mut out = String::with_capacity(ROWS * (self.cols + 1));
        for row in 0..ROWS {
            if row > 0 {
                out.push('\n');
            }
            for col in 0..self.cols {
                out.push(match self.cells[row][col] {
                    Cell::Empty => '.',
                    Cell::Player => player.as_char(),
                    Cell::Opponent => player.other().as_char(),
                });
            }
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
