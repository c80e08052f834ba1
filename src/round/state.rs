use crate::game::{Board, Line, Position, Side};

/// Where a round is in its lifecycle. Phases only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Waiting for the human to pick X or O.
    ChoosingSymbol,
    /// Turns alternate on the 3x3 board.
    Playing,
    /// The 3x3 board filled without a line; the computer may grow it.
    Extending,
    Concluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    PlayerWin,
    OpponentWin,
    Draw,
}

impl Outcome {
    /// Outcome for a line completed by `side`
    pub fn won_by(side: Side) -> Outcome {
        match side {
            Side::Player => Outcome::PlayerWin,
            Side::Opponent => Outcome::OpponentWin,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::PlayerWin => "You win!",
            Outcome::OpponentWin => "The computer wins!",
            Outcome::Draw => "It's a draw!",
        }
    }
}

/// Everything that belongs to one round. A fresh value replaces it when the
/// next round starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    /// Identifies the round so deferred actions from an older one are ignored.
    pub(crate) id: u64,
    pub(crate) board: Board,
    pub(crate) turn: Side,
    pub(crate) phase: Phase,
    pub(crate) extension_consumed: bool,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) winning_line: Option<Line>,
    pub(crate) last_move: Option<Position>,
}

impl RoundState {
    /// Empty board waiting for a symbol choice
    pub fn new(id: u64) -> Self {
        RoundState {
            id,
            board: Board::new(),
            turn: Side::Player,
            phase: Phase::ChoosingSymbol,
            extension_consumed: false,
            outcome: None,
            winning_line: None,
            last_move: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn extension_consumed(&self) -> bool {
        self.extension_consumed
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn winning_line(&self) -> Option<Line> {
        self.winning_line
    }

    pub fn last_move(&self) -> Option<Position> {
        self.last_move
    }

    pub fn is_concluded(&self) -> bool {
        self.phase == Phase::Concluded
    }

    /// True unless the human may place a mark right now
    pub fn is_locked(&self) -> bool {
        !(self.phase == Phase::Playing && self.turn == Side::Player)
    }
}
