use super::score::Score;
use super::state::Outcome;
use crate::game::{Board, Direction, Line, Position, Side};

/// Callbacks through which a front end follows a round.
///
/// The controller calls these synchronously, after its own state has been
/// updated.
pub trait RoundObserver {
    /// After every placement, and when a board is created or widened.
    fn board_changed(&mut self, board: &Board, last_moved: Option<Position>);

    fn turn_changed(&mut self, turn: Side);

    fn round_concluded(&mut self, outcome: Outcome, line: Option<Line>);

    fn symbol_needed(&mut self) {}

    /// The 3x3 board filled without a line and is about to be analysed.
    fn extension_started(&mut self) {}

    fn board_widened(&mut self, _direction: Direction) {}

    /// The deferred win-line presentation is due.
    fn win_line_revealed(&mut self, _line: Line) {}

    fn score_changed(&mut self, _score: &Score) {}
}

/// One recorded observer callback.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    BoardChanged {
        board: Board,
        last_moved: Option<Position>,
    },
    TurnChanged(Side),
    RoundConcluded {
        outcome: Outcome,
        line: Option<Line>,
    },
    SymbolNeeded,
    ExtensionStarted,
    BoardWidened(Direction),
    WinLineRevealed(Line),
    ScoreChanged(Score),
}

/// Observer that records every callback in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<RoundEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RoundEvent] {
        &self.events
    }

    /// Take every event recorded so far.
    pub fn drain(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Positions reported as the last move, in order
    pub fn placements(&self) -> Vec<Position> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::BoardChanged {
                    last_moved: Some(pos),
                    ..
                } => Some(*pos),
                _ => None,
            })
            .collect()
    }

    pub fn conclusions(&self) -> Vec<(Outcome, Option<Line>)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::RoundConcluded { outcome, line } => Some((*outcome, *line)),
                _ => None,
            })
            .collect()
    }
}

impl RoundObserver for EventLog {
    fn board_changed(&mut self, board: &Board, last_moved: Option<Position>) {
        self.events.push(RoundEvent::BoardChanged {
            board: *board,
            last_moved,
        });
    }

    fn turn_changed(&mut self, turn: Side) {
        self.events.push(RoundEvent::TurnChanged(turn));
    }

    fn round_concluded(&mut self, outcome: Outcome, line: Option<Line>) {
        self.events.push(RoundEvent::RoundConcluded { outcome, line });
    }

    fn symbol_needed(&mut self) {
        self.events.push(RoundEvent::SymbolNeeded);
    }

    fn extension_started(&mut self) {
        self.events.push(RoundEvent::ExtensionStarted);
    }

    fn board_widened(&mut self, direction: Direction) {
        self.events.push(RoundEvent::BoardWidened(direction));
    }

    fn win_line_revealed(&mut self, line: Line) {
        self.events.push(RoundEvent::WinLineRevealed(line));
    }

    fn score_changed(&mut self, score: &Score) {
        self.events.push(RoundEvent::ScoreChanged(*score));
    }
}
