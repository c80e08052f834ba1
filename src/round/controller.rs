use std::time::Duration;

use tracing::{debug, info, instrument, trace, warn};

use super::observer::RoundObserver;
use super::score::{Score, ScoreKeeper, ScoreStore};
use super::state::{Outcome, Phase, RoundState};
use crate::ai::{plan_extension, ExtensionPlan, MinimaxSolver};
use crate::config::PacingConfig;
use crate::error::MoveError;
use crate::game::{find_winning_line, Board, Line, Position, Side, Symbol};

/// A step the controller wants run later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The computer answers on the 3x3 board.
    OpponentMove,
    /// Look for a winning extension of the full board.
    AnalyzeExtension,
    /// Play the first (or only) mark of a chosen extension.
    ExecutePlan(ExtensionPlan),
    /// Second mark of a two-step extension.
    PlaceSecondStep(Position),
    RevealWinLine(Line),
}

/// An [`Action`] for the driver to hand back through
/// [`RoundController::run`] once `delay` has passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub round: u64,
    pub delay: Duration,
    pub action: Action,
}

/// Runs rounds: alternates turns, asks the solver and the extension planner
/// for the computer's moves, and records outcomes.
///
/// Nothing here waits. Whenever the computer should act after a pause, the
/// call returns a [`Scheduled`] step and the caller owns the timer.
pub struct RoundController<O: RoundObserver, S: ScoreStore> {
    state: RoundState,
    player_symbol: Option<Symbol>,
    solver: MinimaxSolver,
    pacing: PacingConfig,
    scores: ScoreKeeper<S>,
    observer: O,
}

impl<O: RoundObserver, S: ScoreStore> RoundController<O, S> {
    /// Controller waiting for the first symbol choice.
    pub fn new(pacing: PacingConfig, store: S, observer: O) -> Self {
        RoundController {
            state: RoundState::new(0),
            player_symbol: None,
            solver: MinimaxSolver::new(),
            pacing,
            scores: ScoreKeeper::new(store),
            observer,
        }
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn board(&self) -> &Board {
        &self.state.board
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn turn(&self) -> Side {
        self.state.turn
    }

    pub fn player_symbol(&self) -> Option<Symbol> {
        self.player_symbol
    }

    pub fn opponent_symbol(&self) -> Option<Symbol> {
        self.player_symbol.map(Symbol::other)
    }

    pub fn score(&self) -> Score {
        self.scores.score()
    }

    pub fn store(&self) -> &S {
        self.scores.store()
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Discard the current round and start a fresh one.
    ///
    /// With `keep_symbol` and a symbol already chosen, play begins at once
    /// (the computer's opening move is returned if it holds X). Otherwise the
    /// round waits in [`Phase::ChoosingSymbol`]. Steps scheduled for the old
    /// round become no-ops.
    #[instrument(level = "debug", skip(self))]
    pub fn start_round(&mut self, keep_symbol: bool) -> Option<Scheduled> {
        self.state = RoundState::new(self.state.id + 1);
        debug!(round = self.state.id, "round started");
        self.observer.board_changed(&self.state.board, None);

        match self.player_symbol.filter(|_| keep_symbol) {
            Some(symbol) => self.begin_play(symbol),
            None => {
                self.observer.symbol_needed();
                None
            }
        }
    }

    /// Record the human's symbol and begin play. X moves first.
    #[instrument(level = "debug", skip(self))]
    pub fn choose_symbol(&mut self, symbol: Symbol) -> Result<Option<Scheduled>, MoveError> {
        if self.state.phase != Phase::ChoosingSymbol {
            return Err(MoveError::WrongPhase);
        }
        Ok(self.begin_play(symbol))
    }

    /// Place the human's mark.
    ///
    /// Rejected without any change when it is not the human's turn or the
    /// target is out of range or occupied.
    #[instrument(level = "debug", skip(self), fields(round = self.state.id))]
    pub fn play(&mut self, pos: Position) -> Result<Option<Scheduled>, MoveError> {
        if self.state.phase != Phase::Playing {
            return Err(MoveError::WrongPhase);
        }
        if self.state.turn != Side::Player {
            return Err(MoveError::NotYourTurn);
        }
        self.place_mark(Side::Player, pos)?;
        Ok(self.after_placement(Side::Player))
    }

    /// Run a step returned earlier. Steps from a previous round, or that no
    /// longer fit the current phase, do nothing.
    #[instrument(level = "debug", skip(self), fields(round = self.state.id))]
    pub fn run(&mut self, step: Scheduled) -> Option<Scheduled> {
        if step.round != self.state.id {
            trace!(stale = step.round, "dropping step from an earlier round");
            return None;
        }
        match step.action {
            Action::OpponentMove => self.opponent_move(),
            Action::AnalyzeExtension => self.analyze_extension(),
            Action::ExecutePlan(plan) => self.execute_plan(plan),
            Action::PlaceSecondStep(pos) => self.place_second_step(pos),
            Action::RevealWinLine(line) => {
                if self.state.phase == Phase::Concluded {
                    self.observer.win_line_revealed(line);
                }
                None
            }
        }
    }

    /// Zero the score tally.
    pub fn reset_score(&mut self) {
        let score = self.scores.reset();
        self.observer.score_changed(&score);
    }

    fn begin_play(&mut self, symbol: Symbol) -> Option<Scheduled> {
        self.player_symbol = Some(symbol);
        self.state.phase = Phase::Playing;
        self.state.turn = match symbol {
            Symbol::X => Side::Player,
            Symbol::O => Side::Opponent,
        };
        self.observer.turn_changed(self.state.turn);

        (self.state.turn == Side::Opponent)
            .then(|| self.schedule(self.pacing.first_move(), Action::OpponentMove))
    }

    fn schedule(&self, delay: Duration, action: Action) -> Scheduled {
        Scheduled {
            round: self.state.id,
            delay,
            action,
        }
    }

    /// Put `side`'s mark on the board and report it.
    fn place_mark(&mut self, side: Side, pos: Position) -> Result<(), MoveError> {
        self.state.board.place(pos, side.to_cell())?;
        self.mark_placed(pos);
        Ok(())
    }

    fn mark_placed(&mut self, pos: Position) {
        self.state.last_move = Some(pos);
        self.observer.board_changed(&self.state.board, Some(pos));
    }

    /// Decide what follows a placement during normal play.
    fn after_placement(&mut self, mover: Side) -> Option<Scheduled> {
        if let Some(line) = find_winning_line(&self.state.board) {
            return self.conclude_with_line(line);
        }

        if self.state.board.is_full() {
            if self.state.extension_consumed {
                return self.conclude(Outcome::Draw, None);
            }
            self.state.phase = Phase::Extending;
            self.state.turn = Side::Opponent;
            self.observer.turn_changed(Side::Opponent);
            self.observer.extension_started();
            return Some(self.schedule(self.pacing.extension_analysis(), Action::AnalyzeExtension));
        }

        self.state.turn = mover.other();
        self.observer.turn_changed(self.state.turn);
        (self.state.turn == Side::Opponent)
            .then(|| self.schedule(self.pacing.opponent_move(), Action::OpponentMove))
    }

    fn opponent_move(&mut self) -> Option<Scheduled> {
        if self.state.phase != Phase::Playing || self.state.turn != Side::Opponent {
            return None;
        }
        if let Some(pos) = self.solver.best_opponent_move(&self.state.board) {
            if let Err(err) = self.place_mark(Side::Opponent, pos) {
                warn!(%err, "solver proposed an illegal move");
                return None;
            }
        }
        self.after_placement(Side::Opponent)
    }

    fn analyze_extension(&mut self) -> Option<Scheduled> {
        if self.state.phase != Phase::Extending || self.state.board.is_extended() {
            return None;
        }
        let Some(plan) = plan_extension(&self.state.board) else {
            return self.conclude(Outcome::Draw, None);
        };

        match self.state.board.widened(plan.direction) {
            Ok(wide) => self.state.board = wide,
            Err(err) => {
                warn!(%err, "cannot widen board");
                return self.conclude(Outcome::Draw, None);
            }
        }
        self.state.extension_consumed = true;
        self.state.last_move = None;
        self.observer.board_widened(plan.direction);
        self.observer.board_changed(&self.state.board, None);

        Some(self.schedule(self.pacing.extension_move(), Action::ExecutePlan(plan)))
    }

    fn execute_plan(&mut self, plan: ExtensionPlan) -> Option<Scheduled> {
        if self.state.phase != Phase::Extending || !self.state.board.is_extended() {
            return None;
        }
        let placements = plan.placements();
        let Some(&first) = placements.first() else {
            return self.finish_extension();
        };
        if let Err(err) = self.place_mark(Side::Opponent, first) {
            warn!(%err, "extension move rejected");
            return self.finish_extension();
        }

        match placements.get(1) {
            Some(&second) => Some(self.schedule(self.pacing.two_step(), Action::PlaceSecondStep(second))),
            None => self.finish_extension(),
        }
    }

    fn place_second_step(&mut self, pos: Position) -> Option<Scheduled> {
        if self.state.phase != Phase::Extending {
            return None;
        }
        if let Err(err) = self.place_mark(Side::Opponent, pos) {
            warn!(%err, "second extension move rejected");
        }
        self.finish_extension()
    }

    /// One look at the widened board: a line wins, anything else is a draw.
    fn finish_extension(&mut self) -> Option<Scheduled> {
        match find_winning_line(&self.state.board) {
            Some(line) => self.conclude_with_line(line),
            None => self.conclude(Outcome::Draw, None),
        }
    }

    fn conclude_with_line(&mut self, line: Line) -> Option<Scheduled> {
        let outcome = match self.state.board.get(line.start).side() {
            Some(side) => Outcome::won_by(side),
            None => Outcome::Draw,
        };
        self.conclude(outcome, Some(line))
    }

    fn conclude(&mut self, outcome: Outcome, line: Option<Line>) -> Option<Scheduled> {
        self.state.phase = Phase::Concluded;
        self.state.outcome = Some(outcome);
        self.state.winning_line = line;
        info!(
            round = self.state.id,
            ?outcome,
            extended = self.state.extension_consumed,
            "round concluded"
        );

        let score = self.scores.increment(outcome);
        self.observer.round_concluded(outcome, line);
        self.observer.score_changed(&score);

        line.map(|l| self.schedule(self.pacing.win_line(), Action::RevealWinLine(l)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Strategy;
    use crate::game::{Cell, Direction};
    use crate::round::{EventLog, MemoryScoreStore, RoundEvent};

    type Controller = RoundController<EventLog, MemoryScoreStore>;

    fn controller() -> Controller {
        RoundController::new(PacingConfig::default(), MemoryScoreStore::new(), EventLog::new())
    }

    /// Run scheduled steps until none remain.
    fn drive(c: &mut Controller, mut next: Option<Scheduled>) {
        while let Some(step) = next {
            next = c.run(step);
        }
    }

    /// Controller in `Playing` on a prepared board, with `turn` to move.
    fn with_board(rows: &[&str], player: Symbol, turn: Side) -> Controller {
        let mut c = controller();
        c.player_symbol = Some(player);
        c.state = RoundState::new(1);
        c.state.board = Board::parse(rows, player).unwrap();
        c.state.phase = Phase::Playing;
        c.state.turn = turn;
        c
    }

    #[test]
    fn starts_waiting_for_symbol() {
        let mut c = controller();
        assert_eq!(c.start_round(false), None);
        assert_eq!(c.phase(), Phase::ChoosingSymbol);
        assert!(c.observer().events().contains(&RoundEvent::SymbolNeeded));
        assert_eq!(c.play(Position::new(0, 0)), Err(MoveError::WrongPhase));
    }

    #[test]
    fn choosing_x_gives_player_first_move() {
        let mut c = controller();
        c.start_round(false);
        assert_eq!(c.choose_symbol(Symbol::X), Ok(None));
        assert_eq!(c.phase(), Phase::Playing);
        assert_eq!(c.turn(), Side::Player);
        assert_eq!(c.choose_symbol(Symbol::O), Err(MoveError::WrongPhase));
    }

    #[test]
    fn choosing_o_schedules_opening_move() {
        let mut c = controller();
        c.start_round(false);
        let step = c.choose_symbol(Symbol::O).unwrap().unwrap();
        assert_eq!(step.action, Action::OpponentMove);
        assert_eq!(step.delay, Duration::from_millis(150));
        assert_eq!(c.run(step), None);
        assert_eq!(c.board().empty_positions().count(), 8);
        assert_eq!(c.turn(), Side::Player);
    }

    #[test]
    fn player_move_schedules_reply() {
        let mut c = controller();
        c.start_round(false);
        c.choose_symbol(Symbol::X).unwrap();
        let step = c.play(Position::new(1, 1)).unwrap().unwrap();
        assert_eq!(step.action, Action::OpponentMove);
        assert_eq!(step.delay, Duration::from_millis(120));
        assert_eq!(c.play(Position::new(0, 0)), Err(MoveError::NotYourTurn));

        c.run(step);
        let reply = c.board().get(Position::new(0, 0));
        assert_eq!(reply, Cell::Opponent);
        assert_eq!(c.turn(), Side::Player);
    }

    #[test]
    fn marks_belong_to_their_side() {
        let mut c = controller();
        c.start_round(false);
        let step = c.choose_symbol(Symbol::O).unwrap().unwrap();
        c.run(step);
        let opening = c.state().last_move().unwrap();
        assert_eq!(c.board().get(opening), Cell::Opponent);

        let pos = c.board().empty_positions().next().unwrap();
        c.play(pos).unwrap();
        assert_eq!(c.board().get(pos), Cell::Player);
        assert_eq!(c.observer().placements(), vec![opening, pos]);
    }

    #[test]
    fn invalid_placement_changes_nothing() {
        let mut c = controller();
        c.start_round(false);
        c.choose_symbol(Symbol::X).unwrap();
        let before = c.state().clone();
        let events = c.observer().events().len();

        assert_eq!(
            c.play(Position::new(3, 1)),
            Err(MoveError::OutOfRange(Position::new(3, 1)))
        );
        assert_eq!(c.state(), &before);
        assert_eq!(c.observer().events().len(), events);
    }

    #[test]
    fn occupied_placement_is_rejected() {
        let mut c = with_board(&["X..", "...", "..."], Symbol::X, Side::Player);
        assert_eq!(
            c.play(Position::new(0, 0)),
            Err(MoveError::Occupied(Position::new(0, 0)))
        );
        assert_eq!(c.phase(), Phase::Playing);
    }

    #[test]
    fn player_win_is_recorded_with_line() {
        let mut c = with_board(&["XX.", "OO.", "..."], Symbol::X, Side::Player);
        let step = c.play(Position::new(0, 2)).unwrap().unwrap();
        let line = Line::new(Position::new(0, 0), Position::new(0, 2));
        assert_eq!(step.action, Action::RevealWinLine(line));
        assert_eq!(step.delay, Duration::from_millis(50));
        assert_eq!(c.phase(), Phase::Concluded);
        assert_eq!(c.state().outcome(), Some(Outcome::PlayerWin));
        assert_eq!(c.score(), Score { you: 1, ai: 0, draw: 0 });
        assert_eq!(c.play(Position::new(2, 2)), Err(MoveError::WrongPhase));

        assert_eq!(c.run(step), None);
        assert_eq!(
            c.observer().events().last(),
            Some(&RoundEvent::WinLineRevealed(line))
        );
    }

    #[test]
    fn full_board_enters_extension() {
        let mut c = with_board(&["XOX", "XOO", "OX."], Symbol::X, Side::Player);
        let step = c.play(Position::new(2, 2)).unwrap().unwrap();
        assert_eq!(c.phase(), Phase::Extending);
        assert_eq!(step.action, Action::AnalyzeExtension);
        assert!(c.observer().events().contains(&RoundEvent::ExtensionStarted));
    }

    #[test]
    fn dead_draw_concludes_without_widening() {
        let mut c = with_board(&["OXO", "XOX", "XO."], Symbol::X, Side::Player);
        let step = c.play(Position::new(2, 2)).unwrap();
        drive(&mut c, step);
        assert_eq!(c.phase(), Phase::Concluded);
        assert_eq!(c.state().outcome(), Some(Outcome::Draw));
        assert!(!c.board().is_extended());
        assert!(!c.state().extension_consumed());
        assert_eq!(c.score().draw, 1);
    }

    #[test]
    fn winning_extension_widens_and_wins() {
        let mut c = with_board(&["OXX", "XOO", "OX."], Symbol::O, Side::Opponent);
        c.state.board.place(Position::new(2, 2), Cell::Opponent).unwrap();
        let step = c.after_placement(Side::Opponent);

        let step = c.run(step.unwrap()).unwrap();
        assert_eq!(
            step.action,
            Action::ExecutePlan(ExtensionPlan {
                direction: Direction::Right,
                strategy: Strategy::Immediate { row: 0 },
            })
        );
        assert!(c.board().is_extended());
        assert!(c.state().extension_consumed());

        let reveal = c.run(step).unwrap();
        let line = Line::new(Position::new(0, 1), Position::new(0, 3));
        assert_eq!(reveal.action, Action::RevealWinLine(line));
        assert_eq!(c.state().outcome(), Some(Outcome::OpponentWin));
        assert_eq!(c.state().last_move(), Some(Position::new(0, 3)));
    }

    #[test]
    fn extension_without_line_is_a_draw() {
        let mut c = with_board(&["XOX", "XOX", "OX."], Symbol::X, Side::Player);
        // Opponent holds (1,1) and (2,2) after the last move.
        c.state.board.place(Position::new(2, 2), Cell::Opponent).unwrap();
        c.state.turn = Side::Opponent;
        let step = c.after_placement(Side::Opponent);
        drive(&mut c, step);

        assert!(c.board().is_extended());
        assert_eq!(c.board().get(Position::new(0, 0)), Cell::Opponent);
        assert_eq!(c.state().outcome(), Some(Outcome::Draw));
        assert_eq!(c.state().winning_line(), None);
        assert_eq!(c.observer().conclusions(), vec![(Outcome::Draw, None)]);
    }

    #[test]
    fn two_step_plan_places_twice() {
        let mut c = with_board(&["X..", ".OO", "X.."], Symbol::X, Side::Opponent);
        c.state.board = c.state.board.widened(Direction::Right).unwrap();
        c.state.extension_consumed = true;
        c.state.phase = Phase::Extending;
        let plan = ExtensionPlan {
            direction: Direction::Right,
            strategy: Strategy::TwoStep {
                first: Position::new(0, 3),
                second: Position::new(1, 3),
            },
        };

        let step = c.run(c.schedule(Duration::ZERO, Action::ExecutePlan(plan))).unwrap();
        assert_eq!(step.action, Action::PlaceSecondStep(Position::new(1, 3)));
        assert_eq!(step.delay, Duration::from_millis(160));
        assert_eq!(c.phase(), Phase::Extending);

        c.run(step);
        assert_eq!(c.state().outcome(), Some(Outcome::OpponentWin));
        assert_eq!(
            c.observer().placements(),
            vec![Position::new(0, 3), Position::new(1, 3)]
        );
    }

    #[test]
    fn stale_steps_are_ignored() {
        let mut c = controller();
        c.start_round(false);
        let step = c.choose_symbol(Symbol::O).unwrap().unwrap();
        c.start_round(true);
        let board = *c.board();
        assert_eq!(c.run(step), None);
        assert_eq!(c.board(), &board);
    }

    #[test]
    fn new_round_keeps_symbol() {
        let mut c = controller();
        c.start_round(false);
        c.choose_symbol(Symbol::O).unwrap();
        let step = c.start_round(true).unwrap();
        assert_eq!(step.action, Action::OpponentMove);
        assert_eq!(c.player_symbol(), Some(Symbol::O));
        assert_eq!(c.opponent_symbol(), Some(Symbol::X));
        assert_eq!(c.state().id(), 2);
    }

    #[test]
    fn reset_score_zeroes_tally() {
        let mut c = with_board(&["XX.", "OO.", "..."], Symbol::X, Side::Player);
        c.play(Position::new(0, 2)).unwrap();
        assert_eq!(c.score().you, 1);
        c.reset_score();
        assert_eq!(c.score(), Score::default());
        assert_eq!(c.store().stored(), Some(Score::default()));
    }
}
