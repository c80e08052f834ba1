use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{backend::Backend, Terminal};

use super::game_view::{self, GameView};
use crate::config::PacingConfig;
use crate::game::{Line, Position, Side, Symbol, ROWS};
use crate::round::{EventLog, Phase, RoundController, RoundEvent, Scheduled, ScoreStore};

/// How long to wait for input when nothing is scheduled.
const IDLE_POLL: Duration = Duration::from_millis(100);

pub struct App<S: ScoreStore> {
    controller: RoundController<EventLog, S>,
    cursor: Position,
    /// At most one step is ever outstanding; a new round replaces it.
    pending: Option<(Instant, Scheduled)>,
    revealed_line: Option<Line>,
    should_quit: bool,
    message: Option<String>,
}

impl<S: ScoreStore> App<S> {
    pub fn new(pacing: PacingConfig, store: S) -> Self {
        let mut app = App {
            controller: RoundController::new(pacing, store, EventLog::new()),
            cursor: Position::new(1, 1),
            pending: None,
            revealed_line: None,
            should_quit: false,
            message: None,
        };
        let first = app.controller.start_round(false);
        app.schedule(first);
        app.absorb_events();
        app
    }

    pub fn controller(&self) -> &RoundController<EventLog, S> {
        &self.controller
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Main application loop
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal
                .draw(|f| self.render(f))
                .map_err(|e| io::Error::other(e.to_string()))?;

            if self.should_quit {
                break;
            }

            self.handle_events()?;
            self.tick(Instant::now());
        }
        Ok(())
    }

    /// Wait for input until the next scheduled step is due
    fn handle_events(&mut self) -> io::Result<()> {
        let timeout = match &self.pending {
            Some((due, _)) => due.saturating_duration_since(Instant::now()),
            None => IDLE_POLL,
        };
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    /// Run the pending step if it is due at `now`.
    pub fn tick(&mut self, now: Instant) {
        let Some((due, step)) = self.pending else {
            return;
        };
        if now < due {
            return;
        }
        self.pending = None;
        let next = self.controller.run(step);
        self.schedule(next);
        self.absorb_events();
    }

    /// Handle key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        self.message = None;

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Enter | KeyCode::Char(' ') => self.place_at_cursor(),
            KeyCode::Char(c @ ('x' | 'X' | 'o' | 'O')) => self.choose(c),
            KeyCode::Char('n') => self.new_round(true),
            KeyCode::Char('c') => self.new_round(false),
            KeyCode::Char('r') => {
                self.controller.reset_score();
                self.absorb_events();
                self.message = Some("Score reset.".to_string());
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, d_row: isize, d_col: isize) {
        let width = self.controller.board().width();
        let row = self.cursor.row.saturating_add_signed(d_row).min(ROWS - 1);
        let col = self.cursor.col.saturating_add_signed(d_col).min(width - 1);
        self.cursor = Position::new(row, col);
    }

    fn place_at_cursor(&mut self) {
        match self.controller.play(self.cursor) {
            Ok(next) => self.schedule(next),
            Err(err) => self.message = Some(format!("{err}.")),
        }
        self.absorb_events();
    }

    fn choose(&mut self, c: char) {
        if self.controller.phase() != Phase::ChoosingSymbol {
            return;
        }
        if let Some(symbol) = Symbol::from_char(c) {
            match self.controller.choose_symbol(symbol) {
                Ok(next) => self.schedule(next),
                Err(err) => self.message = Some(format!("{err}.")),
            }
            self.absorb_events();
        }
    }

    fn new_round(&mut self, keep_symbol: bool) {
        self.revealed_line = None;
        self.cursor = Position::new(1, 1);
        let next = self.controller.start_round(keep_symbol);
        self.schedule(next);
        self.absorb_events();
    }

    fn schedule(&mut self, step: Option<Scheduled>) {
        self.pending = step.map(|s| (Instant::now() + s.delay, s));
    }

    /// Turn controller callbacks into what the view shows.
    fn absorb_events(&mut self) {
        for event in self.controller.observer_mut().drain() {
            match event {
                RoundEvent::BoardChanged { board, .. } => {
                    if self.cursor.col >= board.width() {
                        self.cursor.col = board.width() - 1;
                    }
                }
                RoundEvent::SymbolNeeded => {
                    self.message = Some("Press X or O to choose your symbol.".to_string());
                }
                RoundEvent::ExtensionStarted => {
                    self.message = Some("Draw! Looking for a way to grow the board...".to_string());
                }
                RoundEvent::BoardWidened(direction) => {
                    self.message = Some(format!("The board grows to the {}.", direction.name()));
                }
                RoundEvent::RoundConcluded { outcome, .. } => {
                    self.message = Some(outcome.message().to_string());
                }
                RoundEvent::WinLineRevealed(line) => {
                    self.revealed_line = Some(line);
                }
                RoundEvent::TurnChanged(_) | RoundEvent::ScoreChanged(_) => {}
            }
        }
    }

    fn status(&self) -> String {
        let c = &self.controller;
        match c.phase() {
            Phase::ChoosingSymbol => "Choose your symbol".to_string(),
            Phase::Playing if c.turn() == Side::Player => "Your turn".to_string(),
            Phase::Playing => "Computer's turn".to_string(),
            Phase::Extending => "Computer is extending the board".to_string(),
            Phase::Concluded => c
                .state()
                .outcome()
                .map(|o| o.message().to_string())
                .unwrap_or_default(),
        }
    }

    /// Render the UI
    fn render(&self, frame: &mut ratatui::Frame) {
        let state = self.controller.state();
        let view = GameView {
            board: state.board(),
            player_symbol: self.controller.player_symbol().unwrap_or(Symbol::X),
            cursor: (!state.is_locked()).then_some(self.cursor),
            last_move: state.last_move(),
            winning_line: self.revealed_line,
            status: self.status(),
            message: self.message.as_deref(),
            score: self.controller.score(),
        };
        game_view::render(frame, &view);
    }
}
