use crate::game::{Board, Cell, Line, Position, Symbol, ROWS};
use crate::round::Score;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line as TextLine, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Everything the game screen shows, borrowed from the app for one frame.
pub struct GameView<'a> {
    pub board: &'a Board,
    pub player_symbol: Symbol,
    /// Shown only while the human may move.
    pub cursor: Option<Position>,
    pub last_move: Option<Position>,
    pub winning_line: Option<Line>,
    pub status: String,
    pub message: Option<&'a str>,
    pub score: Score,
}

pub fn render(frame: &mut Frame, view: &GameView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(9),    // Board
            Constraint::Length(3), // Message
            Constraint::Length(3), // Score
            Constraint::Length(4), // Controls
        ])
        .split(frame.area());

    render_header(frame, view, chunks[0]);
    render_board(frame, view, chunks[1]);
    render_message(frame, view.message, chunks[2]);
    render_score(frame, &view.score, chunks[3]);
    render_controls(frame, chunks[4]);
}

fn render_header(frame: &mut Frame, view: &GameView, area: ratatui::layout::Rect) {
    let text = format!("{}  |  You play {}", view.status, view.player_symbol);
    let header = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Tic-Tac-Grow"));

    frame.render_widget(header, area);
}

fn cell_span(view: &GameView, pos: Position) -> Span<'static> {
    let (symbol, color) = match view.board.get(pos) {
        Cell::Empty => ('.', Color::DarkGray),
        Cell::Player => (view.player_symbol.as_char(), Color::Yellow),
        Cell::Opponent => (view.player_symbol.other().as_char(), Color::Red),
    };

    let mut style = Style::default().fg(color);
    if view.last_move == Some(pos) {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    }
    if view.winning_line.is_some_and(|line| line.cells().contains(&pos)) {
        style = style.bg(Color::Green).fg(Color::Black);
    }
    if view.cursor == Some(pos) {
        style = style.add_modifier(Modifier::REVERSED);
    }
    Span::styled(format!(" {symbol} "), style)
}

fn render_board(frame: &mut Frame, view: &GameView, area: ratatui::layout::Rect) {
    let width = view.board.width();
    let rule = "───".repeat(width);
    let mut lines = Vec::new();

    lines.push(TextLine::from(format!("┌{rule}┐")));
    for row in 0..ROWS {
        let mut spans = vec![Span::raw("│")];
        for col in 0..width {
            spans.push(cell_span(view, Position::new(row, col)));
        }
        spans.push(Span::raw("│"));
        lines.push(TextLine::from(spans));
    }
    lines.push(TextLine::from(format!("└{rule}┘")));

    let board_widget = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(board_widget, area);
}

fn render_message(frame: &mut Frame, message: Option<&str>, area: ratatui::layout::Rect) {
    let msg_widget = Paragraph::new(message.unwrap_or(""))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));

    frame.render_widget(msg_widget, area);
}

fn render_score(frame: &mut Frame, score: &Score, area: ratatui::layout::Rect) {
    let line = TextLine::from(vec![
        Span::styled("You ", Style::default().fg(Color::Yellow)),
        Span::raw(format!("{}   ", score.you)),
        Span::styled("Computer ", Style::default().fg(Color::Red)),
        Span::raw(format!("{}   ", score.ai)),
        Span::styled("Draws ", Style::default().fg(Color::Gray)),
        Span::raw(score.draw.to_string()),
    ]);
    let widget = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Score"));

    frame.render_widget(widget, area);
}

fn render_controls(frame: &mut Frame, area: ratatui::layout::Rect) {
    let line1 = TextLine::from("Arrows: Move  |  Enter: Place  |  X/O: Choose symbol");
    let line2 = TextLine::from("N: New round  |  C: Change symbol  |  R: Reset score  |  Q: Quit");

    let controls = Paragraph::new(vec![line1, line2])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));

    frame.render_widget(controls, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn renders_board_and_score() {
        let board = Board::parse(&["XO.", ".X.", "..O"], Symbol::X).unwrap();
        let view = GameView {
            board: &board,
            player_symbol: Symbol::X,
            cursor: Some(Position::new(0, 2)),
            last_move: Some(Position::new(2, 2)),
            winning_line: None,
            status: "Your turn".to_string(),
            message: Some("hello"),
            score: Score { you: 3, ai: 1, draw: 2 },
        };

        let mut terminal = Terminal::new(TestBackend::new(70, 24)).unwrap();
        terminal.draw(|f| render(f, &view)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("Your turn"));
        assert!(text.contains(" X  O  . "));
        assert!(text.contains("hello"));
        assert!(text.contains("You 3"));
        assert!(text.contains("Draws 2"));
    }
}
