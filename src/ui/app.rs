//! Main TUI application state and logic

use crate::parser::parse::ParseError;
use crate::parser::span::Span;
use crate::session::Session;
use crate::storage::intern::Interner;
use crate::trace::{Trace, TraceEntry};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

use super::panes::{self, SourceScrollState};

/// Interval between steps in auto-play mode
const PLAY_INTERVAL: Duration = Duration::from_millis(300);

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Source,
    Tokens,
}

impl FocusedPane {
    /// Move focus to the other pane
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Source => FocusedPane::Tokens,
            FocusedPane::Tokens => FocusedPane::Source,
        }
    }
}

/// The token stepper state
pub struct App {
    /// The source text being stepped through
    pub source: String,

    /// Every token the lexer produced, up to the first lexer error
    pub trace: Trace,

    /// Result of evaluating the whole source
    pub outcome: Result<i64, ParseError>,

    /// Index into `trace` of the token under the cursor
    pub position: usize,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    pub source_scroll: SourceScrollState,
    pub tokens_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,
}

impl App {
    pub fn new(source: String, trace: Trace, outcome: Result<i64, ParseError>) -> Self {
        let status_message = match &outcome {
            Ok(_) => String::from("Ready!"),
            Err(err) => err.describe(source.as_bytes()),
        };
        App {
            source,
            trace,
            outcome,
            position: 0,
            focused_pane: FocusedPane::Source,
            source_scroll: SourceScrollState::default(),
            tokens_scroll: 0,
            should_quit: false,
            status_message,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or(Instant::now()),
        }
    }

    /// Lex and evaluate `source` in `session`, keeping the tokens before a
    /// lexer error so they can still be stepped through.
    pub fn load<I: Interner>(session: &mut Session<I>, source: String) -> Self {
        let (trace, lex_error) = session.trace_until_error(&source);
        let outcome = match lex_error {
            Some(err) => Err(err),
            None => session.eval(&source),
        };
        App::new(source, trace, outcome)
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= PLAY_INTERVAL {
                if self.advance() {
                    self.status_message = "Playing...".to_string();
                } else {
                    self.is_playing = false;
                    self.status_message = "Playback complete".to_string();
                }
                self.last_play_time = Instant::now();
            }

            // Use poll with timeout to allow auto-play to work
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    /// The trace entry under the cursor
    pub fn current_entry(&self) -> Option<&TraceEntry> {
        self.trace.get(self.position)
    }

    fn error_span(&self) -> Option<Span> {
        self.outcome.as_ref().err().and_then(ParseError::span)
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        // Source (left) | Tokens (right)
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(main_chunks[0]);

        let cursor = self.current_entry().map(|entry| entry.span);
        let error = self.error_span();

        panes::render_source_pane(
            frame,
            columns[0],
            &self.source,
            cursor,
            error,
            self.focused_pane == FocusedPane::Source,
            &mut self.source_scroll,
        );

        panes::render_tokens_pane(
            frame,
            columns[1],
            &self.trace,
            self.position,
            self.focused_pane == FocusedPane::Tokens,
            &mut self.tokens_scroll,
        );

        panes::render_status_bar(
            frame,
            main_chunks[1],
            &self.status_message,
            self.position,
            self.trace.len(),
            &self.outcome,
            self.is_playing,
        );
    }

    /// Handle keyboard events
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            // Number keys step forward N times directly
            KeyCode::Char(c @ '1'..='9') => {
                self.is_playing = false;
                let n = c.to_digit(10).unwrap_or(1) as usize;
                let stepped = (0..n).take_while(|_| self.advance()).count();
                self.status_message = format!("Stepped forward {} token(s)", stepped);
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling up makes the current line move down visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Tokens => {
                    self.is_playing = false;
                    self.step_backward();
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Source => {
                    // Scrolling down makes the current line move up visually
                    if let Some(row) = self.source_scroll.target_line_row {
                        self.source_scroll.target_line_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Tokens => {
                    self.is_playing = false;
                    self.step_forward();
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.last_play_time = Instant::now()
                            .checked_sub(PLAY_INTERVAL)
                            .unwrap_or(Instant::now());
                        self.status_message = "Playing...".to_string();
                    } else {
                        self.status_message = "Paused".to_string();
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                self.jump_to_end();
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                self.jump_to_start();
            }
            _ => {}
        }
    }

    /// Move the cursor one token forward, returning false at the last token.
    fn advance(&mut self) -> bool {
        if self.position + 1 < self.trace.len() {
            self.position += 1;
            true
        } else {
            false
        }
    }

    pub fn step_forward(&mut self) {
        if self.advance() {
            self.status_message = match self.current_entry() {
                Some(entry) => format!("Stepped to {}", entry),
                None => "Stepped forward".to_string(),
            };
        } else {
            self.status_message = "Cannot step forward: at last token".to_string();
        }
    }

    pub fn step_backward(&mut self) {
        if self.position > 0 {
            self.position -= 1;
            self.status_message = match self.current_entry() {
                Some(entry) => format!("Stepped to {}", entry),
                None => "Stepped backward".to_string(),
            };
        } else {
            self.status_message = "Cannot step backward: at first token".to_string();
        }
    }

    pub fn jump_to_end(&mut self) {
        self.position = self.trace.len().saturating_sub(1);
        self.status_message = "Jumped to end".to_string();
    }

    pub fn jump_to_start(&mut self) {
        self.position = 0;
        self.status_message = "Jumped to start".to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ratatui::backend::TestBackend;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn load(source: &str) -> App {
        App::load(&mut Session::new(), source.to_string())
    }

    #[test]
    fn test_load_evaluates_source() {
        let app = load("2 + 3 * 4");
        assert_eq!(app.outcome, Ok(14));
        // 2 + 3 * 4 <end>
        assert_eq!(app.trace.len(), 6);
        assert_eq!(app.status_message, "Ready!");
    }

    #[test]
    fn test_load_keeps_tokens_before_lex_error() {
        let app = load("1 + 99999999999999999999");
        assert!(app.outcome.is_err());
        assert_eq!(app.trace.len(), 2);
        assert!(app.status_message.starts_with("Parse error at line 1"));
    }

    #[test]
    fn test_stepping_is_clamped() {
        let mut app = load("(1)");
        press(&mut app, KeyCode::Left);
        assert_eq!(app.position, 0);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        assert_eq!(app.position, 2);
        assert_eq!(app.current_entry().map(|e| e.span), Some(Span::new(2, 3)));

        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.position, 3);
        assert_eq!(app.status_message, "Stepped forward 1 token(s)");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.position, 0);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.position, 3);
    }

    #[test]
    fn test_tokens_pane_arrows_step() {
        let mut app = load("1 + 2");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focused_pane, FocusedPane::Tokens);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.position, 1);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.position, 0);
    }

    #[test]
    fn test_quit() {
        let mut app = load("1");
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_shows_outcome() {
        let mut app = load("6 / (1 + 2)");
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal.draw(|f| app.render(f)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content.iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("Source"));
        assert!(text.contains("Tokens"));
        assert!(text.contains("= 2"));
    }
}
