//! Source pane rendering with token highlighting
//!
//! Displays the input with line numbers, colours bytes by the token class
//! they start (digit, identifier character, punctuation), and highlights the
//! span of the token under the cursor. The span of a failed parse is
//! underlined in the error colour.
//!
//! Offsets are bytes. Each styled run is decoded lossily, so a highlight that
//! splits a multi-byte character shows replacement characters rather than
//! panicking.

use crate::parser::span::Span as SourceSpan;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Scroll state for the source pane
#[derive(Debug, Default)]
pub struct SourceScrollState {
    pub offset: usize,
    /// Visual row the current line is pinned to (None = centre on first render)
    pub target_line_row: Option<usize>,
}

/// Byte ranges of each line, excluding the newline.
pub(crate) fn line_ranges(source: &[u8]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut start = 0;
    for (i, &b) in source.iter().enumerate() {
        if b == b'\n' {
            ranges.push((start, i));
            start = i + 1;
        }
    }
    ranges.push((start, source.len()));
    ranges
}

/// A zero-width span still marks the cell at its position.
fn covers(span: Option<SourceSpan>, offset: usize) -> bool {
    match span {
        Some(span) if span.is_empty() => span.start == offset,
        Some(span) => span.contains(offset),
        None => false,
    }
}

fn byte_style(b: u8) -> Style {
    if b.is_ascii_digit() {
        Style::default().fg(DEFAULT_THEME.number)
    } else if b.is_ascii_alphabetic() || b == b'_' {
        Style::default().fg(DEFAULT_THEME.identifier)
    } else if b.is_ascii_whitespace() {
        Style::default()
    } else {
        Style::default().fg(DEFAULT_THEME.punct)
    }
}

fn cursor_style() -> Style {
    Style::default()
        .bg(DEFAULT_THEME.token_bg)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

fn error_style() -> Style {
    Style::default()
        .fg(DEFAULT_THEME.error)
        .add_modifier(Modifier::UNDERLINED | Modifier::BOLD)
}

/// Styled spans for bytes `start..end` of `source`
fn highlight_line(
    source: &[u8],
    (start, end): (usize, usize),
    cursor: Option<SourceSpan>,
    error: Option<SourceSpan>,
) -> Vec<Span<'static>> {
    let style_at = |i: usize| {
        if covers(cursor, i) {
            cursor_style()
        } else if covers(error, i) {
            error_style()
        } else {
            byte_style(source[i])
        }
    };

    let mut spans = Vec::new();
    let mut run_start = start;
    let mut run_style: Option<Style> = None;

    for i in start..end {
        let style = style_at(i);
        if run_style != Some(style) {
            if let Some(prev) = run_style {
                let text = String::from_utf8_lossy(&source[run_start..i]).into_owned();
                spans.push(Span::styled(text, prev));
            }
            run_start = i;
            run_style = Some(style);
        }
    }
    if let Some(style) = run_style {
        let text = String::from_utf8_lossy(&source[run_start..end]).into_owned();
        spans.push(Span::styled(text, style));
    }

    // End of input (or an error there) sits just past the last byte.
    if covers(cursor, end) && cursor.is_some_and(|c| c.is_empty()) {
        spans.push(Span::styled(" ", cursor_style()));
    } else if covers(error, end) && error.is_some_and(|e| e.is_empty()) {
        spans.push(Span::styled(" ", error_style()));
    }

    spans
}

/// Render the source pane
#[allow(clippy::too_many_arguments)]
pub fn render_source_pane(
    frame: &mut Frame,
    area: Rect,
    source: &str,
    cursor: Option<SourceSpan>,
    error: Option<SourceSpan>,
    is_focused: bool,
    scroll_state: &mut SourceScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let bytes = source.as_bytes();
    let ranges = line_ranges(bytes);
    let total_lines = ranges.len();

    let visible_height = area.height.saturating_sub(2).max(1) as usize; // Account for borders (2), min 1

    if scroll_state.target_line_row.is_none() {
        scroll_state.target_line_row = Some(visible_height / 2);
    }
    let target_row = scroll_state
        .target_line_row
        .unwrap_or(0)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    let current_line = cursor.and_then(|c| {
        ranges
            .iter()
            .position(|&(start, end)| start <= c.start && c.start <= end)
    });

    // Keep the current line at the target visual row
    if let Some(line_idx) = current_line {
        scroll_state.offset = line_idx.saturating_sub(target_row);
    }
    if total_lines > visible_height {
        scroll_state.offset = scroll_state.offset.min(total_lines - visible_height);
    } else {
        scroll_state.offset = 0;
    }

    let visible_lines: Vec<Line> = ranges
        .iter()
        .enumerate()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(idx, &range)| {
            let is_current = current_line == Some(idx);
            let num_style = if is_current {
                Style::default()
                    .fg(DEFAULT_THEME.secondary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(DEFAULT_THEME.comment)
            };

            let mut spans = vec![Span::styled(format!("{:4} ", idx + 1), num_style)];
            spans.extend(highlight_line(bytes, range, cursor, error));

            let line = Line::from(spans);
            if is_current {
                line.style(Style::default().bg(DEFAULT_THEME.current_line_bg))
            } else {
                line
            }
        })
        .collect();

    let paragraph = Paragraph::new(visible_lines).block(block);
    frame.render_widget(paragraph, area);
}
