//! Token list pane rendering

use crate::parser::lexer::TokenKind;
use crate::trace::Trace;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Padding, Paragraph},
    Frame,
};

fn kind_style(kind: TokenKind) -> Style {
    match kind {
        TokenKind::Integer => Style::default().fg(DEFAULT_THEME.number),
        TokenKind::Identifier => Style::default().fg(DEFAULT_THEME.identifier),
        TokenKind::Punct(_) => Style::default().fg(DEFAULT_THEME.punct),
        TokenKind::EndOfInput => Style::default().fg(DEFAULT_THEME.comment),
    }
}

/// Keep `current` inside the window of `visible` rows starting at `offset`.
pub(crate) fn follow(offset: usize, current: usize, visible: usize) -> usize {
    if current < offset {
        current
    } else if current >= offset + visible {
        current + 1 - visible
    } else {
        offset
    }
}

/// Render the token trace with the cursor entry highlighted
pub fn render_tokens_pane(
    frame: &mut Frame,
    area: Rect,
    trace: &Trace,
    current: usize,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(" Tokens ")
        .borders(Borders::ALL)
        .border_style(border_style);

    if trace.is_empty() {
        let paragraph = Paragraph::new("(no tokens)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    *scroll_offset = follow(*scroll_offset, current, visible_height);

    let items: Vec<ListItem> = trace
        .iter()
        .enumerate()
        .skip(*scroll_offset)
        .take(visible_height)
        .map(|(i, entry)| {
            let marker = if i == current { "▶" } else { " " };
            let text = format!(
                "{} {:>3}  {:<8} {}",
                marker,
                i,
                entry.span.to_string(),
                entry
            );
            let style = if i == current {
                kind_style(entry.kind)
                    .bg(DEFAULT_THEME.current_line_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                kind_style(entry.kind)
            };
            ListItem::new(text).style(style)
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}
