use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::constants::{ASSISTANT_NAME, DISCLAIMER};
use crate::ui::view::{wrap_lines, ChatView};

/// Why the input box is (or is not) accepting text.
pub fn input_title(view: &ChatView) -> String {
    if view.conversation.is_degraded() {
        "Input disabled: fix the configuration and restart (Esc to quit)".to_string()
    } else if view.conversation.is_pending() {
        format!("Waiting for {ASSISTANT_NAME} to respond… (Esc to quit)")
    } else if !view.conversation.has_session() {
        "Connecting…".to_string()
    } else {
        "Ask a health question (Enter to send, PgUp/PgDn to scroll, Esc to quit)".to_string()
    }
}

pub fn ui(f: &mut Frame, view: &ChatView) {
    let banner = view
        .conversation
        .configuration_error()
        .map(|err| err.banner());
    let banner_height = if banner.is_some() { 3 } else { 0 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    let title = Line::from(vec![
        Span::styled(
            format!("{ASSISTANT_NAME}: AI Healthcare Chatbot"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" • {}", view.model),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(title), chunks[0]);

    if let Some(banner) = banner {
        let banner_widget = Paragraph::new(banner)
            .style(Style::default().fg(Color::Red))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title("Configuration Error"),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(banner_widget, chunks[1]);
    }

    let rows = wrap_lines(&view.build_display_lines(), chunks[2].width);
    let total_rows = u16::try_from(rows.len()).unwrap_or(u16::MAX);
    let scroll_offset = view.scroll_offset(total_rows, chunks[2].height);
    let messages = Paragraph::new(rows).scroll((scroll_offset, 0));
    f.render_widget(messages, chunks[2]);

    let input_enabled = view.conversation.input_enabled();
    let input_style = if input_enabled {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let inner_width = usize::from(chunks[3].width.saturating_sub(2));
    let visible_input = visible_tail(&view.input, inner_width);

    let input = Paragraph::new(visible_input).style(input_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Reset))
            .title(input_title(view)),
    );
    f.render_widget(input, chunks[3]);

    if input_enabled {
        let cursor_x = u16::try_from(visible_input.width())
            .unwrap_or(u16::MAX)
            .saturating_add(1)
            .min(chunks[3].width.saturating_sub(2));
        f.set_cursor_position((chunks[3].x + cursor_x, chunks[3].y + 1));
    }

    let footer = Paragraph::new(Span::styled(
        DISCLAIMER,
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC),
    ));
    f.render_widget(footer, chunks[4]);
}

/// Longest suffix of `input` that leaves one column free for the cursor.
fn visible_tail(input: &str, max_width: usize) -> &str {
    let mut width = input.width();
    let mut start = 0;
    for (idx, ch) in input.char_indices() {
        if width < max_width {
            start = idx;
            break;
        }
        width -= ch.width().unwrap_or(0);
        start = idx + ch.len_utf8();
    }
    &input[start..]
}
