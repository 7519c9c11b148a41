//! UI-side state wrapped around the conversation: the input line and the
//! scroll position.

use std::cell::Cell;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::core::constants::ASSISTANT_NAME;
use crate::core::conversation::{Conversation, PendingExchange};
use crate::core::message::{Message, Role};
use crate::ui::markdown::render_markdown;

pub struct ChatView {
    pub conversation: Conversation,
    pub input: String,
    pub model: String,
    /// Rows scrolled up from the bottom of the transcript; 0 follows new
    /// messages.
    scroll_from_bottom: u16,
    /// Largest useful scroll value, refreshed on every draw.
    max_scroll: Cell<u16>,
    pub should_quit: bool,
}

impl ChatView {
    pub fn new(conversation: Conversation, model: impl Into<String>) -> Self {
        Self {
            conversation,
            input: String::new(),
            model: model.into(),
            scroll_from_bottom: 0,
            max_scroll: Cell::new(0),
            should_quit: false,
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        if self.conversation.input_enabled() {
            self.input.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.conversation.input_enabled() {
            self.input.pop();
        }
    }

    pub fn submit_enabled(&self) -> bool {
        self.conversation.can_submit(&self.input)
    }

    /// Hand the current input to the conversation. The input line is cleared
    /// only when the submission was accepted.
    pub fn take_submission(&mut self) -> Option<PendingExchange> {
        let pending = self.conversation.submit(&self.input)?;
        self.input.clear();
        self.scroll_to_bottom();
        Some(pending)
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.scroll_from_bottom = self
            .scroll_from_bottom
            .saturating_add(rows)
            .min(self.max_scroll.get());
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_from_bottom = 0;
    }

    /// Top-row offset for a transcript of `total_rows` shown in
    /// `visible_rows`. Records the maximum for later scroll clamping.
    pub fn scroll_offset(&self, total_rows: u16, visible_rows: u16) -> u16 {
        let max = total_rows.saturating_sub(visible_rows);
        self.max_scroll.set(max);
        max.saturating_sub(self.scroll_from_bottom.min(max))
    }

    /// Transcript lines, including the transient "thinking" row while an
    /// exchange is in flight.
    pub fn build_display_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for message in self.conversation.messages() {
            push_message_lines(&mut lines, message);
        }
        if self.conversation.is_pending() {
            lines.push(Line::from(Span::styled(
                format!("{ASSISTANT_NAME} is thinking…"),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        lines
    }
}

fn push_message_lines(lines: &mut Vec<Line<'static>>, message: &Message) {
    match message.role {
        Role::User => {
            let style = Style::default().fg(Color::Cyan);
            let mut text_lines = message.text.lines();
            let first = text_lines.next().unwrap_or_default().to_string();
            lines.push(Line::from(vec![
                Span::styled("You: ", style.add_modifier(Modifier::BOLD)),
                Span::styled(first, style),
            ]));
            for rest in text_lines {
                lines.push(Line::from(Span::styled(format!("     {rest}"), style)));
            }
        }
        Role::Bot => {
            lines.push(Line::from(Span::styled(
                format!("{ASSISTANT_NAME}:"),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.extend(render_markdown(&message.text, Style::default()));
            if !message.sources.is_empty() {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    "Sources",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )));
                for (index, source) in message.sources.iter().enumerate() {
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("  {}. {}", index + 1, source.title),
                            Style::default().fg(Color::Blue),
                        ),
                        Span::styled(
                            format!("  {}", source.uri),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]));
                }
            }
        }
    }
    lines.push(Line::default());
}

/// Word-wrap styled lines to `width` columns. The renderer draws the result
/// without further wrapping, so its length is the exact row count.
pub fn wrap_lines(lines: &[Line<'static>], width: u16) -> Vec<Line<'static>> {
    let max_width = usize::from(width.max(1));
    lines
        .iter()
        .flat_map(|line| wrap_spans(&line.spans, max_width))
        .map(Line::from)
        .collect()
}

fn wrap_spans(spans: &[Span<'static>], max_width: usize) -> Vec<Vec<Span<'static>>> {
    let mut rows = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;

    for span in spans {
        let style = span.style;
        for token in split_words(span.content.as_ref()) {
            let token_width = token.width();
            if current_width + token_width <= max_width {
                push_text(&mut current, token, style);
                current_width += token_width;
                continue;
            }

            // Whitespace at a break point is dropped.
            if token.chars().all(char::is_whitespace) {
                if current_width > 0 {
                    rows.push(finish_row(&mut current));
                    current_width = 0;
                }
                continue;
            }

            if current_width > 0 {
                rows.push(finish_row(&mut current));
                current_width = 0;
            }

            let mut rest = token;
            while rest.width() > max_width {
                let end = fitting_prefix_len(rest, max_width);
                rows.push(vec![Span::styled(rest[..end].to_string(), style)]);
                rest = &rest[end..];
            }
            if !rest.is_empty() {
                push_text(&mut current, rest, style);
                current_width = rest.width();
            }
        }
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(finish_row(&mut current));
    }
    rows
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut previous: Option<bool> = None;
    for (idx, ch) in text.char_indices() {
        let is_space = ch.is_whitespace();
        if previous.is_some_and(|was_space| was_space != is_space) {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        previous = Some(is_space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// Byte length of the longest prefix of `text` within `max_width` columns;
/// at least one character so wide glyphs still make progress.
fn fitting_prefix_len(text: &str, max_width: usize) -> usize {
    let mut width = 0;
    let mut end = 0;
    for (idx, ch) in text.char_indices() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > max_width {
            break;
        }
        width += ch_width;
        end = idx + ch.len_utf8();
    }
    if end == 0 {
        text.chars().next().map_or(text.len(), char::len_utf8)
    } else {
        end
    }
}

fn push_text(row: &mut Vec<Span<'static>>, text: &str, style: Style) {
    match row.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push_str(text),
        _ => row.push(Span::styled(text.to_string(), style)),
    }
}

fn finish_row(row: &mut Vec<Span<'static>>) -> Vec<Span<'static>> {
    let mut row = std::mem::take(row);
    while let Some(last) = row.last_mut() {
        let trimmed_len = last.content.trim_end().len();
        if trimmed_len == 0 {
            row.pop();
            continue;
        }
        last.content.to_mut().truncate(trimmed_len);
        break;
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::GroundingChunk;
    use crate::utils::test_utils::{grounded_response, ScriptedFactory, ScriptedSession};

    fn ready_view() -> ChatView {
        let session = ScriptedSession::new(vec![Ok(grounded_response(
            "Answer",
            vec![GroundingChunk::web(Some("https://a.com"), Some("A"))],
        ))]);
        let mut conversation = Conversation::new();
        conversation.mount(&ScriptedFactory::with_session(session));
        ChatView::new(conversation, "gemini-test")
    }

    #[test]
    fn accepted_submission_clears_input() {
        let mut view = ready_view();
        for ch in "hello".chars() {
            view.insert_char(ch);
        }
        assert!(view.submit_enabled());
        assert!(view.take_submission().is_some());
        assert!(view.input.is_empty());
        assert!(view.conversation.is_pending());
    }

    #[test]
    fn typing_is_blocked_while_pending() {
        let mut view = ready_view();
        view.input = "first".to_string();
        let _pending = view.take_submission().expect("accepted");

        view.insert_char('x');
        assert!(view.input.is_empty());
        assert!(view.take_submission().is_none());
    }

    #[test]
    fn blank_input_is_not_submitted() {
        let mut view = ready_view();
        view.input = "   ".to_string();
        assert!(!view.submit_enabled());
        assert!(view.take_submission().is_none());
        assert_eq!(view.input, "   ");
    }

    #[test]
    fn thinking_row_appears_only_while_pending() {
        let mut view = ready_view();
        let has_thinking = |view: &ChatView| {
            view.build_display_lines().iter().any(|line| {
                line.spans
                    .iter()
                    .any(|span| span.content.contains("is thinking"))
            })
        };
        assert!(!has_thinking(&view));
        view.input = "question".to_string();
        let _pending = view.take_submission();
        assert!(has_thinking(&view));
        // The placeholder is never part of the history.
        assert_eq!(view.conversation.messages().len(), 2);
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut view = ready_view();
        assert_eq!(view.scroll_offset(50, 10), 40);
        view.scroll_up(5);
        assert_eq!(view.scroll_offset(50, 10), 35);
        view.scroll_up(100);
        assert_eq!(view.scroll_offset(50, 10), 0);
        view.scroll_down(3);
        assert_eq!(view.scroll_offset(50, 10), 3);
        view.scroll_to_bottom();
        assert_eq!(view.scroll_offset(50, 10), 40);
        assert_eq!(view.scroll_offset(5, 10), 0);
    }

    fn row_texts(lines: &[Line<'static>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn wrapping_breaks_at_word_boundaries() {
        let lines = vec![Line::from("aa bbbb cc")];
        // Character wrapping would fit this in two rows of five.
        assert_eq!(row_texts(&wrap_lines(&lines, 5)), vec!["aa", "bbbb", "cc"]);
    }

    #[test]
    fn overlong_words_are_hard_broken() {
        let lines = vec![Line::from("abcdefghijkl")];
        assert_eq!(
            row_texts(&wrap_lines(&lines, 5)),
            vec!["abcde", "fghij", "kl"]
        );
    }

    #[test]
    fn empty_lines_keep_their_row() {
        let lines = vec![Line::from("one"), Line::default(), Line::from("two")];
        assert_eq!(row_texts(&wrap_lines(&lines, 10)), vec!["one", "", "two"]);
    }

    #[test]
    fn wrapping_keeps_span_styles() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let lines = vec![Line::from(vec![
            Span::raw("blood pressure is "),
            Span::styled("high", bold),
        ])];
        let wrapped = wrap_lines(&lines, 15);
        assert_eq!(row_texts(&wrapped), vec!["blood pressure", "is high"]);
        let high = wrapped[1]
            .spans
            .iter()
            .find(|span| span.content == "high")
            .expect("styled span");
        assert_eq!(high.style, bold);
    }
}
