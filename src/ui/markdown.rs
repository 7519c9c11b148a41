//! Markdown to terminal lines.
//!
//! Model replies are Markdown (bold key terms, bullet lists, the occasional
//! heading). This renderer covers that subset and degrades everything else to
//! plain text; wrapping is left to the paragraph widget.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

#[derive(Clone, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct MarkdownRenderer {
    base: Style,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    indent_stack: Vec<usize>,
    current: Vec<Span<'static>>,
    lines: Vec<Line<'static>>,
    in_code_block: bool,
    link_stack: Vec<String>,
}

impl MarkdownRenderer {
    fn new(base: Style) -> Self {
        Self {
            base,
            style_stack: Vec::new(),
            list_stack: Vec::new(),
            indent_stack: Vec::new(),
            current: Vec::new(),
            lines: Vec::new(),
            in_code_block: false,
            link_stack: Vec::new(),
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or(self.base)
    }

    fn push_style(&mut self, modifier: Modifier) {
        let style = self.style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn continuation_indent(&self) -> usize {
        self.indent_stack.iter().sum()
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn start_continuation_line(&mut self) {
        self.flush();
        let indent = self.continuation_indent();
        if indent > 0 {
            self.current.push(Span::raw(" ".repeat(indent)));
        }
    }

    fn blank_line(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            return;
        }
        if !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_code_block {
            let style = code_style();
            for (i, line) in text.split('\n').enumerate() {
                if i > 0 {
                    self.start_continuation_line();
                }
                if !line.is_empty() {
                    self.current.push(Span::styled(format!("  {line}"), style));
                }
            }
            return;
        }
        let style = self.style();
        self.current.push(Span::styled(text.to_string(), style));
    }

    fn render(mut self, content: &str) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);

        for event in Parser::new_ext(content, options) {
            match event {
                Event::Start(tag) => match tag {
                    Tag::Paragraph => {
                        if self.list_stack.is_empty() {
                            self.flush();
                        }
                    }
                    Tag::Heading { level, .. } => {
                        self.flush();
                        let modifier = if level == HeadingLevel::H1 {
                            Modifier::BOLD | Modifier::UNDERLINED
                        } else {
                            Modifier::BOLD
                        };
                        self.push_style(modifier);
                    }
                    Tag::BlockQuote(_) => {
                        self.flush();
                        self.push_style(Modifier::ITALIC);
                    }
                    Tag::List(start) => {
                        self.flush();
                        self.list_stack.push(match start {
                            Some(n) => ListKind::Ordered(n),
                            None => ListKind::Unordered,
                        });
                    }
                    Tag::Item => {
                        self.flush();
                        let marker = match self.list_stack.last_mut() {
                            Some(ListKind::Ordered(n)) => {
                                let marker = format!("{n}. ");
                                *n += 1;
                                marker
                            }
                            _ => "• ".to_string(),
                        };
                        let indent = self.continuation_indent();
                        if indent > 0 {
                            self.current.push(Span::raw(" ".repeat(indent)));
                        }
                        self.indent_stack.push(marker.width());
                        self.current.push(Span::styled(
                            marker,
                            Style::default().fg(Color::Cyan),
                        ));
                    }
                    Tag::CodeBlock(_) => {
                        self.flush();
                        self.in_code_block = true;
                    }
                    Tag::Emphasis => self.push_style(Modifier::ITALIC),
                    Tag::Strong => self.push_style(Modifier::BOLD),
                    Tag::Strikethrough => self.push_style(Modifier::CROSSED_OUT),
                    Tag::Link { dest_url, .. } => {
                        self.push_style(Modifier::UNDERLINED);
                        self.link_stack.push(dest_url.to_string());
                    }
                    _ => {}
                },
                Event::End(tag_end) => match tag_end {
                    TagEnd::Paragraph => {
                        if self.list_stack.is_empty() {
                            self.blank_line();
                        } else {
                            self.flush();
                        }
                    }
                    TagEnd::Heading(_) => {
                        self.style_stack.pop();
                        self.blank_line();
                    }
                    TagEnd::BlockQuote(_) => {
                        self.style_stack.pop();
                        self.blank_line();
                    }
                    TagEnd::List(_) => {
                        self.flush();
                        self.list_stack.pop();
                        if self.list_stack.is_empty() {
                            self.blank_line();
                        }
                    }
                    TagEnd::Item => {
                        self.flush();
                        self.indent_stack.pop();
                    }
                    TagEnd::CodeBlock => {
                        self.in_code_block = false;
                        self.blank_line();
                    }
                    TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                        self.style_stack.pop();
                    }
                    TagEnd::Link => {
                        self.style_stack.pop();
                        if let Some(url) = self.link_stack.pop() {
                            let already_shown = self
                                .current
                                .last()
                                .is_some_and(|span| span.content.as_ref() == url);
                            if !already_shown {
                                self.current.push(Span::styled(
                                    format!(" ({url})"),
                                    Style::default().fg(Color::DarkGray),
                                ));
                            }
                        }
                    }
                    _ => {}
                },
                Event::Text(text) => self.text(&text),
                Event::Code(code) => {
                    self.current
                        .push(Span::styled(code.to_string(), code_style()));
                }
                Event::SoftBreak => self.current.push(Span::raw(" ")),
                Event::HardBreak => self.start_continuation_line(),
                Event::Rule => {
                    self.flush();
                    self.lines.push(Line::styled(
                        "─".repeat(24),
                        Style::default().fg(Color::DarkGray),
                    ));
                    self.blank_line();
                }
                Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
                _ => {}
            }
        }

        self.flush();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

fn code_style() -> Style {
    Style::default().fg(Color::Yellow)
}

/// Render Markdown `content` into owned lines using `base` as the text style.
pub fn render_markdown(content: &str, base: Style) -> Vec<Line<'static>> {
    MarkdownRenderer::new(base).render(content)
}
