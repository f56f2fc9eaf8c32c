//! # Prompt Component
//!
//! One-line text input shown over the status bar for search, link and edit.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Search,
    Link,
    EditTitle,
}

impl PromptKind {
    fn label(self) -> &'static str {
        match self {
            PromptKind::Search => "search: ",
            PromptKind::Link => "go to: ",
            PromptKind::EditTitle => "title: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
    Submit(String),
    Cancel,
}

#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    pub buffer: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, initial: &str) -> Self {
        Self {
            kind,
            buffer: initial.to_string(),
        }
    }
}

impl EventHandler for Prompt {
    type Event = PromptEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<PromptEvent> {
        match event {
            TuiEvent::InputChar(c) => {
                self.buffer.push(*c);
                None
            }
            TuiEvent::Paste(text) => {
                self.buffer.push_str(text.lines().next().unwrap_or_default());
                None
            }
            TuiEvent::Backspace => {
                self.buffer.pop();
                None
            }
            TuiEvent::Submit => Some(PromptEvent::Submit(std::mem::take(&mut self.buffer))),
            TuiEvent::Escape => Some(PromptEvent::Cancel),
            _ => None,
        }
    }
}

impl Component for Prompt {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let label = self.kind.label();
        let line = Line::from(vec![
            Span::styled(label, Style::default().fg(Color::Cyan)),
            Span::raw(self.buffer.as_str()),
        ]);
        frame.render_widget(line, area);
        let x = area.x + (label.width() + self.buffer.width()) as u16;
        frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
    }
}
