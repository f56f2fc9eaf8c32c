//! # Confirm Dialog
//!
//! Centered overlay asking whether to drop unsaved edits. Opened when the
//! navigator blocks a move (`Notice::Unsaved`) or when quitting with edits
//! pending. `y` confirms, `n` or Esc keeps editing.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    /// A navigation was reverted; confirming replays it.
    Unsaved,
    /// Quit requested with edits pending.
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogEvent {
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialog {
    pub kind: DialogKind,
}

impl Dialog {
    pub fn new(kind: DialogKind) -> Self {
        Self { kind }
    }
}

impl EventHandler for Dialog {
    type Event = DialogEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<DialogEvent> {
        match event {
            TuiEvent::InputChar('y') | TuiEvent::InputChar('Y') => Some(DialogEvent::Confirm),
            TuiEvent::InputChar('n') | TuiEvent::InputChar('N') | TuiEvent::Escape => {
                Some(DialogEvent::Cancel)
            }
            _ => None,
        }
    }
}

impl Component for Dialog {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let question = match self.kind {
            DialogKind::Unsaved => "This record has unsaved changes. Leave anyway?",
            DialogKind::Quit => "Unsaved changes will be lost. Quit anyway?",
        };
        let overlay = centered_rect(50, 7, area);
        frame.render_widget(Clear, overlay);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Unsaved changes ")
            .title_bottom(Line::from(" y Leave  n Stay ").centered())
            .padding(Padding::uniform(1));
        let paragraph = Paragraph::new(question)
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, overlay);
    }
}

/// Centered rect `percent_x` wide and `height` rows tall.
pub fn centered_rect(percent_x: u16, height: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height),
        Constraint::Fill(1),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
