use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::tui::component::Component;

const HINTS: &str = "b/f back/fwd  1-9 open  n new  a add  e edit  s save  [ ] page  o sort  / search  : go  q quit";

/// Bottom line: unsaved marker, last status message, key hints.
pub struct StatusBar {
    pub status: String,
    pub dirty: bool,
}

impl Component for StatusBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        if self.dirty {
            spans.push(Span::styled("● unsaved  ", Style::default().fg(Color::Yellow)));
        }
        if !self.status.is_empty() {
            spans.push(Span::raw(format!("{}  ", self.status)));
        }
        spans.push(Span::styled(HINTS, Style::default().fg(Color::DarkGray)));
        frame.render_widget(Line::from(spans), area);
    }
}
