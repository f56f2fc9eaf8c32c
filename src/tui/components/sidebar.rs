//! # Sidebar Component
//!
//! Main modules, one per line. The cursor row follows ↑/↓; the active
//! marker follows the CSS class the navigator toggles, so it only moves
//! once a load actually goes through.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use crate::tui::component::Component;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub name: String,
    pub label: String,
    pub icon: String,
}

pub struct Sidebar<'a> {
    pub entries: &'a [SidebarEntry],
    pub selected: usize,
    /// Per entry: does it carry the active class.
    pub active: Vec<bool>,
}

impl Component for Sidebar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .zip(self.active.iter().copied().chain(std::iter::repeat(false)))
            .map(|(entry, active)| {
                let marker = if active { "▌" } else { " " };
                let style = if active {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Cyan)),
                    Span::styled(format!("{} {}", entry.icon, entry.label), style),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::RIGHT)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}
