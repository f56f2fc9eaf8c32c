//! # GridView Component
//!
//! Renders the visible containers of the simulated document, stacked
//! vertically. While a dismiss animation runs the content is dimmed.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::tui::component::Component;

pub struct Pane {
    pub id: String,
    pub html: String,
    /// Shows an unsaved new record.
    pub is_new: bool,
}

pub struct GridView {
    pub panes: Vec<Pane>,
    pub dimmed: bool,
    /// Pagination line under the list view.
    pub footer: Option<String>,
}

impl Component for GridView {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let (body, footer_area) = match self.footer {
            Some(_) => {
                let [body, footer] =
                    Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(area);
                (body, Some(footer))
            }
            None => (area, None),
        };

        let text_style = if self.dimmed {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };

        if self.panes.is_empty() {
            let empty = Paragraph::new("(nothing to show)").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, body);
        } else {
            let constraints = self.panes.iter().map(|_| Constraint::Fill(1));
            let areas = Layout::vertical(constraints).split(body);
            for (pane, pane_area) in self.panes.iter().zip(areas.iter()) {
                let mut title = format!(" {} ", pane.id);
                if pane.is_new {
                    title.push_str("(new) ");
                }
                let paragraph = Paragraph::new(pane.html.as_str())
                    .style(text_style)
                    .wrap(Wrap { trim: false })
                    .block(
                        Block::default()
                            .borders(Borders::TOP)
                            .border_style(Style::default().fg(Color::DarkGray))
                            .title(title),
                    );
                frame.render_widget(paragraph, *pane_area);
            }
        }

        if let (Some(footer), Some(footer_area)) = (&self.footer, footer_area) {
            frame.render_widget(Line::from(footer.as_str()).centered(), footer_area);
        }
    }
}
