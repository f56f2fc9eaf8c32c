//! # AddressBar Component
//!
//! Top line: back/forward availability, the current URL and the document
//! title. The title is cut first when the terminal is narrow; the URL is
//! cut only when it cannot fit on its own.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::Component;

pub struct AddressBar {
    pub url: String,
    pub title: String,
    pub can_back: bool,
    pub can_forward: bool,
}

impl Component for AddressBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let enabled = Style::default().fg(Color::White);
        let disabled = Style::default().fg(Color::DarkGray);
        let arrows = vec![
            Span::styled("◀ ", if self.can_back { enabled } else { disabled }),
            Span::styled("▶  ", if self.can_forward { enabled } else { disabled }),
        ];
        let used: usize = arrows.iter().map(|s| s.content.width()).sum();
        let available = (area.width as usize).saturating_sub(used);

        let url = fit(&self.url, available);
        let remaining = available.saturating_sub(url.width() + 3);
        let title = fit(&self.title, remaining);

        let mut spans = arrows;
        spans.push(Span::styled(url, Style::default().add_modifier(Modifier::BOLD)));
        if !title.is_empty() {
            spans.push(Span::styled(" · ", disabled));
            spans.push(Span::styled(title, Style::default().fg(Color::Gray)));
        }
        frame.render_widget(Line::from(spans), area);
    }
}

/// Truncates `text` to `width` terminal columns, ending in `…` when cut.
pub fn fit(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
