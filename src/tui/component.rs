use ratatui::Frame;
use ratatui::layout::Rect;

use crate::tui::event::TuiEvent;

/// Something drawn into a region of the terminal.
///
/// Stateless pieces (address bar, sidebar, panes) are rebuilt from the
/// navigator every frame; the dialog and prompt live in `TuiState`.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// Turns key events into a component-specific outcome.
pub trait EventHandler {
    type Event;

    /// `None` while the component is still collecting input.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
