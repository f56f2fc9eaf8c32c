use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::browser::MemoryBrowser;
use crate::core::history::History;
use crate::core::navigator::Navigator;
use crate::demo::table::NEW_RECORD_CLASS;
use crate::demo::workspace::Workspace;
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{AddressBar, GridView, Pane, Sidebar, StatusBar};

const SIDEBAR_WIDTH: u16 = 20;

pub fn draw_ui(frame: &mut Frame, nav: &Navigator<MemoryBrowser>, workspace: &Workspace, tui: &mut TuiState) {
    use Constraint::{Length, Min};
    let full = frame.area();
    let [address_area, main_area, status_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(full);
    let [sidebar_area, content_area] =
        Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(main_area);

    let browser = nav.browser();
    AddressBar {
        url: browser.pathname(),
        title: browser.title().to_string(),
        can_back: browser.index() > 0,
        can_forward: browser.index() + 1 < browser.len(),
    }
    .render(frame, address_area);

    let active_class = nav.config().active_class.as_deref();
    let active = tui
        .sidebar
        .iter()
        .map(|entry| active_class.is_some_and(|class| browser.has_class(&entry.name, class)))
        .collect();
    Sidebar {
        entries: &tui.sidebar,
        selected: tui.selected,
        active,
    }
    .render(frame, sidebar_area);

    let panes = browser
        .containers()
        .iter()
        .filter(|c| c.visible)
        .map(|c| Pane {
            id: c.id.clone(),
            html: c.html.clone(),
            is_new: browser.has_class(&c.id, NEW_RECORD_CLASS),
        })
        .collect();
    let footer = if nav.state().is_bare() {
        nav.main_module()
            .and_then(|m| workspace.rows(m))
            .and_then(|rows| nav.list_bar(rows.total_pages))
    } else {
        None
    };
    GridView {
        panes,
        dimmed: tui.animating,
        footer,
    }
    .render(frame, content_area);

    match &mut tui.prompt {
        Some(prompt) => prompt.render(frame, status_area),
        None => StatusBar {
            status: tui.status.clone(),
            dirty: nav.changed(),
        }
        .render(frame, status_area),
    }

    if let Some(dialog) = &mut tui.dialog {
        dialog.render(frame, full);
    }
}
