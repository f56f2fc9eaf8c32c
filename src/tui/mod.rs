//! # TUI Host
//!
//! The ratatui-specific layer. Renders the simulated browser (address bar,
//! sidebar, visible containers, status line) and translates keyboard events
//! into navigator `Action`s. Notices drained from the navigator drive the
//! status line, the dim-while-animating effect and the unsaved dialog.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! The event loop uses conditional redraw:
//!
//! - **Timer pending**: sleeps until the navigator's next deadline so
//!   deferred view updates and draws land on time.
//! - **Animating** (waiting on a backend delivery): polls every ~30ms.
//! - **Idle**: sleeps up to 250ms, only redraws on events, backend
//!   deliveries or notices.

mod component;
mod components;
mod event;
mod ui;

use std::io::{self, stdout};
use std::sync::mpsc;
use std::time::Duration;

use crossterm::cursor::{Hide, Show};
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::execute;
use log::{debug, info, warn};

use crate::core::action::{Action, Notice};
use crate::core::browser::{Clock, Document, MemoryBrowser};
use crate::core::config::ResolvedConfig;
use crate::core::error::NavError;
use crate::core::history::History;
use crate::core::navigator::Navigator;
use crate::core::registry::Registry;
use crate::core::route::{NEW_RECORD, Route};
use crate::demo;
use crate::demo::records::RecordStore;
use crate::demo::table::Backend;
use crate::demo::workspace::Workspace;
use crate::tui::component::EventHandler;
use crate::tui::components::{Dialog, DialogEvent, DialogKind, Prompt, PromptEvent, PromptKind, SidebarEntry};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const BUSY_POLL: Duration = Duration::from_millis(30);
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Columns `o` cycles through.
pub const SORT_COLUMNS: [&str; 3] = ["id", "title", "updated"];

/// TUI-specific presentation state (not part of the navigator)
pub struct TuiState {
    pub sidebar: Vec<SidebarEntry>,
    pub selected: usize,
    pub status: String,
    /// Between `Notice::Dismiss` and `Notice::Welcome`.
    pub animating: bool,
    pub dialog: Option<Dialog>,
    pub prompt: Option<Prompt>,
}

impl TuiState {
    pub fn new(registry: &Registry) -> Self {
        let sidebar = registry
            .iter()
            .map(|(name, r)| SidebarEntry {
                name: name.to_string(),
                label: r.label.clone(),
                icon: r.icon.clone(),
            })
            .collect();
        Self {
            sidebar,
            selected: 0,
            status: String::new(),
            animating: false,
            dialog: None,
            prompt: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        execute!(stdout(), EnableBracketedPaste, Hide)?;
        info!("Terminal modes enabled (bracketed paste, hidden cursor)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableBracketedPaste, Show);
    }
}

pub fn run(config: ResolvedConfig, start_url: &str) -> io::Result<()> {
    let store = match &config.data_file {
        Some(path) => RecordStore::open(path)?,
        None => RecordStore::in_memory(),
    };

    // Channel for draws and save completions from backend tasks
    let (tx, rx) = mpsc::channel();
    let backend = Backend::delayed(tx, Duration::from_millis(config.latency_ms));
    let demo = demo::build(store, backend).map_err(io::Error::other)?;
    let workspace = demo.workspace;

    let mut tui = TuiState::new(&demo.registry);
    let mut nav = Navigator::new(
        MemoryBrowser::realtime(start_url),
        demo.registry,
        config.navigator.clone(),
    );
    report(&mut tui, nav.start());

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new()
        .inspect_err(|e| warn!("Failed to set terminal modes: {}", e))
        .ok();
    let mut needs_redraw = true; // Force first frame

    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw_ui(f, &nav, &workspace, &mut tui))?;
            needs_redraw = false;
        }

        let busy = tui.animating || nav.has_pending_work();
        let timeout = poll_timeout(&nav, tui.animating);
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        let mut should_quit = false;
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if handle_event(event, &mut nav, &workspace, &mut tui) == Flow::Quit {
                should_quit = true;
                break;
            }
        }
        if should_quit {
            break;
        }

        // Backend deliveries (simulated fetch latency)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            report(&mut tui, nav.dispatch(action));
        }

        if busy || nav.browser().pending_popstates() > 0 {
            needs_redraw = true;
        }
        report(&mut tui, nav.tick());
        let notices = nav.drain_notices();
        if !notices.is_empty() {
            needs_redraw = true;
            apply_notices(&mut tui, notices);
        }
    }

    ratatui::restore();
    info!("Wayfinder shutting down at {}", nav.browser().pathname());
    Ok(())
}

/// How long to wait for input before the next tick.
fn poll_timeout(nav: &Navigator<MemoryBrowser>, animating: bool) -> Duration {
    let cap = if animating { BUSY_POLL } else { IDLE_POLL };
    match nav.next_deadline() {
        Some(due) => Duration::from_millis(due.saturating_sub(nav.browser().now_ms())).min(cap),
        None => cap,
    }
}

fn report(tui: &mut TuiState, result: Result<(), NavError>) {
    if let Err(e) = result {
        warn!("Navigation failed: {}", e);
        tui.status = e.to_string();
    }
}

fn apply_notices(tui: &mut TuiState, notices: Vec<Notice>) {
    for notice in notices {
        match notice {
            Notice::Dismiss => tui.animating = true,
            Notice::Welcome => tui.animating = false,
            Notice::Drawn => {}
            Notice::Unsaved => tui.dialog = Some(Dialog::new(DialogKind::Unsaved)),
            Notice::SectionChanged => tui.status.clear(),
            Notice::InvalidUrl => tui.status = "Unknown address, showing the default page".to_string(),
            Notice::Unload => debug!("Unload requested"),
            Notice::Listed(module) => tui.status = format!("{module}: list"),
            Notice::Seen(module) => tui.status = format!("{module}: record"),
            Notice::Adding(module) => tui.status = format!("{module}: new record"),
        }
    }
}

fn handle_event(
    event: TuiEvent,
    nav: &mut Navigator<MemoryBrowser>,
    workspace: &Workspace,
    tui: &mut TuiState,
) -> Flow {
    match event {
        TuiEvent::ForceQuit => return Flow::Quit,
        TuiEvent::Resize => return Flow::Continue,
        _ => {}
    }

    // When the dialog is open, route all events to it
    if let Some(dialog) = &mut tui.dialog {
        match dialog.handle_event(&event) {
            Some(DialogEvent::Confirm) => {
                let kind = dialog.kind;
                tui.dialog = None;
                match kind {
                    DialogKind::Unsaved => nav.discard(),
                    DialogKind::Quit => return Flow::Quit,
                }
            }
            Some(DialogEvent::Cancel) => tui.dialog = None,
            None => {}
        }
        return Flow::Continue;
    }

    if let Some(prompt) = &mut tui.prompt {
        if let Some(prompt_event) = prompt.handle_event(&event) {
            let kind = prompt.kind;
            tui.prompt = None;
            if let PromptEvent::Submit(text) = prompt_event {
                submit_prompt(kind, &text, nav, workspace, tui);
            }
        }
        return Flow::Continue;
    }

    let action = match event {
        TuiEvent::CursorUp => {
            tui.selected = tui.selected.saturating_sub(1);
            None
        }
        TuiEvent::CursorDown => {
            tui.selected = (tui.selected + 1).min(tui.sidebar.len().saturating_sub(1));
            None
        }
        TuiEvent::Submit => tui
            .sidebar
            .get(tui.selected)
            .map(|entry| Action::Load(entry.name.clone())),
        TuiEvent::InputChar('q') => {
            if nav.before_unload() {
                tui.dialog = Some(Dialog::new(DialogKind::Quit));
                None
            } else {
                return Flow::Quit;
            }
        }
        TuiEvent::InputChar('b') => {
            nav.browser_mut().back();
            None
        }
        TuiEvent::InputChar('f') => {
            nav.browser_mut().forward();
            None
        }
        TuiEvent::InputChar(c @ '1'..='9') => {
            let row = c as usize - '1' as usize;
            let action = open_row(nav, workspace, row);
            if action.is_none() {
                tui.status = format!("No row {}", row + 1);
            }
            action
        }
        TuiEvent::InputChar('n') => new_record(nav),
        TuiEvent::InputChar('a') => {
            let action = add_child(nav, workspace);
            if action.is_none() {
                tui.status = "Nothing to add here".to_string();
            }
            action
        }
        TuiEvent::InputChar('e') => {
            match view_module(nav).and_then(|m| workspace.draft(&m)) {
                Some(draft) => tui.prompt = Some(Prompt::new(PromptKind::EditTitle, &draft.title)),
                None => tui.status = "No record open".to_string(),
            }
            None
        }
        TuiEvent::InputChar('s') => Some(Action::Save),
        TuiEvent::InputChar('[') if nav.state().is_bare() => Some(Action::ListPrevious),
        TuiEvent::InputChar(']') if nav.state().is_bare() => Some(Action::ListNext),
        TuiEvent::InputChar('o') if nav.state().is_bare() => {
            let current = nav.list().column.as_str();
            let next = SORT_COLUMNS
                .iter()
                .position(|c| *c == current)
                .map(|i| SORT_COLUMNS[(i + 1) % SORT_COLUMNS.len()])
                .unwrap_or(SORT_COLUMNS[0]);
            Some(Action::Filter(Some(next.to_string())))
        }
        TuiEvent::InputChar('O') if nav.state().is_bare() => {
            Some(Action::Filter(Some(nav.list().column.clone())))
        }
        TuiEvent::InputChar('/') => {
            let current = nav
                .config()
                .search_input
                .as_deref()
                .map(|input| nav.browser().input_value(input))
                .unwrap_or_default();
            tui.prompt = Some(Prompt::new(PromptKind::Search, &current));
            None
        }
        TuiEvent::InputChar(':') => {
            tui.prompt = Some(Prompt::new(PromptKind::Link, &nav.browser().pathname()));
            None
        }
        _ => None,
    };

    if let Some(action) = action {
        debug!("Key dispatch: {:?}", action);
        report(tui, nav.dispatch(action));
    }
    Flow::Continue
}

fn submit_prompt(
    kind: PromptKind,
    text: &str,
    nav: &mut Navigator<MemoryBrowser>,
    workspace: &Workspace,
    tui: &mut TuiState,
) {
    match kind {
        PromptKind::Search => {
            let Some(input) = nav.config().search_input.clone() else {
                tui.status = "Search is disabled".to_string();
                return;
            };
            nav.browser_mut().set_input_value(&input, text.trim());
            report(tui, nav.dispatch(Action::Filter(None)));
        }
        PromptKind::Link => {
            let path = if text.starts_with('/') {
                text.to_string()
            } else {
                format!("/{text}")
            };
            let route = Route::parse(&path).without_empty();
            if route.is_empty() {
                tui.status = "Empty address".to_string();
                return;
            }
            report(tui, nav.dispatch(Action::Link(route)));
        }
        PromptKind::EditTitle => {
            let edited = view_module(nav).is_some_and(|m| workspace.edit(&m, Some(text), None));
            tui.status = if edited {
                "Edited, press s to save".to_string()
            } else {
                "No record open".to_string()
            };
        }
    }
}

/// Module whose container is in front: the leaf in record mode, the main
/// module in list mode.
fn view_module(nav: &Navigator<MemoryBrowser>) -> Option<String> {
    let state = nav.state();
    state.leaf_module().or_else(|| state.root()).map(str::to_string)
}

fn open_row(nav: &Navigator<MemoryBrowser>, workspace: &Workspace, row: usize) -> Option<Action> {
    let view = view_module(nav)?;
    let rows = workspace.rows(&view)?;
    let id = rows.ids.get(row)?.to_string();
    if nav.state().is_bare() {
        return Some(Action::See {
            module: None,
            id: Some(id),
            multiple: false,
        });
    }
    // In record mode the rows are the record's children
    (rows.module != view).then_some(Action::See {
        module: Some(rows.module),
        id: Some(id),
        multiple: false,
    })
}

fn add_child(nav: &Navigator<MemoryBrowser>, workspace: &Workspace) -> Option<Action> {
    if nav.state().is_bare() {
        return None;
    }
    let view = view_module(nav)?;
    let rows = workspace.rows(&view)?;
    (rows.module != view).then_some(Action::See {
        module: Some(rows.module),
        id: None,
        multiple: false,
    })
}

fn new_record(nav: &Navigator<MemoryBrowser>) -> Option<Action> {
    let state = nav.state();
    if state.is_bare() {
        return Some(Action::See {
            module: None,
            id: None,
            multiple: false,
        });
    }
    let root = state.root()?;
    Some(Action::Link(Route::new([root, NEW_RECORD])))
}
