//! # Table Module
//!
//! A [`Module`] over one table of the record store. The list view is a
//! sorted page of records; the record view shows the open draft and, for
//! tables with a child table, the child rows it owns.
//!
//! ## Latency
//!
//! With a [`Backend`] built by `Backend::delayed`, draws and save completions
//! are posted back as actions from a tokio task after the configured delay,
//! the way a fetch would land. `Backend::immediate` hands them straight to
//! the call's `Outbox`.
//!
//! ```text
//! see("5") ──► render ──► Backend::deliver ──► Outbox          (immediate)
//!                                         └──► tokio::spawn ──► sleep ──► mpsc::Sender<Action>
//! ```

use std::sync::mpsc::Sender;
use std::time::Duration;

use log::{debug, warn};
use tokio::runtime::Handle;

use crate::core::action::Action;
use crate::core::module::{DrawRequest, ListQuery, Module, ModuleError, Outbox, SaveTicket};
use crate::core::route::Route;
use crate::demo::records::{Draft, Page};
use crate::demo::workspace::{RowLinks, Workspace};

/// Class set on a grid while it shows an unsaved new record.
pub const NEW_RECORD_CLASS: &str = "new";

#[derive(Clone, Debug)]
pub struct Backend {
    latency: Duration,
    sender: Option<Sender<Action>>,
    runtime: Option<Handle>,
}

impl Backend {
    /// Everything is delivered inside the call.
    pub fn immediate() -> Self {
        Self {
            latency: Duration::ZERO,
            sender: None,
            runtime: None,
        }
    }

    /// Deliveries arrive on `sender` after `latency`. Falls back to
    /// immediate delivery outside a tokio runtime or with zero latency.
    pub fn delayed(sender: Sender<Action>, latency: Duration) -> Self {
        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            warn!("backend: no tokio runtime, delivering immediately");
        }
        Self {
            latency,
            sender: Some(sender),
            runtime,
        }
    }

    pub fn deliver(&self, out: &mut Outbox, action: Action) {
        match (&self.sender, &self.runtime) {
            (Some(sender), Some(runtime)) if !self.latency.is_zero() => {
                let sender = sender.clone();
                let latency = self.latency;
                runtime.spawn(async move {
                    tokio::time::sleep(latency).await;
                    if sender.send(action).is_err() {
                        debug!("backend: receiver dropped");
                    }
                });
            }
            _ => out.push(action),
        }
    }
}

pub struct TableModule {
    name: String,
    label: String,
    grid: String,
    /// Table whose rows the record view lists.
    child: Option<String>,
    workspace: Workspace,
    backend: Backend,
    current: Option<u64>,
}

impl TableModule {
    pub fn new(name: &str, label: &str, workspace: Workspace, backend: Backend) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            grid: format!("{name}-grid"),
            child: None,
            workspace,
            backend,
            current: None,
        }
    }

    pub fn with_child(mut self, child: &str) -> Self {
        self.child = Some(child.to_string());
        self
    }

    pub fn grid(&self) -> &str {
        &self.grid
    }

    fn show_list(&mut self, out: &mut Outbox, text: Option<&str>, query: &ListQuery) {
        let page = self.workspace.store().query(&self.name, text, query);
        self.workspace.set_rows(
            &self.name,
            RowLinks {
                module: self.name.clone(),
                ids: page.rows.iter().map(|r| r.id).collect(),
                total_pages: page.total_pages,
            },
        );
        let html = render_list(&self.label, &page, query, text);
        self.backend
            .deliver(out, Action::Draw(DrawRequest::new(&self.grid, html)));
    }

    fn show_record(&mut self, out: &mut Outbox) {
        let Some(draft) = self.workspace.draft(&self.name) else {
            return;
        };
        let mut lines = vec![
            if draft.id == 0 {
                format!("New {}", self.label.to_lowercase())
            } else {
                format!("{} #{}", self.label, draft.id)
            },
            format!("  title: {}", draft.title),
            format!("  notes: {}", draft.notes),
        ];

        if let Some(child) = &self.child {
            let store = self.workspace.store();
            let children = if draft.id == 0 {
                Vec::new()
            } else {
                store.children(child, draft.id)
            };
            lines.push(String::new());
            lines.push(format!("{child}:"));
            if children.is_empty() {
                lines.push("  (none)".to_string());
            }
            for (n, record) in children.iter().enumerate() {
                lines.push(format!("  [{}] #{:<4} {}", n + 1, record.id, record.title));
            }
            let ids = children.iter().map(|r| r.id).collect();
            drop(store);
            self.workspace.set_rows(
                &self.name,
                RowLinks {
                    module: child.clone(),
                    ids,
                    total_pages: 1,
                },
            );
        }

        let grid = self.grid.clone();
        let is_new = draft.id == 0;
        let request = DrawRequest::new(&self.grid, lines.join("\n"))
            .then(move |doc| doc.toggle_class(&grid, NEW_RECORD_CLASS, is_new));
        self.backend.deliver(out, Action::Draw(request));
    }
}

impl Module for TableModule {
    fn list(&mut self, out: &mut Outbox, query: &ListQuery) {
        self.show_list(out, None, query);
    }

    fn filter(&mut self, out: &mut Outbox, text: &str, query: &ListQuery) {
        self.show_list(out, Some(text), query);
    }

    fn see(&mut self, out: &mut Outbox, id: &str) {
        let record = id
            .parse::<u64>()
            .ok()
            .and_then(|id| self.workspace.store().get(&self.name, id).map(Draft::from));
        match record {
            Some(draft) => {
                self.current = Some(draft.id);
                self.workspace.open_draft(&self.name, draft);
                self.show_record(out);
            }
            None => {
                warn!("{}: no record '{id}'", self.name);
                self.current = None;
                self.workspace.close_draft(&self.name);
                let html = format!("{} #{id} not found", self.label);
                self.backend
                    .deliver(out, Action::Draw(DrawRequest::new(&self.grid, html)));
            }
        }
    }

    fn add(&mut self, out: &mut Outbox) {
        self.current = None;
        self.workspace.open_draft(&self.name, Draft::default());
        self.show_record(out);
    }

    fn save(&mut self, out: &mut Outbox, ticket: SaveTicket) {
        let Some(draft) = self.workspace.draft(&self.name) else {
            warn!("{}: save with no open record", self.name);
            return;
        };
        let parent = parent_id(&ticket.route);
        let stored = self.workspace.store().upsert(&self.name, &draft, parent);
        match stored {
            Ok(id) => {
                self.workspace.mark_saved(&self.name, id);
                self.current = Some(id);
                self.backend.deliver(out, ticket.complete(id.to_string()));
            }
            Err(e) => warn!("{}: failed to store record: {e}", self.name),
        }
    }

    fn refresh(&mut self, out: &mut Outbox, child: &str, child_id: &str) {
        debug!("{}: child {child} #{child_id} saved", self.name);
        if self.current.is_some() {
            self.show_record(out);
        }
    }

    fn changed(&self) -> Result<bool, ModuleError> {
        Ok(self.workspace.is_dirty(&self.name))
    }
}

/// Record id of the parent pair, for routes nested one level or more.
fn parent_id(route: &Route) -> Option<u64> {
    if route.len() <= 2 {
        return None;
    }
    route.get(route.len() - 3)?.parse().ok()
}

fn render_list(label: &str, page: &Page, query: &ListQuery, text: Option<&str>) -> String {
    let arrow = if query.descending { "↓" } else { "↑" };
    let mut lines = vec![format!(
        "{label} · sorted by {} {arrow}{}",
        query.column,
        text.map(|t| format!(" · matching \"{t}\"")).unwrap_or_default()
    )];
    if page.rows.is_empty() {
        lines.push("  (no records)".to_string());
    }
    for (n, record) in page.rows.iter().enumerate() {
        lines.push(format!(
            "  [{}] #{:<4} {:<24} {}",
            n + 1,
            record.id,
            record.title,
            record.updated_at.format("%Y-%m-%d %H:%M")
        ));
    }
    lines.join("\n")
}
