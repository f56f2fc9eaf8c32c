//! # Module Contract
//!
//! A module is one section of the application (orders, customers, ...). The
//! navigator decides *when* a module lists, shows, or creates a record; the
//! module decides *what* to draw.
//!
//! Modules never hold a reference to the navigator. Each call gets an
//! [`Outbox`] where the module queues draw requests and save completions. A
//! module doing slow work can instead deliver the same thing later as
//! [`Action::Draw`] or [`Action::Saved`].

use std::fmt;

use crate::core::action::Action;
use crate::core::browser::Document;
use crate::core::route::Route;

/// Hook run right after a container's HTML is replaced.
pub type DrawHook = Box<dyn FnOnce(&mut dyn Document) + Send>;

/// Pagination and sort arguments handed to `list` / `filter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number.
    pub page: u32,
    pub column: String,
    pub descending: bool,
}

/// Request to replace a container's HTML once the dismiss animation is over.
pub struct DrawRequest {
    pub container: String,
    pub html: String,
    pub after: Option<DrawHook>,
}

impl DrawRequest {
    pub fn new(container: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            html: html.into(),
            after: None,
        }
    }

    pub fn then(mut self, hook: impl FnOnce(&mut dyn Document) + Send + 'static) -> Self {
        self.after = Some(Box::new(hook));
        self
    }
}

impl fmt::Debug for DrawRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawRequest")
            .field("container", &self.container)
            .field("html_len", &self.html.len())
            .field("after", &self.after.is_some())
            .finish()
    }
}

/// Continuation for `Module::save`. Captures the location at the moment
/// save was requested; complete it with the persisted record id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveTicket {
    pub route: Route,
}

impl SaveTicket {
    pub fn complete(self, id: impl Into<String>) -> Action {
        Action::Saved {
            ticket: self,
            id: id.into(),
        }
    }
}

/// Failure reported by `Module::changed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleError {
    pub message: String,
}

impl ModuleError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ModuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module error: {}", self.message)
    }
}

impl std::error::Error for ModuleError {}

/// Commands a module queues during a call.
#[derive(Debug, Default)]
pub struct Outbox {
    actions: Vec<Action>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, container: impl Into<String>, html: impl Into<String>) {
        self.actions
            .push(Action::Draw(DrawRequest::new(container, html)));
    }

    pub fn saved(&mut self, ticket: SaveTicket, id: impl Into<String>) {
        self.actions.push(ticket.complete(id));
    }

    /// Queues an action built elsewhere, e.g. one that would otherwise be
    /// delivered asynchronously.
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}

/// A section of the application, driven by the navigator.
pub trait Module {
    /// Draw page `query.page` of the unfiltered list.
    fn list(&mut self, out: &mut Outbox, query: &ListQuery);

    /// Draw page `query.page` of the list matching `text`.
    fn filter(&mut self, out: &mut Outbox, text: &str, query: &ListQuery);

    /// Show an existing record.
    fn see(&mut self, out: &mut Outbox, id: &str);

    /// Show an empty record for creation.
    fn add(&mut self, out: &mut Outbox);

    /// Persist the displayed record, then complete `ticket` with its id.
    fn save(&mut self, out: &mut Outbox, ticket: SaveTicket);

    /// A child record (`child` module, `child_id`) was saved.
    fn refresh(&mut self, out: &mut Outbox, child: &str, child_id: &str);

    /// Whether the displayed record has unsaved edits.
    fn changed(&self) -> Result<bool, ModuleError>;
}
