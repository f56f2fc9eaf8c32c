//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::browser::MemoryBrowser;
use crate::core::config::NavigatorConfig;
use crate::core::module::{ListQuery, Module, ModuleError, Outbox, SaveTicket};
use crate::core::navigator::Navigator;
use crate::core::registry::{Registration, Registry};
use crate::core::route::Route;

/// Animation length used by [`fixture`].
pub const ANIMATION_MS: u64 = 250;

/// Id every [`RecordingModule`] assigns on save.
pub const SAVED_ID: &str = "42";

/// Calls made on modules, in order, shared between modules of one fixture.
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    /// Returns and clears the log.
    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

/// Controls what a [`RecordingModule`] reports from `changed()`.
#[derive(Clone, Default)]
pub struct Probe {
    dirty: Rc<Cell<bool>>,
    failing: Rc<Cell<bool>>,
}

impl Probe {
    pub fn set_dirty(&self, dirty: bool) {
        self.dirty.set(dirty);
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }
}

/// Module that logs every call and draws a predictable line into its grid.
pub struct RecordingModule {
    name: String,
    grid: String,
    log: CallLog,
    probe: Probe,
}

impl RecordingModule {
    pub fn new(name: &str) -> (Self, Probe) {
        Self::with_log(name, CallLog::default())
    }

    pub fn with_log(name: &str, log: CallLog) -> (Self, Probe) {
        let probe = Probe::default();
        let module = Self {
            name: name.to_string(),
            grid: format!("{name}-grid"),
            log,
            probe: probe.clone(),
        };
        (module, probe)
    }
}

impl Module for RecordingModule {
    fn list(&mut self, out: &mut Outbox, query: &ListQuery) {
        self.log.push(format!(
            "{}.list({},{},{})",
            self.name, query.page, query.column, query.descending
        ));
        out.draw(&self.grid, format!("{} list", self.name));
    }

    fn filter(&mut self, out: &mut Outbox, text: &str, query: &ListQuery) {
        self.log.push(format!(
            "{}.filter({text},{},{},{})",
            self.name, query.page, query.column, query.descending
        ));
        out.draw(&self.grid, format!("{} matching {text}", self.name));
    }

    fn see(&mut self, out: &mut Outbox, id: &str) {
        self.log.push(format!("{}.see({id})", self.name));
        out.draw(&self.grid, format!("{} #{id}", self.name));
    }

    fn add(&mut self, out: &mut Outbox) {
        self.log.push(format!("{}.add()", self.name));
        out.draw(&self.grid, format!("{} new", self.name));
    }

    fn save(&mut self, out: &mut Outbox, ticket: SaveTicket) {
        self.log.push(format!("{}.save", self.name));
        out.saved(ticket, SAVED_ID);
    }

    fn refresh(&mut self, _out: &mut Outbox, child: &str, child_id: &str) {
        self.log.push(format!("{}.refresh({child},{child_id})", self.name));
    }

    fn changed(&self) -> Result<bool, ModuleError> {
        if self.probe.failing.get() {
            return Err(ModuleError::new(format!("{} form is gone", self.name)));
        }
        Ok(self.probe.dirty.get())
    }
}

/// A navigator over `orders`, `items` and `customers`:
///
/// ```text
/// orders    → items, customers
/// customers → orders
/// items     (leaf)
/// ```
pub struct Fixture {
    pub nav: Navigator<MemoryBrowser>,
    pub log: CallLog,
    probes: HashMap<String, Probe>,
}

pub fn fixture(url: &str) -> Fixture {
    let log = CallLog::default();
    let mut probes = HashMap::new();
    let mut registry = Registry::new();
    for (name, label, deps) in [
        ("orders", "Orders", vec!["items", "customers"]),
        ("items", "Items", vec![]),
        ("customers", "Customers", vec!["orders"]),
    ] {
        let (module, probe) = RecordingModule::with_log(name, log.clone());
        let registration = Registration::new(format!("{name}-grid"), module)
            .label(label)
            .depends_on(deps);
        registry.register(name, registration).unwrap();
        probes.insert(name.to_string(), probe);
    }

    let config = NavigatorConfig {
        active_class: Some("active".to_string()),
        search_input: Some("searchInput".to_string()),
        list_bar: Some("page {} of {}".to_string()),
        app_name: "Test".to_string(),
        notify_unload: true,
        animation_ms: ANIMATION_MS,
        ..NavigatorConfig::new(Route::new(["orders"]))
    };
    let nav = Navigator::new(MemoryBrowser::new(url), registry, config);
    Fixture { nav, log, probes }
}

impl Fixture {
    /// Ticks and advances the clock until no timer or popstate is left.
    pub fn settle(&mut self) {
        for _ in 0..32 {
            self.nav.tick().unwrap();
            if !self.nav.has_pending_work() && self.nav.browser().pending_popstates() == 0 {
                return;
            }
            self.nav.browser_mut().advance(ANIMATION_MS);
        }
        panic!("navigator did not settle");
    }

    pub fn browser_back(&mut self) {
        self.nav.browser_mut().back();
    }

    pub fn set_dirty(&self, module: &str, dirty: bool) {
        self.probes[module].set_dirty(dirty);
    }

    pub fn fail_changed(&self, module: &str) {
        self.probes[module].set_failing(true);
    }
}
