//! # Navigator
//!
//! The path-to-view state machine. Owns the current route, the unsaved-edit
//! guard, list state and the animated redraw timers.
//!
//! ```text
//! Navigator
//! ├── browser: B                     // history + document + clock
//! ├── registry: Registry             // module name → registration
//! ├── history: HistoryAdapter        // order counter, session id, titles
//! ├── state: Route                   // route currently displayed
//! ├── unsaved / force / discard_steps  // guard flow
//! ├── list: ListState                // page, sort column, direction
//! ├── last_save / last_see           // debounce marks
//! ├── animation_start                // last dismiss animation
//! ├── pending: Deferred<Task>        // single-slot view update
//! ├── draws: DrawQueue               // module draws waiting on animation
//! └── notices: Vec<Notice>           // callbacks for the host
//! ```
//!
//! ## Guard flow
//!
//! ```text
//! back/forward ──► edits pending? ──no──► dismiss, update view after animation
//!                       │
//!                      yes
//!                       ▼
//!     go(steps) reverts history, Notice::Unsaved, unsaved = true
//!                       │
//!     reverted popstate arrives → accepted silently, unsaved = false
//!                       │
//!     discard() → force = true, go(-steps) → original move replays, unguarded
//! ```

use std::collections::BTreeMap;

use log::{debug, info, warn};

use crate::core::action::{Action, Notice};
use crate::core::browser::{Browser, Document};
use crate::core::config::NavigatorConfig;
use crate::core::error::NavError;
use crate::core::history::{HistoryAdapter, HistoryState, TitleFormatter};
use crate::core::list::{ListState, render_list_bar};
use crate::core::module::{DrawHook, DrawRequest, Module, Outbox, SaveTicket};
use crate::core::registry::Registry;
use crate::core::route::{NEW_RECORD, Route, is_new_record};
use crate::core::schedule::{Deferred, DrawQueue};
use crate::core::transition::Transition;

/// Repeated `save()` calls inside this window are dropped.
pub const SAVE_DEBOUNCE_MS: u64 = 1000;
/// Repeated `see()` calls inside this window are dropped.
pub const SEE_DEBOUNCE_MS: u64 = 500;

/// View update waiting for the dismiss animation.
#[derive(Debug)]
enum Task {
    Navigate(Transition),
    Reconstruct,
    Open { module: String, id: String },
    ShowSaved { id: String },
}

/// The main module and every module reachable from it.
#[derive(Debug, Clone)]
struct ActiveModule {
    name: String,
    submodules: Vec<String>,
}

pub struct Navigator<B: Browser> {
    browser: B,
    registry: Registry,
    config: NavigatorConfig,
    history: HistoryAdapter,
    state: Route,
    unsaved: bool,
    force: bool,
    discard_steps: i64,
    list: ListState,
    last_save: Option<u64>,
    last_see: Option<u64>,
    animation_start: u64,
    animation_callback: Option<DrawHook>,
    main: Option<ActiveModule>,
    pending: Deferred<Task>,
    draws: DrawQueue,
    notices: Vec<Notice>,
}

impl<B: Browser> Navigator<B> {
    pub fn new(browser: B, registry: Registry, config: NavigatorConfig) -> Self {
        let title = default_title(&config.app_name, &registry);
        let animation_start = browser.now_ms();
        Self {
            browser,
            history: HistoryAdapter::new(title),
            state: config.default_route.clone(),
            unsaved: false,
            force: false,
            discard_steps: 0,
            list: ListState::new(config.default_column.clone()),
            last_save: None,
            last_see: None,
            animation_start,
            animation_callback: None,
            main: None,
            pending: Deferred::new(),
            draws: DrawQueue::new(),
            notices: Vec::new(),
            registry,
            config,
        }
    }

    /// Replaces the document title builder.
    pub fn with_title(mut self, title: impl Fn(&Route) -> String + 'static) -> Self {
        self.history.set_title_formatter(Box::new(title));
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn browser_mut(&mut self) -> &mut B {
        &mut self.browser
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    /// Route currently displayed.
    pub fn state(&self) -> &Route {
        &self.state
    }

    pub fn order(&self) -> i64 {
        self.history.order()
    }

    pub fn session(&self) -> &str {
        self.history.session()
    }

    pub fn list(&self) -> &ListState {
        &self.list
    }

    pub fn main_module(&self) -> Option<&str> {
        self.main.as_ref().map(|m| m.name.as_str())
    }

    /// Modules with a container in the grid, main module first.
    pub fn submodules(&self) -> &[String] {
        self.main.as_ref().map(|m| m.submodules.as_slice()).unwrap_or(&[])
    }

    /// True between a guarded abort and the popstate that reverts it.
    pub fn is_guard_pending(&self) -> bool {
        self.unsaved
    }

    /// True while a view update or a draw is waiting on a timer.
    pub fn has_pending_work(&self) -> bool {
        self.pending.is_pending() || !self.draws.is_empty()
    }

    /// Earliest timer deadline, for hosts that sleep between ticks.
    pub fn next_deadline(&self) -> Option<u64> {
        match (self.pending.due(), self.draws.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Location as the browser currently shows it.
    pub fn current_section(&self) -> Route {
        self.history.current_section(&self.browser)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    pub fn dispatch(&mut self, action: Action) -> Result<(), NavError> {
        match action {
            Action::PopState(state) => {
                self.on_browser_navigate(&state);
                Ok(())
            }
            Action::Load(module) => self.load(&module),
            Action::See {
                module,
                id,
                multiple,
            } => self.see(module.as_deref(), id.as_deref(), multiple),
            Action::Link(route) => self.link(&route),
            Action::Save => self.save(),
            Action::Saved { ticket, id } => self.finish_save(ticket, &id),
            Action::Discard => {
                self.discard();
                Ok(())
            }
            Action::Draw(request) => {
                self.draw(request);
                Ok(())
            }
            Action::ListNext => self.list_next(),
            Action::ListPrevious => self.list_previous(),
            Action::Filter(column) => self.filter(column.as_deref()),
            Action::Tick => self.tick(),
        }
    }

    /// Delivers queued back/forward events, then runs the view update and
    /// the draws whose deadline has passed.
    pub fn tick(&mut self) -> Result<(), NavError> {
        // Events raised while handling these (guard reverts) wait for the
        // next tick, as they would in a browser.
        let events: Vec<HistoryState> = std::iter::from_fn(|| self.browser.take_popstate()).collect();
        for state in &events {
            self.on_browser_navigate(state);
        }
        let now = self.browser.now_ms();
        let result = match self.pending.take_due(now) {
            Some(task) => self.run_task(task),
            None => Ok(()),
        };
        // Due draws land even when the view update failed.
        for request in self.draws.take_due(now) {
            self.apply_draw(request);
        }
        result
    }

    // ------------------------------------------------------------------
    // Back / forward
    // ------------------------------------------------------------------

    /// Handles a popstate for the entry carrying `event`.
    pub fn on_browser_navigate(&mut self, event: &HistoryState) {
        let old = self.state.clone();
        let now = self.current_section();

        if self.unsaved {
            debug!("popstate: guard revert landed on {now}");
            self.unsaved = false;
            self.state = now;
            self.history.sync_order(event.order);
            self.browser.set_title(&event.title);
            self.force = false;
            return;
        }

        let steps = self.history.order() - event.order;
        let transition = Transition::classify(&old, &now);
        debug!(
            "popstate: {old} → {now} ({}, steps={steps}, force={})",
            transition.name(),
            self.force
        );

        let blocked = !self.force
            && match &transition {
                Transition::MainModuleChanged { .. } => self.changed(),
                Transition::SteppedBack { discarded, .. } => {
                    discarded.iter().any(|m| self.module_changed(m))
                }
                Transition::SameLevelReload | Transition::SteppedForward { .. } => false,
            };
        if blocked {
            info!("popstate: unsaved edits block {old} → {now}, reverting {steps} step(s)");
            self.guard(steps);
            return;
        }

        self.begin_dismiss();
        self.defer(Task::Navigate(transition));

        self.state = now;
        self.history.sync_order(event.order);
        self.browser.set_title(&event.title);
        self.force = false;
        self.discard_steps = 0;
    }

    fn guard(&mut self, steps: i64) {
        self.notices.push(Notice::Unsaved);
        self.browser.go(steps);
        self.discard_steps = steps;
        self.unsaved = true;
    }

    fn apply(&mut self, transition: Transition) -> Result<(), NavError> {
        match transition {
            Transition::MainModuleChanged { from, to } => {
                self.move_marker(&from, &to);
                self.reconstruct()
            }
            Transition::SameLevelReload => self.reconstruct(),
            Transition::SteppedBack { to, .. } => match to.len() {
                1 => {
                    let root = root_of(&to)?;
                    self.list.reset();
                    self.resync_list(&root)?;
                    self.show(&root)?;
                    self.notices.push(Notice::Listed(root));
                    Ok(())
                }
                _ => {
                    let (module, id) = leaf_of(&to)?;
                    self.show(&module)?;
                    self.notify_record(&module, &id);
                    self.notices.push(Notice::Welcome);
                    Ok(())
                }
            },
            Transition::SteppedForward { to } => match to.len() {
                1 => {
                    let root = root_of(&to)?;
                    self.resync_list(&root)?;
                    self.notices.push(Notice::Listed(root));
                    Ok(())
                }
                2 => {
                    let (module, id) = leaf_of(&to)?;
                    self.open_record(&module, &id)?;
                    self.notify_record(&module, &id);
                    Ok(())
                }
                _ => {
                    let (module, id) = leaf_of(&to)?;
                    self.show(&module)?;
                    self.open_record(&module, &id)?;
                    self.notify_record(&module, &id);
                    self.notices.push(Notice::Welcome);
                    Ok(())
                }
            },
        }
    }

    // ------------------------------------------------------------------
    // Programmatic navigation
    // ------------------------------------------------------------------

    /// Draws everything for the current location. On first load the URL is
    /// validated and replayed into history one step at a time.
    pub fn reconstruct(&mut self) -> Result<(), NavError> {
        self.list.reset();

        let mut section = self.current_section();
        if self.history.order() == 0 {
            if section.is_empty() {
                section = self.config.default_route.clone();
            }
            if !self.is_valid_route(&section) {
                warn!("reconstruct: invalid url {section}, using {}", self.config.default_route);
                section = self.config.default_route.clone();
                self.notices.push(Notice::InvalidUrl);
            }
            self.write_route(&section, false);
            let default_root = self
                .config
                .default_route
                .root()
                .unwrap_or_default()
                .to_string();
            let root = section.root().unwrap_or_default().to_string();
            self.move_marker(&default_root, &root);
            self.notices.push(Notice::SectionChanged);
        }

        let root = root_of(&section)?;
        if !self.registry.contains(&root) {
            return Err(NavError::UnknownModule(root));
        }
        let submodules = self.registry.resolve_submodules(&root);
        let grids = submodules
            .iter()
            .map(|name| self.registry.get(name).map(|r| r.grid.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        info!("reconstruct: {section} with {} container(s)", grids.len());
        self.main = Some(ActiveModule {
            name: root.clone(),
            submodules,
        });

        if let Some(input) = &self.config.search_input {
            self.browser.set_input_value(input, "");
        }
        self.browser.rebuild_grid(&grids);

        if section.len() > 1 {
            for (module, id) in section.pairs() {
                self.open_record(module, id)?;
            }
            let (module, id) = leaf_of(&section)?;
            self.show(&module)?;
            self.notify_record(&module, &id);
        } else {
            self.resync_list(&root)?;
            self.show(&root)?;
            self.notices.push(Notice::Listed(root));
        }
        Ok(())
    }

    /// First draw after construction.
    pub fn start(&mut self) -> Result<(), NavError> {
        self.reconstruct()
    }

    /// Sidebar switch to another main module.
    pub fn load(&mut self, module: &str) -> Result<(), NavError> {
        if !self.registry.contains(module) {
            return Err(NavError::UnknownModule(module.to_string()));
        }
        let target = Route::new([module]);

        if self.changed() {
            info!("load: unsaved edits block switch to '{module}'");
            self.set_section(&target);
            self.notices.push(Notice::Unsaved);
            self.browser.go(-1);
            self.discard_steps = -1;
            self.unsaved = true;
            return Ok(());
        }

        let from = self.state.root().unwrap_or_default().to_string();
        self.move_marker(&from, module);
        self.set_section(&target);
        self.begin_dismiss();
        self.defer(Task::Reconstruct);
        Ok(())
    }

    /// Jump to `route`, pushing one entry per step so back unwinds it.
    pub fn link(&mut self, route: &Route) -> Result<(), NavError> {
        let route = route.without_empty();
        let root = root_of(&route)?;
        let from = self.state.root().unwrap_or_default().to_string();
        self.move_marker(&from, &root);
        self.write_route(&route, true);
        self.begin_dismiss();
        self.defer(Task::Reconstruct);
        Ok(())
    }

    /// Open a record. `module: None` targets the main module; `id: None` is
    /// a new record. Calls inside `SEE_DEBOUNCE_MS` of the last one are
    /// dropped unless `multiple` is set.
    pub fn see(&mut self, module: Option<&str>, id: Option<&str>, multiple: bool) -> Result<(), NavError> {
        let now = self.browser.now_ms();
        if !multiple {
            if let Some(last) = self.last_see
                && now.saturating_sub(last) < SEE_DEBOUNCE_MS
            {
                debug!("see: dropped, {}ms since last", now - last);
                return Ok(());
            }
            self.last_see = Some(now);
        }
        let id = id.unwrap_or(NEW_RECORD).to_string();
        let section = self.current_section();

        let module = match module {
            None => {
                let root = root_of(&section)?;
                if section.is_bare() {
                    self.push_section(&Route::new([id.as_str()]));
                }
                root
            }
            Some(module) => {
                let main = self.main.as_ref().ok_or(NavError::NoActiveModule)?;
                if !main.submodules.iter().any(|m| m == module) {
                    return Err(NavError::SubmoduleNotLoaded {
                        module: module.to_string(),
                        root: main.name.clone(),
                    });
                }
                if section.len() > 1 {
                    self.push_section(&Route::new([module, id.as_str()]));
                } else {
                    self.push_section(&Route::new([id.as_str()]));
                }
                module.to_string()
            }
        };

        self.begin_dismiss();
        self.defer(Task::Open { module, id });
        Ok(())
    }

    /// Persist the record on display through its module.
    pub fn save(&mut self) -> Result<(), NavError> {
        let now = self.browser.now_ms();
        if let Some(last) = self.last_save
            && now.saturating_sub(last) < SAVE_DEBOUNCE_MS
        {
            debug!("save: dropped, {}ms since last", now - last);
            return Ok(());
        }
        self.last_save = Some(now);

        let route = self.current_section();
        let Some(leaf) = route.leaf_module().map(str::to_string) else {
            warn!("save: nothing to save at {route}");
            return Ok(());
        };
        info!("save: {leaf} at {route}");
        let ticket = SaveTicket { route };
        self.call(&leaf, |module, out| module.save(out, ticket))
    }

    /// Continuation of `save()`: the record behind `ticket` now has `id`.
    pub fn finish_save(&mut self, ticket: SaveTicket, id: &str) -> Result<(), NavError> {
        let mut route = ticket.route;
        let len = route.len();
        let Some((leaf, last)) = route
            .leaf_module()
            .zip(route.last())
            .map(|(l, t)| (l.to_string(), t.to_string()))
        else {
            warn!("save: completed for {route} which has no record");
            return Ok(());
        };
        debug!("save: {leaf} stored as {id}");

        if len > 2 {
            let ancestors: Vec<String> = if is_new_record(&last) {
                route.get(len.saturating_sub(4)).map(str::to_string).into_iter().collect()
            } else {
                (0..=len.saturating_sub(4))
                    .rev()
                    .step_by(2)
                    .filter_map(|i| route.get(i).map(str::to_string))
                    .collect()
            };
            for ancestor in ancestors {
                self.call(&ancestor, |module, out| module.refresh(out, &leaf, id))?;
            }
            self.force = true;
            self.browser.go(-1);
        } else {
            if is_new_record(&last) {
                route.set_last(id);
                self.replace_section(&route);
            }
            self.begin_dismiss();
            self.defer(Task::ShowSaved { id: id.to_string() });
        }
        Ok(())
    }

    /// The user chose to drop unsaved edits: replay the blocked move.
    pub fn discard(&mut self) {
        if self.discard_steps == 0 {
            debug!("discard: no blocked move to replay");
            return;
        }
        info!("discard: replaying {} step(s)", -self.discard_steps);
        self.force = true;
        self.state = self.current_section();
        self.browser.go(-self.discard_steps);
    }

    /// Hide every container of the main module except `module`'s.
    pub fn show(&mut self, module: &str) -> Result<(), NavError> {
        let main = self.main.as_ref().ok_or(NavError::NoActiveModule)?;
        for name in &main.submodules {
            let grid = &self.registry.get(name)?.grid;
            self.browser.set_visible(grid, false);
        }
        let grid = &self.registry.get(module)?.grid;
        self.browser.set_visible(grid, true);
        Ok(())
    }

    /// True if any module on display has unsaved edits. List mode never does.
    pub fn changed(&self) -> bool {
        if self.state.len() <= 1 {
            return false;
        }
        self.state.modules().any(|m| self.module_changed(m))
    }

    /// Host is unloading the page. Returns true if the user should confirm.
    pub fn before_unload(&mut self) -> bool {
        if self.config.notify_unload {
            self.notices.push(Notice::Unload);
        }
        self.changed()
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    /// Replace a container's HTML once the current dismiss animation is over.
    pub fn draw(&mut self, request: DrawRequest) {
        let now = self.browser.now_ms();
        let elapsed = now.saturating_sub(self.animation_start);
        if elapsed < self.config.animation_ms {
            let due = self.animation_start + self.config.animation_ms;
            debug!("draw: '{}' deferred to {due}ms", request.container);
            self.draws.push(due, request);
        } else {
            self.apply_draw(request);
        }
    }

    /// One-shot hook run after the next draw lands.
    pub fn on_next_draw(&mut self, hook: impl FnOnce(&mut dyn Document) + Send + 'static) {
        self.animation_callback = Some(Box::new(hook));
    }

    fn apply_draw(&mut self, request: DrawRequest) {
        self.browser.set_html(&request.container, &request.html);
        if let Some(after) = request.after {
            after(&mut self.browser);
        }
        if let Some(callback) = self.animation_callback.take() {
            callback(&mut self.browser);
        }
        self.notices.push(Notice::Drawn);
        self.notices.push(Notice::Welcome);
    }

    // ------------------------------------------------------------------
    // List
    // ------------------------------------------------------------------

    pub fn list_next(&mut self) -> Result<(), NavError> {
        self.browser.scroll_to_top();
        self.list.next();
        self.requery()
    }

    pub fn list_previous(&mut self) -> Result<(), NavError> {
        self.browser.scroll_to_top();
        self.list.previous();
        self.requery()
    }

    /// Re-run the list query. `Some(column)` sorts by it, flipping the
    /// direction if it is already the sort column.
    pub fn filter(&mut self, column: Option<&str>) -> Result<(), NavError> {
        self.browser.scroll_to_top();
        self.list.sort_by(column);
        self.requery()
    }

    /// Pagination bar for `total` pages, if a template is configured.
    pub fn list_bar(&self, total: u32) -> Option<String> {
        self.config
            .list_bar
            .as_deref()
            .map(|template| render_list_bar(template, self.list.page, total))
    }

    fn requery(&mut self) -> Result<(), NavError> {
        let main = self
            .main
            .as_ref()
            .map(|m| m.name.clone())
            .ok_or(NavError::NoActiveModule)?;
        self.resync_list(&main)
    }

    /// `filter` when the search box holds text, `list` otherwise.
    fn resync_list(&mut self, module: &str) -> Result<(), NavError> {
        let text = self.search_text();
        let query = self.list.query();
        if text.is_empty() {
            self.call(module, |m, out| m.list(out, &query))
        } else {
            self.call(module, |m, out| m.filter(out, &text, &query))
        }
    }

    fn search_text(&self) -> String {
        self.config
            .search_input
            .as_deref()
            .map(|input| self.browser.input_value(input))
            .unwrap_or_default()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn run_task(&mut self, task: Task) -> Result<(), NavError> {
        debug!("task: running {task:?}");
        self.notices.push(Notice::SectionChanged);
        match task {
            Task::Navigate(transition) => self.apply(transition),
            Task::Reconstruct => self.reconstruct(),
            Task::Open { module, id } => {
                self.open_record(&module, &id)?;
                self.notify_record(&module, &id);
                self.show(&module)
            }
            Task::ShowSaved { id } => {
                let main = self
                    .main
                    .as_ref()
                    .map(|m| m.name.clone())
                    .ok_or(NavError::NoActiveModule)?;
                self.call(&main, |m, out| m.see(out, &id))
            }
        }
    }

    /// Runs one module operation and processes what it queued.
    fn call(&mut self, name: &str, op: impl FnOnce(&mut dyn Module, &mut Outbox)) -> Result<(), NavError> {
        let mut out = Outbox::new();
        op(self.registry.get_mut(name)?.module_mut(), &mut out);
        for action in out.into_actions() {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn open_record(&mut self, module: &str, id: &str) -> Result<(), NavError> {
        if is_new_record(id) {
            self.call(module, |m, out| m.add(out))
        } else {
            self.call(module, |m, out| m.see(out, id))
        }
    }

    fn notify_record(&mut self, module: &str, id: &str) {
        let notice = if is_new_record(id) {
            Notice::Adding(module.to_string())
        } else {
            Notice::Seen(module.to_string())
        };
        self.notices.push(notice);
    }

    fn module_changed(&self, name: &str) -> bool {
        let Ok(registration) = self.registry.get(name) else {
            debug!("changed: '{name}' not registered");
            return false;
        };
        match registration.module().changed() {
            Ok(changed) => changed,
            Err(e) => {
                warn!("changed: '{name}' failed, treating as saved: {e}");
                false
            }
        }
    }

    fn is_valid_route(&self, route: &Route) -> bool {
        if route.is_empty() || (route.len() > 1 && route.len() % 2 != 0) {
            return false;
        }
        route.modules().all(|m| self.registry.contains(m))
    }

    fn move_marker(&mut self, from: &str, to: &str) {
        if let Some(class) = &self.config.active_class {
            self.browser.toggle_class(from, class, false);
            self.browser.toggle_class(to, class, true);
        }
    }

    fn begin_dismiss(&mut self) {
        self.animation_start = self.browser.now_ms();
        self.notices.push(Notice::Dismiss);
    }

    fn defer(&mut self, task: Task) {
        let due = self.browser.now_ms() + self.config.animation_ms;
        self.pending.schedule(due, task);
    }

    /// Writes `route` into history step by step: the root (pushed when
    /// `push_root`, replaced otherwise), the first record id, then each
    /// module/record pair.
    fn write_route(&mut self, route: &Route, push_root: bool) {
        let Some(root) = route.root() else {
            return;
        };
        let root = Route::new([root]);
        if push_root {
            self.set_section(&root);
        } else {
            self.replace_section(&root);
        }
        let tokens = route.tokens();
        if tokens.len() > 1 {
            self.push_section(&Route::new([tokens[1].as_str()]));
            for pair in tokens[2..].chunks(2) {
                self.push_section(&Route::new(pair.iter().map(String::as_str)));
            }
        }
    }

    fn replace_section(&mut self, route: &Route) {
        let (route, title) = self.history.replace_section(&mut self.browser, route);
        self.browser.set_title(&title);
        self.state = route;
    }

    fn push_section(&mut self, tail: &Route) {
        let (route, title) = self.history.push_section(&mut self.browser, tail);
        self.browser.set_title(&title);
        self.state = route;
    }

    fn set_section(&mut self, route: &Route) {
        let (route, title) = self.history.set_section(&mut self.browser, route);
        self.browser.set_title(&title);
        self.state = route;
    }
}

fn root_of(route: &Route) -> Result<String, NavError> {
    route
        .root()
        .map(str::to_string)
        .ok_or(NavError::EmptyRoute)
}

fn leaf_of(route: &Route) -> Result<(String, String), NavError> {
    route
        .leaf_module()
        .zip(route.last())
        .map(|(m, id)| (m.to_string(), id.to_string()))
        .ok_or(NavError::EmptyRoute)
}

/// `"<app> | Orders #5 / Items (new)"`, from registry labels.
fn default_title(app_name: &str, registry: &Registry) -> TitleFormatter {
    let app = app_name.to_string();
    let labels: BTreeMap<String, String> = registry
        .iter()
        .map(|(name, r)| (name.to_string(), r.label.clone()))
        .collect();
    Box::new(move |route: &Route| {
        let parts: Vec<String> = route
            .tokens()
            .chunks(2)
            .map(|chunk| {
                let label = labels.get(&chunk[0]).unwrap_or(&chunk[0]);
                match chunk.get(1) {
                    Some(id) if is_new_record(id) => format!("{label} (new)"),
                    Some(id) => format!("{label} #{id}"),
                    None => label.clone(),
                }
            })
            .collect();
        if parts.is_empty() {
            app.clone()
        } else {
            format!("{app} | {}", parts.join(" / "))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::browser::MemoryBrowser;
    use crate::core::history::History;
    use crate::test_support::{ANIMATION_MS, Fixture, fixture};

    fn started(url: &str) -> Fixture {
        let mut fx = fixture(url);
        fx.nav.start().unwrap();
        fx.settle();
        fx
    }

    #[test]
    fn test_first_load_at_root_uses_default() {
        let mut fx = fixture("/");
        fx.nav.start().unwrap();
        assert_eq!(fx.nav.state(), &Route::new(["orders"]));
        assert_eq!(fx.nav.browser().pathname(), "/orders");
        assert_eq!(fx.log.take(), vec!["orders.list(1,id,true)"]);
        let notices = fx.nav.drain_notices();
        assert!(!notices.contains(&Notice::InvalidUrl));
        assert!(notices.contains(&Notice::Listed("orders".into())));
    }

    #[test]
    fn test_first_load_invalid_url_falls_back() {
        let mut fx = fixture("/nope/3");
        fx.nav.start().unwrap();
        assert_eq!(fx.nav.state(), &Route::new(["orders"]));
        assert!(fx.nav.drain_notices().contains(&Notice::InvalidUrl));
    }

    #[test]
    fn test_first_load_rejects_unregistered_nested_module() {
        let mut fx = fixture("/orders/5/ghost/1");
        fx.nav.start().unwrap();
        assert_eq!(fx.nav.state(), &Route::new(["orders"]));
    }

    #[test]
    fn test_first_load_replays_history_step_by_step() {
        let mut fx = fixture("/orders/5/items/0");
        fx.nav.start().unwrap();
        assert_eq!(
            fx.nav.browser().urls(),
            vec!["/orders", "/orders/5", "/orders/5/items/0"]
        );
        assert_eq!(fx.nav.order(), 2);
        assert_eq!(fx.log.take(), vec!["orders.see(5)", "items.add()"]);
        assert_eq!(fx.nav.browser().visible_containers(), vec!["items-grid"]);
        let notices = fx.nav.drain_notices();
        assert!(notices.contains(&Notice::Adding("items".into())));
    }

    #[test]
    fn test_first_load_sets_marker() {
        let fx = started("/customers");
        assert!(fx.nav.browser().has_class("customers", "active"));
        assert!(!fx.nav.browser().has_class("orders", "active"));
    }

    #[test]
    fn test_reconstruct_is_idempotent() {
        let mut fx = started("/orders/5/items/3");
        let first = fx.nav.browser().containers().to_vec();
        fx.nav.reconstruct().unwrap();
        fx.settle();
        assert_eq!(fx.nav.browser().containers(), first.as_slice());
    }

    #[test]
    fn test_submodules_resolved_from_root() {
        let fx = started("/orders");
        assert_eq!(fx.nav.submodules(), &["orders", "items", "customers"]);
        let ids: Vec<_> = fx.nav.browser().containers().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["orders-grid", "items-grid", "customers-grid"]);
    }

    #[test]
    fn test_draw_waits_for_animation() {
        let mut fx = started("/orders");
        fx.nav.drain_notices();
        fx.nav.see(None, Some("5"), false).unwrap();
        fx.nav.draw(DrawRequest::new("customers-grid", "early"));
        assert_eq!(fx.nav.browser().container("customers-grid").unwrap().html, "");
        fx.settle();
        assert_eq!(fx.nav.browser().container("customers-grid").unwrap().html, "early");
        assert_eq!(fx.nav.browser().container("orders-grid").unwrap().html, "orders #5");
        let notices = fx.nav.drain_notices();
        assert_eq!(notices[0], Notice::Dismiss);
        assert!(notices.ends_with(&[Notice::Drawn, Notice::Welcome]));
    }

    #[test]
    fn test_see_pushes_and_opens_after_delay() {
        let mut fx = started("/orders");
        fx.log.take();
        fx.nav.see(None, Some("5"), false).unwrap();
        assert_eq!(fx.nav.browser().pathname(), "/orders/5");
        assert!(fx.log.take().is_empty());
        fx.settle();
        assert_eq!(fx.log.take(), vec!["orders.see(5)"]);
    }

    #[test]
    fn test_see_null_and_zero_both_add() {
        let mut fx = started("/orders");
        fx.log.take();
        fx.nav.see(None, None, true).unwrap();
        fx.settle();
        fx.browser_back();
        fx.settle();
        fx.log.take();
        fx.nav.see(None, Some("0"), true).unwrap();
        fx.settle();
        assert_eq!(fx.log.take(), vec!["orders.add()"]);
        assert_eq!(fx.nav.browser().pathname(), "/orders/0");
    }

    #[test]
    fn test_see_debounce() {
        let mut fx = started("/orders");
        fx.nav.see(None, Some("5"), false).unwrap();
        fx.nav.browser_mut().advance(100);
        fx.nav.see(Some("items"), Some("3"), false).unwrap();
        assert_eq!(fx.nav.browser().pathname(), "/orders/5");
    }

    #[test]
    fn test_see_multiple_bypasses_debounce() {
        let mut fx = started("/orders");
        fx.nav.see(None, Some("5"), false).unwrap();
        fx.nav.see(Some("items"), Some("3"), true).unwrap();
        assert_eq!(fx.nav.browser().pathname(), "/orders/5/items/3");
    }

    #[test]
    fn test_see_unloaded_submodule_is_fatal() {
        let mut fx = started("/items");
        let err = fx.nav.see(Some("orders"), Some("1"), true).unwrap_err();
        assert_eq!(
            err,
            NavError::SubmoduleNotLoaded {
                module: "orders".into(),
                root: "items".into()
            }
        );
    }

    #[test]
    fn test_nested_see_shows_only_target() {
        let mut fx = started("/orders/5");
        fx.nav.see(Some("items"), None, true).unwrap();
        fx.settle();
        assert_eq!(fx.nav.browser().pathname(), "/orders/5/items/0");
        assert_eq!(fx.nav.browser().visible_containers(), vec!["items-grid"]);
    }

    #[test]
    fn test_order_counts_pushes_not_replaces() {
        let mut fx = started("/orders");
        assert_eq!(fx.nav.order(), 0);
        fx.nav.see(None, Some("0"), true).unwrap();
        assert_eq!(fx.nav.order(), 1);
        fx.nav.see(Some("items"), Some("2"), true).unwrap();
        assert_eq!(fx.nav.order(), 2);
    }

    #[test]
    fn test_back_to_list_resets_list_state() {
        let mut fx = started("/orders");
        fx.nav.list_next().unwrap();
        fx.nav.filter(Some("name")).unwrap();
        fx.nav.see(None, Some("5"), false).unwrap();
        fx.settle();
        fx.log.take();
        fx.browser_back();
        fx.settle();
        assert_eq!(fx.nav.state(), &Route::new(["orders"]));
        assert_eq!(fx.log.take(), vec!["orders.list(1,id,true)"]);
        assert_eq!(fx.nav.browser().visible_containers(), vec!["orders-grid"]);
    }

    #[test]
    fn test_back_to_list_honors_search_text() {
        let mut fx = started("/orders");
        fx.nav.see(None, Some("5"), false).unwrap();
        fx.settle();
        fx.nav.browser_mut().set_input_value("searchInput", "acme");
        fx.log.take();
        fx.browser_back();
        fx.settle();
        assert_eq!(fx.log.take(), vec!["orders.filter(acme,1,id,true)"]);
    }

    #[test]
    fn test_back_within_nested_shows_parent_without_reloading() {
        let mut fx = started("/orders/5/items/3");
        fx.log.take();
        fx.browser_back();
        fx.settle();
        assert_eq!(fx.nav.state(), &Route::new(["orders", "5"]));
        assert!(fx.log.take().is_empty());
        assert_eq!(fx.nav.browser().visible_containers(), vec!["orders-grid"]);
    }

    #[test]
    fn test_forward_reopens_record() {
        let mut fx = started("/orders/5/items/3");
        fx.browser_back();
        fx.settle();
        fx.log.take();
        fx.nav.browser_mut().forward();
        fx.settle();
        assert_eq!(fx.log.take(), vec!["items.see(3)"]);
        assert_eq!(fx.nav.browser().visible_containers(), vec!["items-grid"]);
    }

    #[test]
    fn test_back_guarded_by_unsaved_nested_module() {
        let mut fx = started("/orders/5/items/3");
        fx.set_dirty("items", true);
        fx.nav.drain_notices();
        fx.log.take();
        fx.browser_back();
        fx.nav.tick().unwrap();
        assert_eq!(fx.nav.drain_notices(), vec![Notice::Unsaved]);
        assert!(fx.nav.is_guard_pending());
        // The revert lands on the original entry and is accepted silently.
        fx.nav.tick().unwrap();
        assert!(!fx.nav.is_guard_pending());
        assert_eq!(fx.nav.browser().pathname(), "/orders/5/items/3");
        assert_eq!(fx.nav.state(), &Route::new(["orders", "5", "items", "3"]));
        fx.settle();
        assert!(fx.log.take().is_empty());
        assert!(fx.nav.drain_notices().is_empty());
    }

    #[test]
    fn test_only_discarded_modules_are_checked() {
        let mut fx = started("/orders/5/items/3");
        fx.set_dirty("orders", true);
        fx.browser_back();
        fx.settle();
        assert_eq!(fx.nav.state(), &Route::new(["orders", "5"]));
    }

    #[test]
    fn test_discard_replays_blocked_move() {
        let mut fx = started("/orders/5/items/3");
        fx.set_dirty("items", true);
        fx.browser_back();
        fx.settle();
        fx.nav.discard();
        fx.settle();
        assert_eq!(fx.nav.state(), &Route::new(["orders", "5"]));
        assert_eq!(fx.nav.browser().pathname(), "/orders/5");
    }

    #[test]
    fn test_changed_errors_are_treated_as_clean() {
        let mut fx = started("/orders/5");
        fx.fail_changed("orders");
        assert!(!fx.nav.changed());
        fx.browser_back();
        fx.settle();
        assert_eq!(fx.nav.state(), &Route::new(["orders"]));
    }

    #[test]
    fn test_changed_is_false_in_list_mode() {
        let mut fx = started("/orders");
        fx.set_dirty("orders", true);
        assert!(!fx.nav.changed());
    }

    #[test]
    fn test_load_switches_main_module() {
        let mut fx = started("/orders/5");
        fx.log.take();
        fx.nav.load("customers").unwrap();
        assert_eq!(fx.nav.browser().pathname(), "/customers");
        assert!(fx.nav.browser().has_class("customers", "active"));
        assert!(!fx.nav.browser().has_class("orders", "active"));
        fx.settle();
        assert_eq!(fx.log.take(), vec!["customers.list(1,id,true)"]);
        assert_eq!(fx.nav.main_module(), Some("customers"));
    }

    #[test]
    fn test_load_guarded_then_discarded() {
        let mut fx = started("/orders/5");
        fx.set_dirty("orders", true);
        fx.nav.drain_notices();
        fx.nav.load("customers").unwrap();
        assert_eq!(fx.nav.drain_notices(), vec![Notice::Unsaved]);
        fx.settle();
        assert_eq!(fx.nav.browser().pathname(), "/orders/5");
        assert_eq!(fx.nav.main_module(), Some("orders"));

        fx.log.take();
        fx.nav.discard();
        fx.settle();
        assert_eq!(fx.nav.browser().pathname(), "/customers");
        assert_eq!(fx.nav.main_module(), Some("customers"));
        assert_eq!(fx.log.take(), vec!["customers.list(1,id,true)"]);
    }

    #[test]
    fn test_back_across_main_modules_guarded_then_discarded() {
        let mut fx = started("/orders");
        fx.nav.load("customers").unwrap();
        fx.settle();
        fx.nav.see(None, Some("1"), false).unwrap();
        fx.settle();
        assert_eq!(fx.nav.browser().pathname(), "/customers/1");

        fx.set_dirty("customers", true);
        fx.log.take();
        fx.nav.drain_notices();
        fx.nav.browser_mut().go(-2);
        fx.settle();
        // Both steps are reverted without touching any module.
        assert_eq!(fx.nav.drain_notices(), vec![Notice::Unsaved]);
        assert_eq!(fx.nav.browser().pathname(), "/customers/1");
        assert_eq!(fx.nav.main_module(), Some("customers"));
        assert!(fx.log.take().is_empty());

        fx.nav.discard();
        fx.settle();
        assert_eq!(fx.nav.browser().pathname(), "/orders");
        assert_eq!(fx.nav.main_module(), Some("orders"));
        assert_eq!(fx.log.take(), vec!["orders.list(1,id,true)"]);
    }

    #[test]
    fn test_discard_without_blocked_move_keeps_guard() {
        let mut fx = started("/orders/5");
        fx.nav.discard();
        fx.settle();
        assert_eq!(fx.nav.browser().pathname(), "/orders/5");

        fx.set_dirty("orders", true);
        fx.nav.drain_notices();
        fx.browser_back();
        fx.settle();
        assert!(fx.nav.drain_notices().contains(&Notice::Unsaved));
        assert_eq!(fx.nav.browser().pathname(), "/orders/5");
    }

    #[test]
    fn test_due_draws_land_when_view_update_fails() {
        let mut fx = started("/orders");
        fx.nav.link(&Route::new(["ghost"])).unwrap();
        fx.nav.draw(DrawRequest::new("orders-grid", "late"));
        fx.nav.browser_mut().advance(ANIMATION_MS);
        assert_eq!(fx.nav.tick(), Err(NavError::UnknownModule("ghost".into())));
        assert_eq!(
            fx.nav.browser().container("orders-grid").map(|c| c.html.as_str()),
            Some("late")
        );
    }

    #[test]
    fn test_load_unknown_module_errors() {
        let mut fx = started("/orders");
        assert_eq!(
            fx.nav.load("ghost"),
            Err(NavError::UnknownModule("ghost".into()))
        );
    }

    #[test]
    fn test_browser_back_across_main_modules_reconstructs() {
        let mut fx = started("/orders");
        fx.nav.load("customers").unwrap();
        fx.settle();
        fx.log.take();
        fx.browser_back();
        fx.settle();
        assert_eq!(fx.nav.main_module(), Some("orders"));
        assert!(fx.nav.browser().has_class("orders", "active"));
        assert_eq!(fx.log.take(), vec!["orders.list(1,id,true)"]);
    }

    #[test]
    fn test_link_pushes_each_step() {
        let mut fx = started("/customers");
        fx.log.take();
        fx.nav
            .link(&Route::new(["orders", "5", "items", "3"]))
            .unwrap();
        assert_eq!(
            fx.nav.browser().urls(),
            vec!["/customers", "/orders", "/orders/5", "/orders/5/items/3"]
        );
        fx.settle();
        assert_eq!(fx.log.take(), vec!["orders.see(5)", "items.see(3)"]);
        fx.browser_back();
        fx.settle();
        assert_eq!(fx.nav.state(), &Route::new(["orders", "5"]));
    }

    #[test]
    fn test_save_new_root_record_replaces_entry() {
        let mut fx = started("/orders");
        fx.nav.see(None, None, false).unwrap();
        fx.settle();
        let entries = fx.nav.browser().len();
        fx.log.take();
        fx.nav.save().unwrap();
        assert_eq!(fx.nav.browser().pathname(), "/orders/42");
        assert_eq!(fx.nav.browser().len(), entries);
        assert_eq!(fx.log.take(), vec!["orders.save"]);
        fx.settle();
        assert_eq!(fx.log.take(), vec!["orders.see(42)"]);
    }

    #[test]
    fn test_save_is_debounced() {
        let mut fx = started("/orders/5");
        fx.nav.save().unwrap();
        fx.nav.browser_mut().advance(999);
        fx.log.take();
        fx.nav.save().unwrap();
        assert!(fx.log.take().is_empty());
        fx.nav.browser_mut().advance(1);
        fx.nav.save().unwrap();
        assert_eq!(fx.log.take(), vec!["orders.save"]);
    }

    #[test]
    fn test_save_nested_existing_refreshes_every_ancestor() {
        let mut fx = started("/customers/1/orders/5/items/3");
        fx.log.take();
        fx.nav.save().unwrap();
        assert_eq!(
            fx.log.take(),
            vec!["items.save", "orders.refresh(items,42)", "customers.refresh(items,42)"]
        );
        fx.settle();
        assert_eq!(fx.nav.state(), &Route::new(["customers", "1", "orders", "5"]));
        assert_eq!(fx.nav.browser().visible_containers(), vec!["orders-grid"]);
    }

    #[test]
    fn test_save_nested_new_refreshes_parent_only() {
        let mut fx = started("/customers/1/orders/5/items/0");
        fx.set_dirty("items", true);
        fx.log.take();
        fx.nav.save().unwrap();
        assert_eq!(fx.log.take(), vec!["items.save", "orders.refresh(items,42)"]);
        fx.settle();
        // Forced step back skips the guard even though items still reports edits.
        assert_eq!(fx.nav.state(), &Route::new(["customers", "1", "orders", "5"]));
    }

    #[test]
    fn test_list_paging_and_sorting() {
        let mut fx = started("/orders");
        fx.log.take();
        fx.nav.list_previous().unwrap();
        fx.nav.list_next().unwrap();
        fx.nav.filter(Some("name")).unwrap();
        fx.nav.filter(Some("name")).unwrap();
        assert_eq!(
            fx.log.take(),
            vec![
                "orders.list(1,id,true)",
                "orders.list(2,id,true)",
                "orders.list(1,name,true)",
                "orders.list(1,name,false)",
            ]
        );
        assert_eq!(fx.nav.browser().scroll_count(), 4);
    }

    #[test]
    fn test_list_bar() {
        let mut fx = started("/orders");
        fx.nav.list_next().unwrap();
        assert_eq!(fx.nav.list_bar(7).as_deref(), Some("page 2 of 7"));
    }

    #[test]
    fn test_list_bar_disabled_without_template() {
        let browser = MemoryBrowser::new("/");
        let nav = Navigator::new(browser, Registry::new(), NavigatorConfig::new(Route::new(["a"])));
        assert_eq!(nav.list_bar(3), None);
    }

    #[test]
    fn test_before_unload_reports_edits() {
        let mut fx = started("/orders/5");
        assert!(!fx.nav.before_unload());
        fx.set_dirty("orders", true);
        assert!(fx.nav.before_unload());
        assert!(fx.nav.drain_notices().contains(&Notice::Unload));
    }

    #[test]
    fn test_on_next_draw_runs_once() {
        let mut fx = started("/orders");
        fx.nav.on_next_draw(|doc| doc.set_title("hooked"));
        fx.nav.draw(DrawRequest::new("orders-grid", "a"));
        assert_eq!(fx.nav.browser().title(), "hooked");
        fx.nav.browser_mut().set_title("plain");
        fx.nav.draw(DrawRequest::new("orders-grid", "b"));
        assert_eq!(fx.nav.browser().title(), "plain");
    }

    #[test]
    fn test_default_title_uses_labels() {
        let fx = started("/orders/5/items/0");
        assert_eq!(fx.nav.browser().title(), "Test | Orders #5 / Items (new)");
    }
}
