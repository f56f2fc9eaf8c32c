//! End-to-end navigation scenarios through the public API.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wayfinder::core::action::{Action, Notice};
use wayfinder::core::browser::MemoryBrowser;
use wayfinder::core::config::NavigatorConfig;
use wayfinder::core::history::History;
use wayfinder::core::module::{ListQuery, Module, ModuleError, Outbox, SaveTicket};
use wayfinder::core::navigator::Navigator;
use wayfinder::core::registry::{Registration, Registry};
use wayfinder::core::route::Route;

const ANIMATION_MS: u64 = 250;

type Log = Rc<RefCell<Vec<String>>>;

struct FakeTable {
    name: String,
    log: Log,
    dirty: Rc<Cell<bool>>,
}

impl FakeTable {
    fn grid(&self) -> String {
        format!("{}-grid", self.name)
    }

    fn record(&self, call: String) {
        self.log.borrow_mut().push(format!("{}.{call}", self.name));
    }
}

impl Module for FakeTable {
    fn list(&mut self, out: &mut Outbox, query: &ListQuery) {
        self.record(format!("list({},{},{})", query.page, query.column, query.descending));
        out.draw(self.grid(), format!("{} list", self.name));
    }

    fn filter(&mut self, out: &mut Outbox, text: &str, query: &ListQuery) {
        self.record(format!("filter({text},{},{},{})", query.page, query.column, query.descending));
        out.draw(self.grid(), format!("{} matching {text}", self.name));
    }

    fn see(&mut self, out: &mut Outbox, id: &str) {
        self.record(format!("see({id})"));
        out.draw(self.grid(), format!("{} #{id}", self.name));
    }

    fn add(&mut self, out: &mut Outbox) {
        self.record("add()".to_string());
        out.draw(self.grid(), format!("{} new", self.name));
    }

    fn save(&mut self, out: &mut Outbox, ticket: SaveTicket) {
        self.record("save".to_string());
        out.saved(ticket, "42");
    }

    fn refresh(&mut self, _out: &mut Outbox, child: &str, child_id: &str) {
        self.record(format!("refresh({child},{child_id})"));
    }

    fn changed(&self) -> Result<bool, ModuleError> {
        Ok(self.dirty.get())
    }
}

struct App {
    nav: Navigator<MemoryBrowser>,
    log: Log,
    orders_dirty: Rc<Cell<bool>>,
}

impl App {
    fn start(url: &str) -> Self {
        let log: Log = Rc::default();
        let orders_dirty = Rc::new(Cell::new(false));
        let table = |name: &str, dirty: Rc<Cell<bool>>| FakeTable {
            name: name.to_string(),
            log: log.clone(),
            dirty,
        };
        let registry = Registry::new()
            .with(
                "orders",
                Registration::new("orders-grid", table("orders", orders_dirty.clone()))
                    .label("Orders")
                    .depends_on(["items"]),
            )
            .and_then(|r| {
                r.with(
                    "items",
                    Registration::new("items-grid", table("items", Rc::default()))
                        .label("Items")
                        .depends_on(["orders"]),
                )
            })
            .expect("registry");
        let mut nav = Navigator::new(
            MemoryBrowser::new(url),
            registry,
            NavigatorConfig::new(Route::new(["orders"])),
        );
        nav.start().expect("start");
        Self {
            nav,
            log,
            orders_dirty,
        }
    }

    fn calls(&self) -> Vec<String> {
        self.log.borrow_mut().drain(..).collect()
    }

    /// Delivers popstates, lets the animation finish, runs what became due.
    fn settle(&mut self) {
        self.nav.tick().expect("tick");
        self.nav.browser_mut().advance(ANIMATION_MS);
        self.nav.tick().expect("tick");
    }

    fn visible(&self) -> Vec<String> {
        self.nav
            .browser()
            .visible_containers()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

#[test]
fn first_load_at_root_lists_default_module() {
    let mut app = App::start("/");
    assert_eq!(app.nav.browser().pathname(), "/orders");
    assert_eq!(app.nav.state(), &Route::new(["orders"]));
    assert_eq!(app.calls(), vec!["orders.list(1,id,true)"]);
    assert!(!app.nav.drain_notices().contains(&Notice::InvalidUrl));
}

#[test]
fn invalid_first_url_falls_back_to_default() {
    let mut app = App::start("/nowhere/3");
    assert_eq!(app.nav.browser().pathname(), "/orders");
    assert!(app.nav.drain_notices().contains(&Notice::InvalidUrl));
}

#[test]
fn back_to_list_resets_page_and_sort() {
    let mut app = App::start("/orders/5");
    assert_eq!(app.calls(), vec!["orders.see(5)"]);

    app.nav.dispatch(Action::Filter(Some("title".to_string()))).unwrap();
    app.nav.dispatch(Action::ListNext).unwrap();
    assert_eq!(app.nav.list().column, "title");
    app.calls();

    app.nav.browser_mut().back();
    app.settle();

    assert_eq!(app.nav.browser().pathname(), "/orders");
    assert_eq!(app.calls(), vec!["orders.list(1,id,true)"]);
    let list = app.nav.list();
    assert_eq!((list.page, list.column.as_str(), list.descending), (1, "id", true));
}

#[test]
fn saving_new_record_replaces_trailing_token() {
    let mut app = App::start("/orders/0");
    assert_eq!(app.calls(), vec!["orders.add()"]);
    let entries = app.nav.browser().len();
    let order = app.nav.order();

    app.nav.dispatch(Action::Save).unwrap();
    assert_eq!(app.nav.browser().pathname(), "/orders/42");
    assert_eq!(app.nav.browser().len(), entries);
    assert_eq!(app.nav.order(), order);
    assert_eq!(app.calls(), vec!["orders.save"]);

    app.nav.tick().unwrap();
    assert!(app.calls().is_empty());
    app.settle();
    assert_eq!(app.calls(), vec!["orders.see(42)"]);
}

#[test]
fn repeated_sort_column_flips_direction() {
    let mut app = App::start("/orders");
    app.calls();

    app.nav.dispatch(Action::Filter(Some("name".to_string()))).unwrap();
    assert_eq!(app.nav.list().page, 1);
    assert!(app.nav.list().descending);

    app.nav.dispatch(Action::Filter(Some("name".to_string()))).unwrap();
    assert_eq!(app.nav.list().page, 1);
    assert!(!app.nav.list().descending);

    assert_eq!(
        app.calls(),
        vec!["orders.list(1,name,true)", "orders.list(1,name,false)"]
    );
}

#[test]
fn order_counts_pushes_only() {
    let mut app = App::start("/orders");
    assert_eq!(app.nav.order(), 0);

    app.nav
        .dispatch(Action::Link(Route::new(["orders", "5", "items", "7"])))
        .unwrap();
    assert_eq!(app.nav.order(), 3);
    assert_eq!(
        app.nav.browser().urls(),
        vec!["/orders", "/orders", "/orders/5", "/orders/5/items/7"]
    );
}

#[test]
fn dirty_record_blocks_back_without_touching_view() {
    let mut app = App::start("/orders/5");
    app.settle();
    app.calls();
    app.nav.drain_notices();
    let visible = app.visible();

    app.orders_dirty.set(true);
    app.nav.browser_mut().back();
    app.nav.tick().unwrap();

    assert_eq!(app.nav.drain_notices(), vec![Notice::Unsaved]);
    assert!(app.nav.is_guard_pending());

    // The revert lands on the next tick
    app.settle();
    assert_eq!(app.nav.browser().pathname(), "/orders/5");
    assert_eq!(app.nav.state(), &Route::new(["orders", "5"]));
    assert!(app.calls().is_empty());
    assert_eq!(app.visible(), visible);
}

#[test]
fn zero_and_missing_id_both_add() {
    for id in [Some("0".to_string()), None] {
        let mut app = App::start("/orders");
        app.calls();
        app.nav
            .dispatch(Action::See {
                module: None,
                id,
                multiple: false,
            })
            .unwrap();
        app.settle();
        assert_eq!(app.nav.browser().pathname(), "/orders/0");
        assert_eq!(app.calls(), vec!["orders.add()"]);
    }
}

#[test]
fn submodule_cycle_resolves_once() {
    let app = App::start("/orders");
    assert_eq!(app.nav.submodules(), ["orders", "items"]);
    assert_eq!(app.nav.registry().resolve_submodules("items"), vec!["items", "orders"]);
}

#[test]
fn reconstruct_is_idempotent() {
    let mut app = App::start("/orders/5/items/7");
    app.settle();
    app.nav.reconstruct().unwrap();
    app.settle();
    let first = app.visible();
    app.nav.reconstruct().unwrap();
    app.settle();
    assert_eq!(app.visible(), first);
    assert_eq!(first, vec!["items-grid"]);
}
