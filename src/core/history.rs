//! # History Adapter
//!
//! Wraps the browser's push/replace API. Every entry written carries a
//! `HistoryState` with a monotonic `order` and the per-load session id, so a
//! later back/forward event can tell how many steps the user moved.
//!
//! ```text
//! replace_section  → order unchanged, entry rewritten in place
//! push_section     → order + 1, tokens appended to the current URL
//! set_section      → order + 1, tokens form an absolute URL
//! ```
//!
//! None of these fire a popstate. Callers schedule the visual update
//! themselves.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::route::Route;

/// State object attached to each history entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryState {
    pub order: i64,
    /// Identifies the page load that wrote the entry. Not compared anywhere
    /// in the navigator; carried for multi-tab detection by the host.
    pub session: String,
    pub title: String,
}

/// The browser history seam.
pub trait History {
    /// Current location pathname, e.g. `/orders/5`.
    fn pathname(&self) -> String;

    fn push_state(&mut self, state: HistoryState, url: &str);

    fn replace_state(&mut self, state: HistoryState, url: &str);

    /// Moves `delta` entries through history. A move queues a popstate.
    fn go(&mut self, delta: i64);

    /// Next queued back/forward event, if any.
    fn take_popstate(&mut self) -> Option<HistoryState>;
}

/// Builds a document title from a route.
pub type TitleFormatter = Box<dyn Fn(&Route) -> String>;

pub struct HistoryAdapter {
    order: i64,
    session: String,
    title: TitleFormatter,
}

impl HistoryAdapter {
    pub fn new(title: TitleFormatter) -> Self {
        Self {
            order: 0,
            session: uuid::Uuid::new_v4().to_string(),
            title,
        }
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    /// Adopts the order of an entry reached through back/forward.
    pub fn sync_order(&mut self, order: i64) {
        self.order = order;
    }

    pub fn session(&self) -> &str {
        &self.session
    }

    pub fn title_for(&self, route: &Route) -> String {
        (self.title)(route)
    }

    pub fn set_title_formatter(&mut self, title: TitleFormatter) {
        self.title = title;
    }

    /// Current location as a route.
    pub fn current_section<H: History + ?Sized>(&self, history: &H) -> Route {
        Route::parse(&history.pathname())
    }

    /// Rewrites the current entry to `route` without touching `order`.
    /// Returns the route now shown, which also becomes the title source.
    pub fn replace_section<H: History + ?Sized>(&self, history: &mut H, route: &Route) -> (Route, String) {
        let route = route.without_empty();
        let title = self.title_for(&route);
        let url = route.to_url();
        debug!("history: replace {} (order={})", url, self.order);
        history.replace_state(self.state(&title), &url);
        (route, title)
    }

    /// Appends `tail` to the current location as a new entry.
    pub fn push_section<H: History + ?Sized>(&mut self, history: &mut H, tail: &Route) -> (Route, String) {
        self.order += 1;
        let tail = tail.without_empty();
        let route = self.current_section(history).join(&tail);
        let title = self.title_for(&route);
        let url = route.to_url();
        debug!("history: push {} (order={})", url, self.order);
        history.push_state(self.state(&title), &url);
        (route, title)
    }

    /// Pushes `route` as an absolute location.
    pub fn set_section<H: History + ?Sized>(&mut self, history: &mut H, route: &Route) -> (Route, String) {
        self.order += 1;
        let route = route.without_empty();
        let title = self.title_for(&route);
        let url = route.to_url();
        debug!("history: set {} (order={})", url, self.order);
        history.push_state(self.state(&title), &url);
        (route, title)
    }

    fn state(&self, title: &str) -> HistoryState {
        HistoryState {
            order: self.order,
            session: self.session.clone(),
            title: title.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::browser::MemoryBrowser;

    fn adapter() -> HistoryAdapter {
        HistoryAdapter::new(Box::new(|route: &Route| format!("T{}", route)))
    }

    #[test]
    fn test_push_increments_order_and_appends() {
        let mut browser = MemoryBrowser::new("/orders");
        let mut history = adapter();
        let (route, title) = history.push_section(&mut browser, &Route::new(["5"]));
        assert_eq!(history.order(), 1);
        assert_eq!(route, Route::new(["orders", "5"]));
        assert_eq!(title, "T/orders/5");
        assert_eq!(browser.pathname(), "/orders/5");
        assert_eq!(browser.current_state().map(|s| s.order), Some(1));
    }

    #[test]
    fn test_replace_keeps_order() {
        let mut browser = MemoryBrowser::new("/orders/0");
        let mut history = adapter();
        history.set_section(&mut browser, &Route::new(["orders", "0"]));
        let before = history.order();
        history.replace_section(&mut browser, &Route::new(["orders", "42"]));
        assert_eq!(history.order(), before);
        assert_eq!(browser.pathname(), "/orders/42");
        assert_eq!(browser.len(), 2);
    }

    #[test]
    fn test_set_is_absolute() {
        let mut browser = MemoryBrowser::new("/orders/5");
        let mut history = adapter();
        let (route, _) = history.set_section(&mut browser, &Route::new(["customers"]));
        assert_eq!(route, Route::new(["customers"]));
        assert_eq!(browser.pathname(), "/customers");
        assert_eq!(history.order(), 1);
    }

    #[test]
    fn test_empty_tokens_are_stripped() {
        let mut browser = MemoryBrowser::new("/orders");
        let mut history = adapter();
        let (route, _) = history.push_section(&mut browser, &Route::new(["", "7"]));
        assert_eq!(route, Route::new(["orders", "7"]));
    }

    #[test]
    fn test_entries_carry_session() {
        let mut browser = MemoryBrowser::new("/");
        let mut history = adapter();
        history.replace_section(&mut browser, &Route::new(["orders"]));
        let state = browser.current_state().cloned().unwrap_or_default();
        assert_eq!(state.session, history.session());
        assert!(!state.session.is_empty());
    }
}
