//! # Browser Seams
//!
//! The navigator talks to its window through three traits:
//!
//! - [`History`](crate::core::history::History): location and session history
//! - [`Document`]: title, the container grid, CSS classes, the search input
//! - [`Clock`]: milliseconds for debounce windows and animation deadlines
//!
//! [`MemoryBrowser`] implements all three in memory. The terminal host renders
//! it, and the tests drive it with a manual clock.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::time::Instant;

use log::debug;

use crate::core::history::{History, HistoryState};

/// DOM primitives the navigator needs.
pub trait Document {
    fn set_title(&mut self, title: &str);

    /// Clears the grid and creates one empty container per id, in order.
    fn rebuild_grid(&mut self, containers: &[String]);

    fn set_html(&mut self, container: &str, html: &str);

    fn set_visible(&mut self, container: &str, visible: bool);

    fn toggle_class(&mut self, element: &str, class: &str, on: bool);

    fn input_value(&self, input: &str) -> String;

    fn set_input_value(&mut self, input: &str, value: &str);

    fn scroll_to_top(&mut self);
}

pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Everything a navigator needs from its window.
pub trait Browser: History + Document + Clock {}

impl<T: History + Document + Clock> Browser for T {}

#[derive(Debug, Clone)]
struct Entry {
    state: Option<HistoryState>,
    url: String,
}

/// A view container in the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    pub id: String,
    pub html: String,
    pub visible: bool,
}

#[derive(Debug)]
enum TimeSource {
    Manual(u64),
    Wall(Instant),
}

/// In-memory window: history stack, container grid, classes, inputs, clock.
#[derive(Debug)]
pub struct MemoryBrowser {
    entries: Vec<Entry>,
    index: usize,
    popstates: VecDeque<HistoryState>,
    title: String,
    grid: Vec<Container>,
    classes: BTreeMap<String, BTreeSet<String>>,
    inputs: HashMap<String, String>,
    scrolls: usize,
    time: TimeSource,
}

impl MemoryBrowser {
    /// Browser opened at `url` with a manual clock starting at zero.
    pub fn new(url: &str) -> Self {
        Self {
            entries: vec![Entry {
                state: None,
                url: normalize(url),
            }],
            index: 0,
            popstates: VecDeque::new(),
            title: String::new(),
            grid: Vec::new(),
            classes: BTreeMap::new(),
            inputs: HashMap::new(),
            scrolls: 0,
            time: TimeSource::Manual(0),
        }
    }

    /// Browser opened at `url` whose clock follows wall time.
    pub fn realtime(url: &str) -> Self {
        Self {
            time: TimeSource::Wall(Instant::now()),
            ..Self::new(url)
        }
    }

    /// Moves a manual clock forward. Ignored on a wall clock.
    pub fn advance(&mut self, ms: u64) {
        if let TimeSource::Manual(now) = &mut self.time {
            *now += ms;
        }
    }

    pub fn back(&mut self) {
        self.go(-1);
    }

    pub fn forward(&mut self) {
        self.go(1);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current_state(&self) -> Option<&HistoryState> {
        self.entries[self.index].state.as_ref()
    }

    /// Urls of every entry, oldest first.
    pub fn urls(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.url.as_str()).collect()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn containers(&self) -> &[Container] {
        &self.grid
    }

    pub fn container(&self, id: &str) -> Option<&Container> {
        self.grid.iter().find(|c| c.id == id)
    }

    /// Ids of visible containers, in grid order.
    pub fn visible_containers(&self) -> Vec<&str> {
        self.grid
            .iter()
            .filter(|c| c.visible)
            .map(|c| c.id.as_str())
            .collect()
    }

    pub fn has_class(&self, element: &str, class: &str) -> bool {
        self.classes
            .get(element)
            .is_some_and(|set| set.contains(class))
    }

    pub fn scroll_count(&self) -> usize {
        self.scrolls
    }

    /// Number of back/forward events not yet delivered.
    pub fn pending_popstates(&self) -> usize {
        self.popstates.len()
    }
}

fn normalize(url: &str) -> String {
    if url.starts_with('/') {
        url.to_string()
    } else {
        format!("/{url}")
    }
}

impl History for MemoryBrowser {
    fn pathname(&self) -> String {
        self.entries[self.index].url.clone()
    }

    fn push_state(&mut self, state: HistoryState, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(Entry {
            state: Some(state),
            url: normalize(url),
        });
        self.index = self.entries.len() - 1;
    }

    fn replace_state(&mut self, state: HistoryState, url: &str) {
        self.entries[self.index] = Entry {
            state: Some(state),
            url: normalize(url),
        };
    }

    fn go(&mut self, delta: i64) {
        let target = self.index as i64 + delta;
        if delta == 0 || target < 0 || target >= self.entries.len() as i64 {
            debug!("browser: go({delta}) out of range, ignored");
            return;
        }
        self.index = target as usize;
        let state = self.entries[self.index].state.clone().unwrap_or_default();
        debug!("browser: go({delta}) → {}", self.entries[self.index].url);
        self.popstates.push_back(state);
    }

    fn take_popstate(&mut self) -> Option<HistoryState> {
        self.popstates.pop_front()
    }
}

impl Document for MemoryBrowser {
    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    fn rebuild_grid(&mut self, containers: &[String]) {
        self.grid = containers
            .iter()
            .map(|id| Container {
                id: id.clone(),
                html: String::new(),
                visible: true,
            })
            .collect();
    }

    fn set_html(&mut self, container: &str, html: &str) {
        match self.grid.iter_mut().find(|c| c.id == container) {
            Some(c) => c.html = html.to_string(),
            None => debug!("browser: draw into missing container '{container}'"),
        }
    }

    fn set_visible(&mut self, container: &str, visible: bool) {
        if let Some(c) = self.grid.iter_mut().find(|c| c.id == container) {
            c.visible = visible;
        }
    }

    fn toggle_class(&mut self, element: &str, class: &str, on: bool) {
        let set = self.classes.entry(element.to_string()).or_default();
        if on {
            set.insert(class.to_string());
        } else {
            set.remove(class);
        }
    }

    fn input_value(&self, input: &str) -> String {
        self.inputs.get(input).cloned().unwrap_or_default()
    }

    fn set_input_value(&mut self, input: &str, value: &str) {
        self.inputs.insert(input.to_string(), value.to_string());
    }

    fn scroll_to_top(&mut self) {
        self.scrolls += 1;
    }
}

impl Clock for MemoryBrowser {
    fn now_ms(&self) -> u64 {
        match &self.time {
            TimeSource::Manual(now) => *now,
            TimeSource::Wall(start) => start.elapsed().as_millis() as u64,
        }
    }
}
