//! # Actions
//!
//! Everything that can happen to the navigator becomes an `Action`.
//! User presses the back button? That's `Action::PopState(state)`.
//! A module finished fetching? That's `Action::Draw(request)`.
//!
//! `Navigator::dispatch()` routes each action to the matching operation.
//! What the navigator wants the host to know comes back out as `Notice`s,
//! drained with `Navigator::drain_notices()`.
//!
//! ```text
//! Action → dispatch() → state change + browser calls → Vec<Notice>
//! ```

use crate::core::history::HistoryState;
use crate::core::module::{DrawRequest, SaveTicket};
use crate::core::route::Route;

#[derive(Debug)]
pub enum Action {
    /// Back/forward landed on an entry carrying `HistoryState`.
    PopState(HistoryState),
    /// Sidebar switch to another main module.
    Load(String),
    /// Open a record. `module: None` means the current main module;
    /// `id: None` means a new record.
    See {
        module: Option<String>,
        id: Option<String>,
        multiple: bool,
    },
    /// Jump to an absolute route, one history entry per step.
    Link(Route),
    Save,
    /// A module finished saving.
    Saved { ticket: SaveTicket, id: String },
    /// User chose to drop unsaved edits.
    Discard,
    Draw(DrawRequest),
    ListNext,
    ListPrevious,
    /// Re-query the list; `Some(column)` changes or flips the sort.
    Filter(Option<String>),
    /// Run whatever timers are due.
    Tick,
}

/// Callbacks for the host, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Start the dismiss animation.
    Dismiss,
    /// Start the welcome animation.
    Welcome,
    /// A container's HTML was replaced.
    Drawn,
    /// Navigation was blocked by unsaved edits; ask the user.
    Unsaved,
    /// The visible section changed.
    SectionChanged,
    /// The first-load URL was rejected and replaced by the default route.
    InvalidUrl,
    /// The page is about to unload.
    Unload,
    /// A module's list view is showing.
    Listed(String),
    /// A module is showing an existing record.
    Seen(String),
    /// A module is showing a new record.
    Adding(String),
}
