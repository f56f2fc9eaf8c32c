//! # Transitions
//!
//! Each back/forward event is classified once, by comparing the route being
//! left with the route being entered:
//!
//! ```text
//! old.root != new.root          → MainModuleChanged   (rebuild everything)
//! old.len  >  new.len           → SteppedBack         (discard trailing pairs)
//! old is bare (list mode)       → SameLevelReload     (rebuild everything)
//! otherwise                     → SteppedForward      (open the new record)
//! ```
//!
//! The variant carries what its deferred view update needs, so the update
//! never re-reads navigator state.

use crate::core::route::Route;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    MainModuleChanged { from: String, to: String },
    /// `discarded` lists the modules whose pairs were dropped, deepest first.
    SteppedBack { to: Route, discarded: Vec<String> },
    SameLevelReload,
    SteppedForward { to: Route },
}

impl Transition {
    pub fn classify(old: &Route, new: &Route) -> Self {
        let from = old.root().unwrap_or_default();
        let to = new.root().unwrap_or_default();
        if from != to {
            return Transition::MainModuleChanged {
                from: from.to_string(),
                to: to.to_string(),
            };
        }
        if old.len() > new.len() {
            return Transition::SteppedBack {
                to: new.clone(),
                discarded: discarded_modules(old, new),
            };
        }
        if old.is_bare() {
            return Transition::SameLevelReload;
        }
        Transition::SteppedForward { to: new.clone() }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Transition::MainModuleChanged { .. } => "main-module-changed",
            Transition::SteppedBack { .. } => "stepped-back",
            Transition::SameLevelReload => "same-level-reload",
            Transition::SteppedForward { .. } => "stepped-forward",
        }
    }
}

/// Modules at even indices of `old` that `new` no longer reaches, deepest
/// first. When `old` holds a single pair the main module itself is the one
/// being left.
fn discarded_modules(old: &Route, new: &Route) -> Vec<String> {
    if old.len() <= 2 {
        return old.root().map(str::to_string).into_iter().collect();
    }
    let mut discarded = Vec::new();
    let mut i = old.len() - 2;
    while i >= new.len() {
        if let Some(module) = old.get(i) {
            discarded.push(module.to_string());
        }
        if i < 2 {
            break;
        }
        i -= 2;
    }
    discarded
}
