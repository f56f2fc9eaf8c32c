//! # Deferred Work
//!
//! Two timers drive the animated redraw:
//!
//! - [`Deferred`]: one slot for the view update that follows a dismiss
//!   animation. Scheduling while a task is pending replaces it, so at most
//!   one redraw is ever waiting.
//! - [`DrawQueue`]: module draws that arrived before the animation ended.
//!   Every one of them must land, in arrival order.

use log::debug;

use crate::core::module::DrawRequest;

#[derive(Debug)]
struct Scheduled<T> {
    due: u64,
    task: T,
}

#[derive(Debug)]
pub struct Deferred<T> {
    slot: Option<Scheduled<T>>,
}

impl<T: std::fmt::Debug> Deferred<T> {
    pub fn new() -> Self {
        Self { slot: None }
    }

    /// Puts `task` in the slot, due at `due` ms. Last write wins.
    pub fn schedule(&mut self, due: u64, task: T) {
        if let Some(previous) = self.slot.take() {
            debug!("schedule: replacing pending {:?}", previous.task);
        }
        self.slot = Some(Scheduled { due, task });
    }

    /// Takes the task if it is due at `now`.
    pub fn take_due(&mut self, now: u64) -> Option<T> {
        if self.slot.as_ref().is_some_and(|s| s.due <= now) {
            return self.slot.take().map(|s| s.task);
        }
        None
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }

    pub fn due(&self) -> Option<u64> {
        self.slot.as_ref().map(|s| s.due)
    }
}

impl<T: std::fmt::Debug> Default for Deferred<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default)]
pub struct DrawQueue {
    pending: Vec<Scheduled<DrawRequest>>,
}

impl DrawQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, due: u64, request: DrawRequest) {
        self.pending.push(Scheduled { due, task: request });
    }

    /// Removes and returns every draw due at `now`, in arrival order.
    pub fn take_due(&mut self, now: u64) -> Vec<DrawRequest> {
        let (due, waiting): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = waiting;
        due.into_iter().map(|s| s.task).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest deadline among the queued draws.
    pub fn next_due(&self) -> Option<u64> {
        self.pending.iter().map(|s| s.due).min()
    }
}
