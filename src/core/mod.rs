//! # Core Navigation Logic
//!
//! Keeps the URL, the browser history stack and the visible module views in
//! agreement. It knows nothing about any specific UI technology; the window
//! it drives is reached only through the [`browser`] traits.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • Route (URL tokens)   │
//!                    │  • Action (inputs)      │
//!                    │  • Notice (outputs)     │
//!                    │  • Navigator (machine)  │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┼───────────────────┐
//!            ▼                   ▼                   ▼
//!     ┌────────────┐      ┌────────────┐      ┌────────────┐
//!     │  Modules   │      │  Browser   │      │    TUI     │
//!     │ (list/see/ │      │ (history,  │      │  (renders  │
//!     │  save ...) │      │  grid, ms) │      │  notices)  │
//!     └────────────┘      └────────────┘      └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`route`]: `Route`, the tokenized pathname
//! - [`history`]: order-stamped push/replace over the browser history
//! - [`browser`]: the window seams and the in-memory `MemoryBrowser`
//! - [`module`]: the `Module` trait and its `Outbox`
//! - [`registry`]: module registrations and dependency closure
//! - [`navigator`]: the path-to-view state machine
//! - [`action`]: `Action` in, `Notice` out

pub mod action;
pub mod browser;
pub mod config;
pub mod error;
pub mod history;
pub mod list;
pub mod module;
pub mod navigator;
pub mod registry;
pub mod route;
pub mod schedule;
pub mod transition;

pub use action::{Action, Notice};
pub use error::NavError;
pub use navigator::Navigator;
pub use route::Route;
