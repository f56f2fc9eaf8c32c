//! # TUI Components
//!
//! All UI components for the terminal host.
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Receive everything they draw as struct fields, rebuilt each frame:
//! - `AddressBar`: URL and document title
//! - `Sidebar`: main modules with the active marker
//! - `GridView`: visible containers of the simulated document
//! - `StatusBar`: status message and key hints
//!
//! ### Stateful Components (Event-Driven)
//!
//! Live in `TuiState` and turn key events into their own events:
//! - `Dialog`: unsaved-changes confirmation
//! - `Prompt`: one-line text input
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── address_bar.rs
//! ├── sidebar.rs
//! ├── grid_view.rs
//! ├── status_bar.rs
//! ├── dialog.rs
//! └── prompt.rs
//! ```

pub mod address_bar;
pub mod dialog;
pub mod grid_view;
pub mod prompt;
pub mod sidebar;
pub mod status_bar;

pub use address_bar::AddressBar;
pub use dialog::{Dialog, DialogEvent, DialogKind};
pub use grid_view::{GridView, Pane};
pub use prompt::{Prompt, PromptEvent, PromptKind};
pub use sidebar::{Sidebar, SidebarEntry};
pub use status_bar::StatusBar;
