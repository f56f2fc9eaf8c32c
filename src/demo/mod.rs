//! # Demo Application
//!
//! Three record tables wired as navigator modules:
//!
//! ```text
//! customers ──► orders ──► items
//!     ▲            │
//!     └────────────┘   (orders can open its customer)
//! ```
//!
//! Used by the terminal host and by the end-to-end tests of the navigator
//! against a real `Module` implementation.

pub mod records;
pub mod table;
pub mod workspace;

use crate::core::error::NavError;
use crate::core::registry::{Registration, Registry};
use crate::demo::records::RecordStore;
use crate::demo::table::{Backend, TableModule};
use crate::demo::workspace::Workspace;

pub struct Demo {
    pub registry: Registry,
    pub workspace: Workspace,
}

struct TableSpec {
    name: &'static str,
    label: &'static str,
    icon: &'static str,
    child: Option<&'static str>,
    dependencies: &'static [&'static str],
}

const TABLES: [TableSpec; 3] = [
    TableSpec {
        name: "customers",
        label: "Customers",
        icon: "☺",
        child: Some("orders"),
        dependencies: &["orders"],
    },
    TableSpec {
        name: "orders",
        label: "Orders",
        icon: "▤",
        child: Some("items"),
        dependencies: &["items", "customers"],
    },
    TableSpec {
        name: "items",
        label: "Items",
        icon: "•",
        child: None,
        dependencies: &[],
    },
];

/// Builds the registry over `store`.
pub fn build(store: RecordStore, backend: Backend) -> Result<Demo, NavError> {
    let workspace = Workspace::new(store);
    let mut registry = Registry::new();
    for table in &TABLES {
        let mut module = TableModule::new(table.name, table.label, workspace.clone(), backend.clone());
        if let Some(child) = table.child {
            module = module.with_child(child);
        }
        let registration = Registration::new(module.grid().to_string(), module)
            .label(table.label)
            .icon(table.icon)
            .depends_on(table.dependencies.iter().copied());
        registry.register(table.name, registration)?;
    }
    Ok(Demo {
        registry,
        workspace,
    })
}
