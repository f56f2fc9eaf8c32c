//! # Workspace
//!
//! State the demo modules share with the terminal host: the record store,
//! the draft each module has open, and the rows each view last drew (so a
//! digit key can open "row 3").

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::demo::records::{Draft, RecordStore};

/// Records a view links to, in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowLinks {
    /// Module the ids belong to.
    pub module: String,
    pub ids: Vec<u64>,
    pub total_pages: u32,
}

#[derive(Debug, Default)]
struct Editor {
    draft: Draft,
    stored: Draft,
}

#[derive(Clone, Debug)]
pub struct Workspace {
    store: Arc<Mutex<RecordStore>>,
    editors: Arc<Mutex<BTreeMap<String, Editor>>>,
    rows: Arc<Mutex<BTreeMap<String, RowLinks>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Workspace {
    pub fn new(store: RecordStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            editors: Arc::default(),
            rows: Arc::default(),
        }
    }

    pub fn store(&self) -> MutexGuard<'_, RecordStore> {
        lock(&self.store)
    }

    /// Starts editing `draft` in `module`. Not dirty until edited.
    pub fn open_draft(&self, module: &str, draft: Draft) {
        lock(&self.editors).insert(
            module.to_string(),
            Editor {
                stored: draft.clone(),
                draft,
            },
        );
    }

    pub fn close_draft(&self, module: &str) {
        lock(&self.editors).remove(module);
    }

    pub fn draft(&self, module: &str) -> Option<Draft> {
        lock(&self.editors).get(module).map(|e| e.draft.clone())
    }

    /// Changes the open draft's fields. Returns false with no draft open.
    pub fn edit(&self, module: &str, title: Option<&str>, notes: Option<&str>) -> bool {
        let mut editors = lock(&self.editors);
        let Some(editor) = editors.get_mut(module) else {
            return false;
        };
        if let Some(title) = title {
            editor.draft.title = title.to_string();
        }
        if let Some(notes) = notes {
            editor.draft.notes = notes.to_string();
        }
        true
    }

    pub fn is_dirty(&self, module: &str) -> bool {
        lock(&self.editors)
            .get(module)
            .is_some_and(|e| e.draft != e.stored)
    }

    /// The open draft was stored as `id`.
    pub fn mark_saved(&self, module: &str, id: u64) {
        if let Some(editor) = lock(&self.editors).get_mut(module) {
            editor.draft.id = id;
            editor.stored = editor.draft.clone();
        }
    }

    pub fn set_rows(&self, module: &str, links: RowLinks) {
        lock(&self.rows).insert(module.to_string(), links);
    }

    pub fn rows(&self, module: &str) -> Option<RowLinks> {
        lock(&self.rows).get(module).cloned()
    }
}
