//! # Record Store
//!
//! Tables of records for the demo modules, persisted as one JSON file.
//!
//! Writes use atomic rename (write `.tmp`, then `rename()`) for crash safety.
//! A store opened on a missing file starts from the seed data.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::module::ListQuery;

/// Rows per list page.
pub const PAGE_SIZE: usize = 8;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Record {
    pub id: u64,
    pub title: String,
    pub notes: String,
    /// Id of the owning record in the parent table.
    pub parent: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a record. `id == 0` is a record not stored yet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub id: u64,
    pub title: String,
    pub notes: String,
}

impl From<&Record> for Draft {
    fn from(record: &Record) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            notes: record.notes.clone(),
        }
    }
}

/// One page of a list query.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub rows: Vec<Record>,
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Serialize, Deserialize, Default, Debug)]
struct StoreData {
    tables: BTreeMap<String, Vec<Record>>,
}

#[derive(Debug)]
pub struct RecordStore {
    path: Option<PathBuf>,
    data: StoreData,
}

impl RecordStore {
    /// Seeded store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            data: seed(),
        }
    }

    /// Opens `path`, seeding and writing it when missing.
    pub fn open(path: &Path) -> io::Result<Self> {
        if !path.exists() {
            info!("No record file at {}, seeding", path.display());
            let store = Self {
                path: Some(path.to_path_buf()),
                data: seed(),
            };
            store.persist()?;
            return Ok(store);
        }
        let json = fs::read_to_string(path)?;
        let data: StoreData =
            serde_json::from_str(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        debug!("Loaded {} table(s) from {}", data.tables.len(), path.display());
        Ok(Self {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    pub fn get(&self, table: &str, id: u64) -> Option<&Record> {
        self.data.tables.get(table)?.iter().find(|r| r.id == id)
    }

    /// Records of `table` owned by `parent`, by id.
    pub fn children(&self, table: &str, parent: u64) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self
            .data
            .tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| r.parent == Some(parent)).collect())
            .unwrap_or_default();
        rows.sort_by_key(|r| r.id);
        rows
    }

    /// Sorted, optionally filtered page of `table`. Text matches title or
    /// notes, case-insensitively.
    pub fn query(&self, table: &str, text: Option<&str>, query: &ListQuery) -> Page {
        let needle = text.map(str::to_lowercase).filter(|t| !t.is_empty());
        let mut rows: Vec<&Record> = self
            .data
            .tables
            .get(table)
            .map(|rows| rows.iter().collect())
            .unwrap_or_default();
        if let Some(needle) = &needle {
            rows.retain(|r| {
                r.title.to_lowercase().contains(needle) || r.notes.to_lowercase().contains(needle)
            });
        }
        match query.column.as_str() {
            "title" => rows.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id))),
            "updated" => rows.sort_by_key(|r| (r.updated_at, r.id)),
            _ => rows.sort_by_key(|r| r.id),
        }
        if query.descending {
            rows.reverse();
        }

        let total_pages = rows.len().div_ceil(PAGE_SIZE).max(1) as u32;
        let page = query.page.clamp(1, total_pages);
        let rows = rows
            .into_iter()
            .skip((page as usize - 1) * PAGE_SIZE)
            .take(PAGE_SIZE)
            .cloned()
            .collect();
        Page {
            rows,
            page,
            total_pages,
        }
    }

    /// Inserts a new record (`draft.id == 0`) or updates an existing one,
    /// then persists. Returns the stored id.
    pub fn upsert(&mut self, table: &str, draft: &Draft, parent: Option<u64>) -> io::Result<u64> {
        let now = Utc::now();
        let rows = self.data.tables.entry(table.to_string()).or_default();
        let existing = rows.iter().position(|r| draft.id != 0 && r.id == draft.id);
        let id = match existing {
            Some(index) => {
                let record = &mut rows[index];
                record.title = draft.title.clone();
                record.notes = draft.notes.clone();
                record.updated_at = now;
                record.id
            }
            None => {
                let id = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
                rows.push(Record {
                    id,
                    title: draft.title.clone(),
                    notes: draft.notes.clone(),
                    parent,
                    created_at: now,
                    updated_at: now,
                });
                id
            }
        };
        debug!("Stored {table} #{id}");
        self.persist()?;
        Ok(id)
    }

    fn persist(&self) -> io::Result<()> {
        match &self.path {
            Some(path) => atomic_write_json(path, &self.data),
            None => Ok(()),
        }
    }
}

/// Atomically write `data` as JSON to `path` (via `.tmp` + rename).
fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("tmp");
    let json = serde_json::to_string_pretty(data)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn seed() -> StoreData {
    let now = Utc::now();
    let record = |id: u64, title: &str, notes: &str, parent: Option<u64>| Record {
        id,
        title: title.to_string(),
        notes: notes.to_string(),
        parent,
        created_at: now,
        updated_at: now,
    };
    let mut tables = BTreeMap::new();
    tables.insert(
        "customers".to_string(),
        vec![
            record(1, "Acme Corporation", "Pays on time", None),
            record(2, "Globex", "Prefers email", None),
            record(3, "Initech", "", None),
        ],
    );
    tables.insert(
        "orders".to_string(),
        vec![
            record(1, "Anvils, bulk", "Ship by rail", Some(1)),
            record(2, "Rocket skates", "", Some(1)),
            record(3, "Hammocks", "Gift wrap", Some(2)),
            record(4, "Staplers", "Red only", Some(3)),
            record(5, "TPS cover sheets", "", Some(3)),
        ],
    );
    tables.insert(
        "items".to_string(),
        vec![
            record(1, "Anvil 50kg", "", Some(1)),
            record(2, "Anvil 100kg", "", Some(1)),
            record(3, "Skates, pair", "Size 11", Some(2)),
            record(4, "Hammock, striped", "", Some(3)),
            record(5, "Swingline stapler", "", Some(4)),
        ],
    );
    StoreData { tables }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: u32, column: &str, descending: bool) -> ListQuery {
        ListQuery {
            page,
            column: column.to_string(),
            descending,
        }
    }

    #[test]
    fn test_query_sorts_descending_by_id() {
        let store = RecordStore::in_memory();
        let page = store.query("orders", None, &query(1, "id", true));
        let ids: Vec<u64> = page.rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![5, 4, 3, 2, 1]);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_query_filters_title_and_notes() {
        let store = RecordStore::in_memory();
        let page = store.query("orders", Some("RAIL"), &query(1, "id", false));
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].title, "Anvils, bulk");
    }

    #[test]
    fn test_query_sorts_by_title() {
        let store = RecordStore::in_memory();
        let page = store.query("customers", None, &query(1, "title", false));
        let titles: Vec<&str> = page.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Acme Corporation", "Globex", "Initech"]);
    }

    #[test]
    fn test_query_clamps_page() {
        let store = RecordStore::in_memory();
        let page = store.query("orders", None, &query(9, "id", true));
        assert_eq!(page.page, 1);
        assert_eq!(page.rows.len(), 5);
    }

    #[test]
    fn test_upsert_inserts_then_updates() {
        let mut store = RecordStore::in_memory();
        let draft = Draft {
            id: 0,
            title: "Paper clips".into(),
            notes: String::new(),
        };
        let id = store.upsert("items", &draft, Some(5)).unwrap();
        assert_eq!(id, 6);
        assert_eq!(store.children("items", 5).len(), 1);

        let edited = Draft {
            id,
            title: "Paper clips, large".into(),
            notes: "boxed".into(),
        };
        assert_eq!(store.upsert("items", &edited, None).unwrap(), id);
        let record = store.get("items", id).unwrap();
        assert_eq!(record.title, "Paper clips, large");
        assert_eq!(record.parent, Some(5));
    }

    #[test]
    fn test_open_seeds_and_persists() {
        let dir = std::env::temp_dir().join(format!("wayfinder-{}", uuid::Uuid::new_v4()));
        let path = dir.join("records.json");

        let mut store = RecordStore::open(&path).unwrap();
        assert!(path.exists());
        let draft = Draft {
            id: 0,
            title: "Umbrella".into(),
            notes: String::new(),
        };
        let id = store.upsert("customers", &draft, None).unwrap();

        let reopened = RecordStore::open(&path).unwrap();
        assert_eq!(reopened.get("customers", id).map(|r| r.title.as_str()), Some("Umbrella"));
        assert!(!path.with_extension("tmp").exists());
        let _ = fs::remove_dir_all(dir);
    }
}
