//! # List State
//!
//! Page, sort column and sort direction of the main module's list view.
//! Reset whenever a list view is entered again; the navigator re-queries the
//! module after every change.

use crate::core::module::ListQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    pub page: u32,
    pub column: String,
    pub descending: bool,
    default_column: String,
}

impl ListState {
    pub fn new(default_column: impl Into<String>) -> Self {
        let default_column = default_column.into();
        Self {
            page: 1,
            column: default_column.clone(),
            descending: true,
            default_column,
        }
    }

    pub fn reset(&mut self) {
        self.page = 1;
        self.column = self.default_column.clone();
        self.descending = true;
    }

    pub fn next(&mut self) {
        self.page += 1;
    }

    /// Previous page, never below 1.
    pub fn previous(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    /// Reselecting the current column flips the direction; a new column
    /// starts descending. Always back to page 1.
    pub fn sort_by(&mut self, column: Option<&str>) {
        if let Some(column) = column {
            if column == self.column {
                self.descending = !self.descending;
            } else {
                self.column = column.to_string();
                self.descending = true;
            }
        }
        self.page = 1;
    }

    pub fn query(&self) -> ListQuery {
        ListQuery {
            page: self.page,
            column: self.column.clone(),
            descending: self.descending,
        }
    }
}

/// Fills `{}` placeholders in `template` with the current page, then the
/// total. Extra placeholders become empty.
pub fn render_list_bar(template: &str, page: u32, total: u32) -> String {
    let mut args = [page.to_string(), total.to_string()].into_iter();
    let mut pieces = template.split("{}");
    let mut out = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        out.push_str(&args.next().unwrap_or_default());
        out.push_str(piece);
    }
    out
}
