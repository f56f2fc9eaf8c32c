//! # Routes
//!
//! A `Route` is the parsed form of the URL path. Tokens alternate between
//! module names and record ids:
//!
//! ```text
//! /orders                      → ["orders"]                       (list mode)
//! /orders/5                    → ["orders", "5"]                  (record mode)
//! /orders/5/items/0            → ["orders", "5", "items", "0"]    (nested, new item)
//! ```
//!
//! Module names sit at even indices, record ids at odd ones. A record id of
//! `0` is the "create new" sentinel, never a real record.

use std::fmt;

/// Record id token meaning "create a new record".
pub const NEW_RECORD: &str = "0";

/// Returns true if `token` is the "new record" sentinel.
///
/// Any spelling that reads as numeric zero counts (`"0"`, `"00"`, `"0.0"`),
/// as does an empty token.
pub fn is_new_record(token: &str) -> bool {
    let token = token.trim();
    if token.is_empty() {
        return true;
    }
    token.parse::<f64>().map(|v| v == 0.0).unwrap_or(false)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Route {
    tokens: Vec<String>,
}

impl Route {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a location pathname (`/orders/5/`) into a route.
    ///
    /// The leading character is dropped and the remainder split on `/`. A
    /// single trailing empty token (from a trailing slash) is removed; inner
    /// empty tokens are kept so callers can see the URL as typed.
    pub fn parse(pathname: &str) -> Self {
        let rest = pathname.get(1..).unwrap_or("");
        let mut tokens: Vec<String> = rest.split('/').map(str::to_string).collect();
        if tokens.last().is_some_and(|t| t.is_empty()) {
            tokens.pop();
        }
        Self { tokens }
    }

    /// Same route with every empty token removed.
    pub fn without_empty(&self) -> Self {
        Self {
            tokens: self
                .tokens
                .iter()
                .filter(|t| !t.is_empty())
                .cloned()
                .collect(),
        }
    }

    /// The main module (first token), if any.
    pub fn root(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// Module owning the trailing record (`tokens[len - 2]`).
    pub fn leaf_module(&self) -> Option<&str> {
        self.len()
            .checked_sub(2)
            .and_then(|i| self.tokens.get(i))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// True when only the main module is present (list mode).
    pub fn is_bare(&self) -> bool {
        self.tokens.len() == 1
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Module names at even indices, root first.
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().step_by(2).map(String::as_str)
    }

    /// `(module, record)` pairs from root to leaf. A trailing lone module is skipped.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tokens
            .chunks_exact(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Returns a new route with `tail` appended.
    pub fn join(&self, tail: &Route) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.extend(tail.tokens.iter().cloned());
        Self { tokens }
    }

    /// Replaces the trailing token. No-op on an empty route.
    pub fn set_last(&mut self, token: impl Into<String>) {
        if let Some(last) = self.tokens.last_mut() {
            *last = token.into();
        }
    }

    /// Absolute URL path (`/a/b`). The empty route maps to `/`.
    pub fn to_url(&self) -> String {
        if self.tokens.is_empty() {
            return "/".to_string();
        }
        let mut url = String::new();
        for token in &self.tokens {
            url.push('/');
            url.push_str(token);
        }
        url
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

impl<S: Into<String>> FromIterator<S> for Route {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Route::new(iter)
    }
}
