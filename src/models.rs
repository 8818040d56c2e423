//! Core data models used throughout the matcher.
//!
//! These types represent the catalog rows and watch records that flow
//! through the download → resolve → export pipeline.

use chrono::NaiveDate;

/// A single catalog row, keyed elsewhere by its original title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Canonical identifier (`tconst`, e.g. `tt1375666`).
    pub id: String,
    /// Release year; `None` when the catalog has `\N` or garbage.
    pub year: Option<u16>,
}

impl CatalogEntry {
    pub fn new(id: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            id: id.into(),
            year,
        }
    }
}

/// One film from the local watch-history export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchRecord {
    pub title: String,
    pub year: Option<u16>,
    /// Personal rating on a 1..=10 scale.
    pub rating: Option<u8>,
    pub watched_date: NaiveDate,
    /// Set at most once, by the enricher.
    pub imdb_id: Option<String>,
}

impl WatchRecord {
    pub fn new(
        title: impl Into<String>,
        year: Option<u16>,
        rating: Option<u8>,
        watched_date: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            year,
            rating,
            watched_date,
            imdb_id: None,
        }
    }
}

/// Trim and collapse every whitespace run to a single space.
///
/// Titles on both sides of the match go through this, so a stray tab or
/// double space in either file does not prevent a lookup.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
