//! Error types for the catalog, download, and source stages.
//!
//! Fatal conditions abort the run and are propagated to `main`. Per-row
//! problems are expressed as [`RowError`] values so callers can log and skip
//! them without unwinding.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or streaming the catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The cached catalog is missing or cannot be opened.
    #[error("Catalog unavailable: {path}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header row lacks a column the index needs.
    #[error("Catalog header is missing required column '{column}'")]
    MissingColumn { column: &'static str },

    /// The stream broke partway through (truncated gzip, disk error).
    #[error("Failed to read catalog: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Errors raised while refreshing the cached catalog.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The cache is absent and downloads are disabled.
    #[error("Catalog cache {path} does not exist and downloads are disabled (--offline)")]
    Offline { path: PathBuf },

    #[error("Catalog request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to write catalog cache: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading the HTML export as a whole.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Source file unreadable: {path}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown text encoding: '{0}'")]
    UnknownEncoding(String),

    #[error("Invalid CSS selector: {0}")]
    Selector(String),

    #[error("No <table> element found in source export")]
    NoTable,
}

/// Why a single source row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("missing title")]
    MissingTitle,

    #[error("missing watch timestamp")]
    MissingTimestamp,

    #[error("unrecognised watch timestamp '{value}'")]
    BadTimestamp { value: String },
}
