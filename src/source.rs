//! Watch-history export parser.
//!
//! The export is a single HTML table saved in a legacy single-byte encoding
//! (`windows-1251` by default). After the header row, each row is one
//! watched film; cell positions come from [`SourceConfig`], and the watch
//! timestamp is always the last cell.
//!
//! Rows are parsed independently. A rejected row is logged and dropped
//! without affecting its neighbours:
//!
//! | Cell | Missing / unparsable |
//! |------|----------------------|
//! | title | row rejected |
//! | year | year unknown, row kept |
//! | rating | rating unknown, row kept |
//! | timestamp | row rejected |

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use encoding_rs::Encoding;
use scraper::{ElementRef, Html, Selector};
use tracing::{error, info, warn};

use crate::config::SourceConfig;
use crate::error::{RowError, SourceError};
use crate::models::{collapse_whitespace, WatchRecord};

/// Result of parsing a whole export.
#[derive(Debug, Default)]
pub struct ParseReport {
    /// Data rows present in the table, header excluded.
    pub rows: usize,
    /// Rows that produced a record, in table order.
    pub records: Vec<WatchRecord>,
    pub rejected: usize,
}

/// Read, decode, and parse the export at `path`.
pub fn load_source(path: &Path, config: &SourceConfig) -> Result<ParseReport, SourceError> {
    info!("Loading watch history from {}", path.display());

    let encoding = Encoding::for_label(config.encoding.as_bytes())
        .ok_or_else(|| SourceError::UnknownEncoding(config.encoding.clone()))?;
    let bytes = std::fs::read(path).map_err(|source| SourceError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        warn!(
            "{} contains bytes invalid in {}; they were replaced",
            path.display(),
            encoding.name()
        );
    }

    parse_html(&text, config)
}

fn selector(css: &str) -> Result<Selector, SourceError> {
    Selector::parse(css).map_err(|e| SourceError::Selector(e.to_string()))
}

/// Parse already-decoded HTML.
pub fn parse_html(html: &str, config: &SourceConfig) -> Result<ParseReport, SourceError> {
    let document = Html::parse_document(html);
    let table_sel = selector("table")?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td, th")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or(SourceError::NoTable)?;

    let mut report = ParseReport::default();

    // First row is the header.
    for (n, row) in table.select(&row_sel).enumerate().skip(1) {
        report.rows += 1;
        let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();

        match parse_row(&cells, config) {
            Ok(record) => {
                if record.year.is_none() {
                    warn!("Row {} (\"{}\"): year unknown", n, record.title);
                }
                if record.rating.is_none() {
                    warn!("Row {} (\"{}\"): rating unknown", n, record.title);
                }
                report.records.push(record);
            }
            Err(e) => {
                report.rejected += 1;
                error!("Row {} rejected: {}", n, e);
            }
        }
    }

    info!(
        "Watch history parsed: {} rows present, {} parsed, {} rejected",
        report.rows,
        report.records.len(),
        report.rejected
    );
    Ok(report)
}

/// Text content with runs of whitespace (including `&nbsp;`) collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    collapse_whitespace(&cell.text().collect::<Vec<_>>().join(" "))
}

/// Turn one row's cells into a record.
pub fn parse_row(cells: &[String], config: &SourceConfig) -> Result<WatchRecord, RowError> {
    let title = cells
        .get(config.title_column)
        .filter(|t| !t.is_empty())
        .ok_or(RowError::MissingTitle)?;

    let raw_ts = cells
        .last()
        .filter(|t| !t.is_empty())
        .ok_or(RowError::MissingTimestamp)?;
    let watched = parse_watched(raw_ts, &config.timestamp_format).ok_or_else(|| {
        RowError::BadTimestamp {
            value: raw_ts.clone(),
        }
    })?;

    let year = cells
        .get(config.year_column)
        .and_then(|y| y.parse::<u16>().ok());
    let rating = cells
        .get(config.rating_column)
        .and_then(|r| r.parse::<u8>().ok())
        .filter(|r| (1..=10).contains(r));

    Ok(WatchRecord::new(title.clone(), year, rating, watched))
}

/// Date part of `raw`. Formats without time fields parse as a bare date.
fn parse_watched(raw: &str, format: &str) -> Option<NaiveDate> {
    NaiveDateTime::parse_from_str(raw, format)
        .map(|dt| dt.date())
        .or_else(|_| NaiveDate::parse_from_str(raw, format))
        .ok()
}
