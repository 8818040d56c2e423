//! CSV export in the watch-tracker import schema.
//!
//! Produces one row per record, in input order, under the fixed header
//! `imdbID,Title,Year,WatchedDate,Rating10`. Unknown values (no identifier,
//! unknown year or rating) are written as empty fields.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::models::WatchRecord;

#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "imdbID")]
    imdb_id: Option<&'a str>,
    #[serde(rename = "Title")]
    title: &'a str,
    #[serde(rename = "Year")]
    year: Option<u16>,
    #[serde(rename = "WatchedDate")]
    watched_date: String,
    #[serde(rename = "Rating10")]
    rating: Option<u8>,
}

impl<'a> From<&'a WatchRecord> for ExportRow<'a> {
    fn from(record: &'a WatchRecord) -> Self {
        Self {
            imdb_id: record.imdb_id.as_deref(),
            title: &record.title,
            year: record.year,
            watched_date: record.watched_date.format("%Y-%m-%d").to_string(),
            rating: record.rating,
        }
    }
}

/// Serialize `records` as CSV into any writer.
pub fn write_csv<W: Write>(writer: W, records: &[WatchRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(ExportRow::from(record))?;
    }
    if records.is_empty() {
        // serde only emits the header alongside the first row.
        wtr.write_record(["imdbID", "Title", "Year", "WatchedDate", "Rating10"])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the export file, creating parent directories as needed.
pub fn run_export(path: &Path, records: &[WatchRecord]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_csv(std::io::BufWriter::new(file), records)
        .with_context(|| format!("Failed to write CSV: {}", path.display()))?;

    info!("Exported {} films to {}", records.len(), path.display());
    Ok(records.len())
}
