//! End-to-end run orchestration.
//!
//! Coordinates one batch run: catalog refresh → catalog index → source
//! parse → enrichment → CSV export. Catalog, source, and download failures
//! abort the run; everything per-row or per-title is logged and skipped by
//! the stage that sees it.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::catalog::{self, LoadStats};
use crate::config::Config;
use crate::download::{self, FetchOutcome};
use crate::enrich::{self, EnrichStats};
use crate::export;
use crate::resolve::TitleResolver;
use crate::source;

/// Per-invocation options that are not part of the config file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub source: PathBuf,
    /// Download even when the cache is fresh.
    pub refresh: bool,
    /// Never download.
    pub offline: bool,
}

/// Counters from a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub fetch: FetchOutcome,
    pub catalog: LoadStats,
    pub rows: usize,
    pub parsed: usize,
    pub rejected: usize,
    pub enrich: EnrichStats,
    pub exported: usize,
    pub output: PathBuf,
}

pub fn run(config: &Config, options: &RunOptions) -> Result<RunSummary> {
    // Checked first so a typo in the path fails before a multi-gigabyte download.
    if !options.source.is_file() {
        bail!("Source file not found: {}", options.source.display());
    }

    let fetch = download::ensure_catalog(&config.catalog, options.refresh, options.offline)
        .context("Failed to obtain catalog")?;

    let (index, catalog_stats) =
        catalog::load_catalog(&config.catalog.cache_path, &config.catalog.title_types)
            .context("Failed to load catalog")?;
    let resolver = TitleResolver::new(index);

    let report = source::load_source(&options.source, &config.source)
        .context("Failed to load watch history")?;
    let rows = report.rows;
    let rejected = report.rejected;
    let mut records = report.records;

    let enrich_stats = enrich::enrich(&mut records, &resolver);

    let exported = export::run_export(&config.export.path, &records)?;

    info!(
        "Done: {} rows, {} parsed, {} matched, {} exported to {}",
        rows,
        records.len(),
        enrich_stats.matched,
        exported,
        config.export.path.display()
    );

    Ok(RunSummary {
        fetch,
        catalog: catalog_stats,
        rows,
        parsed: records.len(),
        rejected,
        enrich: enrich_stats,
        exported,
        output: config.export.path.clone(),
    })
}
