//! # kp2imdb
//!
//! Converts a Kinopoisk watch-history export into a CSV that Letterboxd can
//! import, filling in IMDb identifiers from the public IMDb title dump.
//!
//! ## Usage
//!
//! ```bash
//! kp2imdb [--config kp2imdb.toml] <EXPORT>
//! ```
//!
//! ## Examples
//!
//! ```bash
//! # Download the catalog if needed, then convert
//! kp2imdb ~/Downloads/kinopoisk.xls
//!
//! # Reuse whatever catalog is cached, write somewhere else
//! kp2imdb --offline --output out/letterboxd.csv kinopoisk.xls
//!
//! # Debug-level logs as JSON lines
//! RUST_LOG=debug kp2imdb --log-format json kinopoisk.xls
//! ```

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use kinopoisk_imdb::config::{self, Config};
use kinopoisk_imdb::pipeline::{self, RunOptions};

/// Match a Kinopoisk watch history against IMDb and write a Letterboxd CSV.
#[derive(Parser)]
#[command(name = "kp2imdb", version)]
struct Cli {
    /// Path to the HTML table exported from Kinopoisk.
    source: PathBuf,

    /// Path to configuration file (TOML). Built-in defaults apply without it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output CSV path (overrides `export.path`).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Catalog cache path (overrides `catalog.cache_path`).
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Never download; use the cached catalog even if it is stale.
    #[arg(long, conflicts_with = "refresh")]
    offline: bool,

    /// Download the catalog even if the cache is fresh.
    #[arg(long)]
    refresh: bool,

    /// Log line format on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Human)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    // Scoped to this run rather than installed process-wide.
    let _guard = match cli.log_format {
        LogFormat::Human => tracing::subscriber::set_default(builder.finish()),
        LogFormat::Json => tracing::subscriber::set_default(builder.json().finish()),
    };

    if let Err(e) = run(cli) {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };
    if let Some(output) = cli.output {
        cfg.export.path = output;
    }
    if let Some(catalog) = cli.catalog {
        cfg.catalog.cache_path = catalog;
    }

    let options = RunOptions {
        source: cli.source,
        refresh: cli.refresh,
        offline: cli.offline,
    };
    pipeline::run(&cfg, &options)?;
    Ok(())
}
