//! TOML configuration.
//!
//! Every field has a default, so the tool runs without a config file. A file
//! passed with `--config` may override any subset:
//!
//! ```toml
//! [catalog]
//! url = "https://datasets.imdbws.com/title.basics.tsv.gz"
//! cache_path = "imdb_titles.tsv.gz"
//! max_age_hours = 24
//! title_types = ["movie", "tvMovie"]
//!
//! [source]
//! encoding = "windows-1251"
//!
//! [export]
//! path = "letterboxd.csv"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_url")]
    pub url: String,
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,
    /// Cache older than this is downloaded again.
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Only index rows whose `titleType` is listed. Empty means all rows.
    #[serde(default)]
    pub title_types: Vec<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: default_catalog_url(),
            cache_path: default_cache_path(),
            max_age_hours: default_max_age_hours(),
            timeout_secs: default_timeout_secs(),
            title_types: Vec::new(),
        }
    }
}

fn default_catalog_url() -> String {
    "https://datasets.imdbws.com/title.basics.tsv.gz".to_string()
}
fn default_cache_path() -> PathBuf {
    PathBuf::from("imdb_titles.tsv.gz")
}
fn default_max_age_hours() -> u64 {
    24
}
fn default_timeout_secs() -> u64 {
    600
}

/// Layout of the HTML export. Column indices are zero-based; the timestamp
/// is always the last cell of a row.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default = "default_title_column")]
    pub title_column: usize,
    #[serde(default = "default_year_column")]
    pub year_column: usize,
    #[serde(default = "default_rating_column")]
    pub rating_column: usize,
    /// `chrono` format string for the watch timestamp. A format without time
    /// fields (e.g. `%d.%m.%Y`) is parsed as a plain date.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            title_column: default_title_column(),
            year_column: default_year_column(),
            rating_column: default_rating_column(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

fn default_encoding() -> String {
    "windows-1251".to_string()
}
fn default_title_column() -> usize {
    1
}
fn default_year_column() -> usize {
    2
}
fn default_rating_column() -> usize {
    7
}
fn default_timestamp_format() -> String {
    "%H:%M:%S %d.%m.%Y".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExportConfig {
    #[serde(default = "default_export_path")]
    pub path: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: default_export_path(),
        }
    }
}

fn default_export_path() -> PathBuf {
    PathBuf::from("letterboxd.csv")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.catalog.url.trim().is_empty() {
        anyhow::bail!("catalog.url must not be empty");
    }
    if config.catalog.max_age_hours == 0 {
        anyhow::bail!("catalog.max_age_hours must be > 0");
    }
    if config.catalog.timeout_secs == 0 {
        anyhow::bail!("catalog.timeout_secs must be > 0");
    }

    if encoding_rs::Encoding::for_label(config.source.encoding.as_bytes()).is_none() {
        anyhow::bail!(
            "source.encoding '{}' is not a known encoding label",
            config.source.encoding
        );
    }

    Ok(())
}
