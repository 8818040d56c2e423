//! Catalog cache refresh.
//!
//! The catalog is a multi-gigabyte gzip file published once a day, so it is
//! cached on disk and fetched again only when the cached copy is older than
//! `catalog.max_age_hours`. The body is streamed to `<cache>.part` and renamed
//! into place after the transfer completes; an interrupted download leaves
//! the previous cache untouched.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{error, info};

use crate::config::CatalogConfig;
use crate::error::DownloadError;

/// What [`ensure_catalog`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The cached file was recent enough; no request was made.
    Fresh,
    /// A new copy was written to the cache path.
    Downloaded { bytes: u64 },
}

/// Returns `true` when the file at `path` should be downloaded again.
///
/// Missing files and unreadable modification times are stale. A modification
/// time later than `now` is treated as fresh.
pub fn is_stale(path: &Path, max_age: Duration, now: SystemTime) -> bool {
    let modified = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => modified,
        Err(_) => return true,
    };
    match now.duration_since(modified) {
        Ok(age) => age > max_age,
        Err(_) => false,
    }
}

/// Make sure the catalog cache exists and is fresh.
///
/// `force` downloads regardless of age; `offline` never downloads and fails
/// when there is no cache at all. A stale cache is used as-is when offline.
pub fn ensure_catalog(
    config: &CatalogConfig,
    force: bool,
    offline: bool,
) -> Result<FetchOutcome, DownloadError> {
    let path = &config.cache_path;
    info!("Checking catalog cache at {}", path.display());

    if offline {
        if !path.exists() {
            return Err(DownloadError::Offline { path: path.clone() });
        }
        info!("Offline mode, using cached catalog as-is");
        return Ok(FetchOutcome::Fresh);
    }

    let max_age = Duration::from_secs(config.max_age_hours * 3600);
    if !force && !is_stale(path, max_age, SystemTime::now()) {
        info!("Catalog cache is fresh enough, skipping download");
        return Ok(FetchOutcome::Fresh);
    }

    info!("Downloading catalog from {}", config.url);
    let bytes = fetch_to(&config.url, path, Duration::from_secs(config.timeout_secs))
        .inspect_err(|e| error!("Catalog download failed: {}", e))?;
    info!("Catalog downloaded: {} bytes", bytes);
    Ok(FetchOutcome::Downloaded { bytes })
}

fn fetch_to(url: &str, dest: &Path, timeout: Duration) -> Result<u64, DownloadError> {
    let request_err = |source: reqwest::Error| DownloadError::Request {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(request_err)?;

    let mut response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(request_err)?;

    let part = part_path(dest);
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| DownloadError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let bytes = write_part(&mut response, &part).map_err(|e| {
        let _ = std::fs::remove_file(&part);
        match e {
            PartError::Body(source) => request_err(source),
            PartError::Io(source) => DownloadError::Write {
                path: part.clone(),
                source,
            },
        }
    })?;

    std::fs::rename(&part, dest).map_err(|source| {
        let _ = std::fs::remove_file(&part);
        DownloadError::Write {
            path: dest.to_path_buf(),
            source,
        }
    })?;

    Ok(bytes)
}

enum PartError {
    Body(reqwest::Error),
    Io(std::io::Error),
}

/// Stream the response body into `part`. The file is closed on return.
fn write_part(response: &mut reqwest::blocking::Response, part: &Path) -> Result<u64, PartError> {
    let file = File::create(part).map_err(PartError::Io)?;
    let mut writer = BufWriter::new(file);
    let bytes = response.copy_to(&mut writer).map_err(PartError::Body)?;
    writer.flush().map_err(PartError::Io)?;
    Ok(bytes)
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
