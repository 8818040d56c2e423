//! Catalog loader and title index.
//!
//! Streams the gzip-compressed, tab-separated title dump row by row and
//! groups `(tconst, startYear)` pairs under their `originalTitle`. The dump
//! is several gigabytes decompressed, so nothing but the index itself is held
//! in memory.
//!
//! Column positions are read from the header row; only `tconst`,
//! `originalTitle` and `startYear` are required. `titleType` is used when
//! `catalog.title_types` restricts which rows are indexed.
//!
//! Rows that lack an identifier or a title, or that are not valid UTF-8, are
//! skipped and counted. They can only affect their own title, so they never
//! abort the load. A read error from the underlying stream does.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::models::{collapse_whitespace, CatalogEntry};

const COL_ID: &str = "tconst";
const COL_TITLE: &str = "originalTitle";
const COL_YEAR: &str = "startYear";
const COL_TYPE: &str = "titleType";

/// Title → every catalog entry carrying that title, in file order.
///
/// Built once, read-only afterwards. Every key maps to at least one entry.
#[derive(Debug, Default, Clone)]
pub struct CatalogIndex {
    by_title: HashMap<String, Vec<CatalogEntry>>,
}

impl CatalogIndex {
    /// Build an index from already-parsed `(title, entry)` pairs.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, CatalogEntry)>,
        S: Into<String>,
    {
        let mut index = Self::default();
        for (title, entry) in entries {
            let title: String = title.into();
            index.insert(collapse_whitespace(&title), entry);
        }
        index
    }

    /// `title` must already be whitespace-normalized.
    fn insert(&mut self, title: String, entry: CatalogEntry) {
        self.by_title.entry(title).or_default().push(entry);
    }

    /// All entries sharing `title`, or `None` if the title is unknown.
    pub fn get(&self, title: &str) -> Option<&[CatalogEntry]> {
        self.by_title.get(title).map(Vec::as_slice)
    }

    /// Number of distinct titles.
    pub fn len(&self) -> usize {
        self.by_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_title.is_empty()
    }

    /// Whether `id` belongs to some entry in the index.
    #[cfg(test)]
    pub(crate) fn contains_id(&self, id: &str) -> bool {
        self.by_title.values().flatten().any(|e| e.id == id)
    }
}

/// Counters reported after a load.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Data rows seen, header excluded.
    pub rows: u64,
    /// Rows added to the index.
    pub indexed: u64,
    /// Malformed rows.
    pub skipped: u64,
    /// Well-formed rows excluded by `title_types`.
    pub filtered: u64,
    /// Distinct titles in the resulting index.
    pub titles: usize,
}

/// Load the cached catalog at `path`.
///
/// The file handle is dropped before this returns, on success and on error.
pub fn load_catalog(
    path: &Path,
    title_types: &[String],
) -> Result<(CatalogIndex, LoadStats), CatalogError> {
    info!("Reading catalog from {}", path.display());
    let file = File::open(path).map_err(|source| CatalogError::Unavailable {
        path: path.to_path_buf(),
        source,
    })?;
    let decoder = GzDecoder::new(BufReader::new(file));

    let (index, stats) = read_catalog(decoder, title_types).map_err(|e| match e {
        ReadFailure::Csv(source) => CatalogError::Read {
            path: path.to_path_buf(),
            source,
        },
        ReadFailure::MissingColumn(column) => CatalogError::MissingColumn { column },
    })?;

    info!(
        "Catalog index built: {} distinct titles, {} rows ({} indexed, {} skipped, {} filtered)",
        stats.titles, stats.rows, stats.indexed, stats.skipped, stats.filtered
    );
    Ok((index, stats))
}

enum ReadFailure {
    Csv(csv::Error),
    MissingColumn(&'static str),
}

/// Index an already-decompressed TSV stream.
fn read_catalog<R: Read>(
    reader: R,
    title_types: &[String],
) -> Result<(CatalogIndex, LoadStats), ReadFailure> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    let headers = rdr.headers().map_err(ReadFailure::Csv)?.clone();
    let column = |name: &'static str| headers.iter().position(|h| h == name);
    let id_col = column(COL_ID).ok_or(ReadFailure::MissingColumn(COL_ID))?;
    let title_col = column(COL_TITLE).ok_or(ReadFailure::MissingColumn(COL_TITLE))?;
    let year_col = column(COL_YEAR).ok_or(ReadFailure::MissingColumn(COL_YEAR))?;
    let type_col = if title_types.is_empty() {
        None
    } else {
        Some(column(COL_TYPE).ok_or(ReadFailure::MissingColumn(COL_TYPE))?)
    };

    let mut index = CatalogIndex::default();
    let mut stats = LoadStats::default();
    let mut record = csv::StringRecord::new();

    loop {
        match rdr.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_io_error() => return Err(ReadFailure::Csv(e)),
            Err(e) => {
                stats.rows += 1;
                stats.skipped += 1;
                debug!("Skipping unreadable catalog row: {}", e);
                continue;
            }
        }
        stats.rows += 1;

        let id = record.get(id_col).map(str::trim).unwrap_or_default();
        let title = collapse_whitespace(record.get(title_col).unwrap_or_default());
        if id.is_empty() || title.is_empty() {
            stats.skipped += 1;
            debug!("Skipping catalog row {} without identifier or title", stats.rows);
            continue;
        }

        if let Some(col) = type_col {
            let kind = record.get(col).unwrap_or_default();
            if !title_types.iter().any(|t| t == kind) {
                stats.filtered += 1;
                continue;
            }
        }

        let year = record.get(year_col).and_then(parse_year);
        index.insert(title, CatalogEntry::new(id, year));
        stats.indexed += 1;
    }

    stats.titles = index.len();
    Ok((index, stats))
}

/// `startYear` is `\N` when unknown.
fn parse_year(raw: &str) -> Option<u16> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str =
        "tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres";

    fn write_gz(dir: &TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let file = File::create(&path).unwrap();
        let mut enc = GzEncoder::new(file, Compression::default());
        for line in lines {
            enc.write_all(line.as_bytes()).unwrap();
            enc.write_all(b"\n").unwrap();
        }
        enc.finish().unwrap();
        path
    }

    #[test]
    fn groups_entries_by_original_title() {
        let tmp = TempDir::new().unwrap();
        let path = write_gz(
            &tmp,
            "titles.tsv.gz",
            &[
                HEADER,
                "tt1375666\tmovie\tInception\tInception\t0\t2010\t\\N\t148\tAction",
                "tt0000001\tmovie\tAlice\tAlice\t0\t2001\t\\N\t90\tDrama",
                "tt0000002\tmovie\tAlice\tAlice\t0\t2015\t\\N\t95\tDrama",
            ],
        );

        let (index, stats) = load_catalog(&path, &[]).unwrap();
        assert_eq!(stats.rows, 3);
        assert_eq!(stats.indexed, 3);
        assert_eq!(stats.titles, 2);
        assert_eq!(index.len(), 2);

        let alice = index.get("Alice").unwrap();
        assert_eq!(
            alice,
            &[
                CatalogEntry::new("tt0000001", Some(2001)),
                CatalogEntry::new("tt0000002", Some(2015)),
            ]
        );
        assert!(index.contains_id("tt1375666"));
        assert!(!index.contains_id("tt9999999"));
    }

    #[test]
    fn unknown_year_is_none() {
        let tmp = TempDir::new().unwrap();
        let path = write_gz(
            &tmp,
            "titles.tsv.gz",
            &[HEADER, "tt7\tmovie\tLost\tLost\t0\t\\N\t\\N\t\\N\t\\N"],
        );
        let (index, _) = load_catalog(&path, &[]).unwrap();
        assert_eq!(index.get("Lost").unwrap()[0].year, None);
    }

    #[test]
    fn malformed_rows_do_not_abort_load() {
        let tmp = TempDir::new().unwrap();
        let path = write_gz(
            &tmp,
            "titles.tsv.gz",
            &[
                HEADER,
                "tt1\tmovie\tGood\tGood\t0\t1999\t\\N\t90\tDrama",
                "tt2\tmovie",
                "\tmovie\tNoId\tNoId\t0\t2000\t\\N\t90\tDrama",
                "tt3\tmovie\tEmpty\t\t0\t2000\t\\N\t90\tDrama",
                "tt4\tmovie\tAlso Good\tAlso Good\t0\t2004\t\\N\t90\tDrama",
            ],
        );

        let (index, stats) = load_catalog(&path, &[]).unwrap();
        assert_eq!(stats.rows, 5);
        assert_eq!(stats.indexed, 2);
        assert_eq!(stats.skipped, 3);
        assert!(index.get("Good").is_some());
        assert!(index.get("Also Good").is_some());
        assert!(index.get("NoId").is_none());
    }

    #[test]
    fn invalid_utf8_row_is_skipped() {
        let mut data = Vec::new();
        data.extend_from_slice(HEADER.as_bytes());
        data.extend_from_slice(b"\ntt1\tmovie\tBad\t\xff\xfe\t0\t1999\t\\N\t90\tDrama\n");
        data.extend_from_slice(b"tt2\tmovie\tFine\tFine\t0\t2000\t\\N\t90\tDrama\n");

        let (index, stats) = match read_catalog(data.as_slice(), &[]) {
            Ok(v) => v,
            Err(_) => panic!("read should succeed"),
        };
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.indexed, 1);
        assert!(index.get("Fine").is_some());
    }

    #[test]
    fn quotes_in_titles_are_literal() {
        let tmp = TempDir::new().unwrap();
        let path = write_gz(
            &tmp,
            "titles.tsv.gz",
            &[
                HEADER,
                "tt5\tmovie\t\"Weird Al\" Live\t\"Weird Al\" Live\t0\t1999\t\\N\t60\tComedy",
            ],
        );
        let (index, _) = load_catalog(&path, &[]).unwrap();
        assert!(index.get("\"Weird Al\" Live").is_some());
    }

    #[test]
    fn title_types_filter_rows() {
        let tmp = TempDir::new().unwrap();
        let path = write_gz(
            &tmp,
            "titles.tsv.gz",
            &[
                HEADER,
                "tt1\tmovie\tHeat\tHeat\t0\t1995\t\\N\t170\tCrime",
                "tt2\ttvEpisode\tHeat\tHeat\t0\t2003\t\\N\t22\tDrama",
            ],
        );
        let (index, stats) = load_catalog(&path, &["movie".to_string()]).unwrap();
        assert_eq!(stats.filtered, 1);
        assert_eq!(index.get("Heat").unwrap().len(), 1);
    }

    #[test]
    fn missing_file_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let err = load_catalog(&tmp.path().join("nope.tsv.gz"), &[]).unwrap_err();
        assert!(matches!(err, CatalogError::Unavailable { .. }));
    }

    #[test]
    fn missing_required_column_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let path = write_gz(&tmp, "titles.tsv.gz", &["tconst\tprimaryTitle", "tt1\tX"]);
        let err = load_catalog(&path, &[]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingColumn {
                column: "originalTitle"
            }
        ));
    }

    #[test]
    fn non_gzip_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plain.tsv.gz");
        std::fs::write(&path, HEADER).unwrap();
        let err = load_catalog(&path, &[]).unwrap_err();
        assert!(matches!(err, CatalogError::Read { .. }));
    }

    #[test]
    fn from_entries_preserves_order() {
        let index = CatalogIndex::from_entries([
            ("X", CatalogEntry::new("tt2", Some(2))),
            ("X", CatalogEntry::new("tt1", Some(1))),
        ]);
        let ids: Vec<&str> = index.get("X").unwrap().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["tt2", "tt1"]);
    }

    #[test]
    fn titles_with_irregular_whitespace_are_normalized() {
        let tmp = TempDir::new().unwrap();
        let path = write_gz(
            &tmp,
            "ws.tsv.gz",
            &[
                HEADER,
                "tt0000010\tmovie\tAlice in Wonderland\t Alice  in Wonderland \t0\t1951\t\\N\t75\tFamily",
            ],
        );
        let (index, stats) = load_catalog(&path, &[]).unwrap();
        assert_eq!(stats.indexed, 1);
        let entries = index.get("Alice in Wonderland").unwrap();
        assert_eq!(entries[0].id, "tt0000010");
        assert!(index.get(" Alice  in Wonderland ").is_none());
    }
}
