//! Attach catalog identifiers to watch records.

use tracing::info;

use crate::models::WatchRecord;
use crate::resolve::TitleResolver;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EnrichStats {
    pub matched: usize,
    pub unmatched: usize,
}

/// Resolve every record in place. Records with no match keep `imdb_id: None`;
/// that is a valid final state, not an error.
pub fn enrich(records: &mut [WatchRecord], resolver: &TitleResolver) -> EnrichStats {
    let mut stats = EnrichStats::default();

    for record in records.iter_mut() {
        match resolver.resolve(&record.title, record.year) {
            Some(id) => {
                record.imdb_id = Some(id.to_string());
                stats.matched += 1;
            }
            None => stats.unmatched += 1,
        }
    }

    info!(
        "Matched {} of {} films ({} unmatched)",
        stats.matched,
        records.len(),
        stats.unmatched
    );
    stats
}
