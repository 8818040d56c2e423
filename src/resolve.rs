//! Title → identifier resolution.
//!
//! A title that appears once in the catalog is trusted outright, whatever
//! year the caller supplies. A title shared by several works needs a year to
//! pick one of them; when the year leaves zero or several candidates the
//! title is reported and left unresolved. A miss is a normal outcome, never
//! an error.
//!
//! ```text
//! lookup(title)
//!   ├─ absent ...................... NotFound
//!   ├─ 1 entry ..................... Unique(id)
//!   └─ n entries
//!        ├─ no year ................ Ambiguous { n }
//!        └─ filter by year
//!             ├─ 1 left ............ YearMatch(id)
//!             ├─ 0 left ............ NoYearMatch
//!             └─ >1 left ........... StillAmbiguous
//! ```

use tracing::info;

use crate::catalog::CatalogIndex;

/// Outcome of looking up one title.
///
/// Identifiers borrow from the index, so a resolved id always exists there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The title maps to exactly one entry.
    Unique(&'a str),
    /// Several entries share the title; the year selected exactly one.
    YearMatch(&'a str),
    NotFound,
    /// Several entries share the title and no year was given.
    Ambiguous { candidates: usize },
    /// No entry with this title has the given year.
    NoYearMatch { candidates: usize, year: u16 },
    /// The catalog holds duplicate title+year pairs.
    StillAmbiguous { matches: usize, year: u16 },
}

impl<'a> Resolution<'a> {
    pub fn id(&self) -> Option<&'a str> {
        match *self {
            Resolution::Unique(id) | Resolution::YearMatch(id) => Some(id),
            _ => None,
        }
    }
}

impl CatalogIndex {
    /// Classify `title` (and optional `year`) against the index. Pure.
    pub fn classify(&self, title: &str, year: Option<u16>) -> Resolution<'_> {
        let candidates = match self.get(title) {
            Some(c) if !c.is_empty() => c,
            _ => return Resolution::NotFound,
        };

        if let [only] = candidates {
            return Resolution::Unique(&only.id);
        }

        let Some(year) = year else {
            return Resolution::Ambiguous {
                candidates: candidates.len(),
            };
        };

        let mut same_year = candidates.iter().filter(|e| e.year == Some(year));
        let first = same_year.next();
        let rest = same_year.count();
        match (first, rest) {
            (Some(entry), 0) => Resolution::YearMatch(&entry.id),
            (None, _) => Resolution::NoYearMatch {
                candidates: candidates.len(),
                year,
            },
            (Some(_), rest) => Resolution::StillAmbiguous {
                matches: rest + 1,
                year,
            },
        }
    }
}

/// Resolves titles against a loaded catalog and logs every unresolved one,
/// so the source data can be fixed by hand.
#[derive(Debug)]
pub struct TitleResolver {
    index: CatalogIndex,
}

impl TitleResolver {
    pub fn new(index: CatalogIndex) -> Self {
        Self { index }
    }

    #[cfg(test)]
    pub(crate) fn index(&self) -> &CatalogIndex {
        &self.index
    }

    /// Identifier for `title`, or `None` when absent or ambiguous.
    pub fn resolve(&self, title: &str, year: Option<u16>) -> Option<&str> {
        let resolution = self.index.classify(title, year);
        match resolution {
            Resolution::Unique(_) | Resolution::YearMatch(_) => {}
            Resolution::NotFound => info!("No film with title \"{}\"", title),
            Resolution::Ambiguous { candidates } => info!(
                "{} films with title \"{}\" and no year to pick one",
                candidates, title
            ),
            Resolution::NoYearMatch { candidates, year } => info!(
                "{} films with title \"{}\" but none from {}",
                candidates, title, year
            ),
            Resolution::StillAmbiguous { matches, year } => info!(
                "{} films with title \"{}\" and year {}",
                matches, title, year
            ),
        }
        resolution.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogEntry;

    fn alice_catalog() -> CatalogIndex {
        CatalogIndex::from_entries([
            ("Inception", CatalogEntry::new("tt1375666", Some(2010))),
            ("Alice", CatalogEntry::new("tt1", Some(2001))),
            ("Alice", CatalogEntry::new("tt2", Some(2015))),
        ])
    }

    #[test]
    fn unique_title_resolves_without_year() {
        let resolver = TitleResolver::new(alice_catalog());
        assert_eq!(resolver.resolve("Inception", None), Some("tt1375666"));
    }

    #[test]
    fn unique_title_ignores_mismatched_year() {
        let resolver = TitleResolver::new(alice_catalog());
        assert_eq!(resolver.resolve("Inception", Some(1999)), Some("tt1375666"));
        assert_eq!(
            resolver.index().classify("Inception", Some(1999)),
            Resolution::Unique("tt1375666")
        );
    }

    #[test]
    fn ambiguous_title_needs_year() {
        let resolver = TitleResolver::new(alice_catalog());
        assert_eq!(resolver.resolve("Alice", None), None);
        assert_eq!(
            resolver.index().classify("Alice", None),
            Resolution::Ambiguous { candidates: 2 }
        );
    }

    #[test]
    fn year_picks_single_candidate() {
        let resolver = TitleResolver::new(alice_catalog());
        assert_eq!(resolver.resolve("Alice", Some(2015)), Some("tt2"));
        assert_eq!(resolver.resolve("Alice", Some(2001)), Some("tt1"));
    }

    #[test]
    fn year_without_candidate_is_absent() {
        let resolver = TitleResolver::new(alice_catalog());
        assert_eq!(resolver.resolve("Alice", Some(1999)), None);
        assert_eq!(
            resolver.index().classify("Alice", Some(1999)),
            Resolution::NoYearMatch {
                candidates: 2,
                year: 1999
            }
        );
    }

    #[test]
    fn duplicate_title_and_year_stays_ambiguous() {
        let index = CatalogIndex::from_entries([
            ("Hamlet", CatalogEntry::new("tt10", Some(1990))),
            ("Hamlet", CatalogEntry::new("tt11", Some(1990))),
            ("Hamlet", CatalogEntry::new("tt12", Some(1996))),
        ]);
        assert_eq!(
            index.classify("Hamlet", Some(1990)),
            Resolution::StillAmbiguous {
                matches: 2,
                year: 1990
            }
        );
        assert_eq!(index.classify("Hamlet", Some(1996)), Resolution::YearMatch("tt12"));
        assert_eq!(TitleResolver::new(index).resolve("Hamlet", Some(1990)), None);
    }

    #[test]
    fn unknown_catalog_year_never_matches() {
        let index = CatalogIndex::from_entries([
            ("Solaris", CatalogEntry::new("tt20", None)),
            ("Solaris", CatalogEntry::new("tt21", Some(1972))),
        ]);
        assert_eq!(index.classify("Solaris", Some(1972)), Resolution::YearMatch("tt21"));
        assert!(matches!(
            index.classify("Solaris", Some(2002)),
            Resolution::NoYearMatch { .. }
        ));
    }

    #[test]
    fn nonexistent_title_is_absent() {
        let resolver = TitleResolver::new(alice_catalog());
        assert_eq!(resolver.resolve("nonexistent title", None), None);
        assert_eq!(resolver.resolve("nonexistent title", Some(2000)), None);
    }

    #[test]
    fn resolved_ids_exist_in_index() {
        let resolver = TitleResolver::new(alice_catalog());
        for (title, year) in [("Inception", None), ("Alice", Some(2015)), ("Alice", Some(2001))] {
            let id = resolver.resolve(title, year).unwrap();
            assert!(resolver.index().contains_id(id));
        }
    }

    #[test]
    fn catalog_title_whitespace_does_not_block_match() {
        let resolver = TitleResolver::new(CatalogIndex::from_entries([(
            "Alice\tin  Wonderland",
            CatalogEntry::new("tt30", Some(1951)),
        )]));
        assert_eq!(resolver.resolve("Alice in Wonderland", None), Some("tt30"));
    }
}
