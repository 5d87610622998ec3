//! Catalogue-wide counters.

use crate::db::Store;
use crate::repo::error::RepoResult;
use serde::Serialize;

/// Row totals for the whole catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogueStats {
    pub papers: u64,
    pub authors: u64,
}

/// Counts papers and authors in one read snapshot.
pub fn catalogue_stats(store: &Store) -> RepoResult<CatalogueStats> {
    store.read(|tx| -> RepoResult<CatalogueStats> {
        let (papers, authors): (i64, i64) = tx.query_row(
            "SELECT
                (SELECT COUNT(*) FROM papers),
                (SELECT COUNT(*) FROM authors);",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(CatalogueStats {
            papers: u64::try_from(papers).unwrap_or_default(),
            authors: u64::try_from(authors).unwrap_or_default(),
        })
    })
}
