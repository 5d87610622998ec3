//! Paper repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/update/delete/list APIs over `papers`.
//! - Own paper-author link replacement, delegating author identity to the
//!   resolver.
//!
//! # Invariants
//! - Every stored paper links to at least one author.
//! - `update_paper` replaces the whole link set; it never merges.
//! - `delete_paper` removes link rows only and never touches authors.
//! - List results ascend by paper id; `total` ignores pagination.

use crate::db::Store;
use crate::model::paper::{Paper, PaperId, PaperInput};
use crate::model::validation::ValidationError;
use crate::repo::author_resolver::resolve_in_tx;
use crate::repo::error::{log_outcome, RepoError, RepoResult};
use crate::repo::page::{effective_limit, Page};
use crate::repo::rows::{
    attach_authors, link_authors, load_paper, paper_exists, paper_row, PAPER_COLUMNS,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter};
use std::time::Instant;

/// Filter and pagination options for listing papers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperListQuery {
    /// Exact publication year.
    pub year: Option<i32>,
    /// Case-insensitive substring of the venue.
    pub venue: Option<String>,
    /// Case-insensitive author name substrings. A paper matches when every
    /// value matches the name of at least one of its authors.
    pub authors: Vec<String>,
    /// Page size, `1..=100`. Defaults to 10.
    pub limit: Option<u32>,
    /// Number of matching papers to skip.
    pub offset: u32,
}

impl PaperListQuery {
    pub fn with_author(mut self, name: impl Into<String>) -> Self {
        self.authors.push(name.into());
        self
    }
}

/// Repository interface for paper operations.
pub trait PaperRepository {
    /// Creates one paper, resolving its authors, and returns it.
    fn create_paper(&self, input: &PaperInput) -> RepoResult<Paper>;
    /// Gets one paper by id.
    fn get_paper(&self, id: PaperId) -> RepoResult<Paper>;
    /// Overwrites scalar fields and replaces the full author set.
    fn update_paper(&self, id: PaperId, input: &PaperInput) -> RepoResult<Paper>;
    /// Deletes one paper and its author links.
    fn delete_paper(&self, id: PaperId) -> RepoResult<()>;
    /// Lists papers matching `query`.
    fn list_papers(&self, query: &PaperListQuery) -> RepoResult<Page<Paper>>;
}

/// SQLite-backed paper repository.
#[derive(Debug, Clone)]
pub struct SqlitePaperRepository {
    store: Store,
}

impl SqlitePaperRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl PaperRepository for SqlitePaperRepository {
    fn create_paper(&self, input: &PaperInput) -> RepoResult<Paper> {
        let started_at = Instant::now();
        let result = input.validate().map_err(RepoError::from).and_then(|()| {
            self.store.write("paper_create", |tx| -> RepoResult<Paper> {
                let author_ids = resolve_in_tx(tx, &input.authors)?;
                if author_ids.is_empty() {
                    return Err(ValidationError::NoAuthors.into());
                }

                tx.execute(
                    "INSERT INTO papers (title, venue, year) VALUES (?1, ?2, ?3);",
                    params![input.title.as_str(), input.venue.as_str(), input.year],
                )?;
                let paper_id = tx.last_insert_rowid();
                link_authors(tx, paper_id, &author_ids)?;
                load_paper(tx, paper_id)
            })
        });

        let created_id = result.as_ref().ok().map(|paper| paper.id);
        log_outcome("paper_create", created_id, started_at, &result);
        result
    }

    fn get_paper(&self, id: PaperId) -> RepoResult<Paper> {
        self.store.read(|tx| load_paper(tx, id))
    }

    fn update_paper(&self, id: PaperId, input: &PaperInput) -> RepoResult<Paper> {
        let started_at = Instant::now();
        let result = input.validate().map_err(RepoError::from).and_then(|()| {
            self.store.write("paper_update", |tx| -> RepoResult<Paper> {
                if !paper_exists(tx, id)? {
                    return Err(RepoError::paper_not_found(id));
                }

                let author_ids = resolve_in_tx(tx, &input.authors)?;
                if author_ids.is_empty() {
                    return Err(ValidationError::NoAuthors.into());
                }

                tx.execute(
                    "UPDATE papers
                     SET
                        title = ?2,
                        venue = ?3,
                        year = ?4,
                        updated_at = (strftime('%s', 'now') * 1000)
                     WHERE id = ?1;",
                    params![id, input.title.as_str(), input.venue.as_str(), input.year],
                )?;
                tx.execute("DELETE FROM paper_authors WHERE paper_id = ?1;", [id])?;
                link_authors(tx, id, &author_ids)?;
                load_paper(tx, id)
            })
        });

        log_outcome("paper_update", Some(id), started_at, &result);
        result
    }

    fn delete_paper(&self, id: PaperId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.store.write("paper_delete", |tx| -> RepoResult<()> {
            tx.execute("DELETE FROM paper_authors WHERE paper_id = ?1;", [id])?;
            let changed = tx.execute("DELETE FROM papers WHERE id = ?1;", [id])?;
            if changed == 0 {
                return Err(RepoError::paper_not_found(id));
            }
            Ok(())
        });

        log_outcome("paper_delete", Some(id), started_at, &result);
        result
    }

    fn list_papers(&self, query: &PaperListQuery) -> RepoResult<Page<Paper>> {
        let limit = effective_limit(query.limit)?;
        let (filter_sql, bind_values) = paper_filter(query);

        self.store.read(|tx| -> RepoResult<Page<Paper>> {
            let total: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM papers p{filter_sql};"),
                params_from_iter(bind_values.iter()),
                |row| row.get(0),
            )?;

            let mut page_values = bind_values.clone();
            page_values.push(Value::Integer(i64::from(limit)));
            page_values.push(Value::Integer(i64::from(query.offset)));

            let mut stmt = tx.prepare(&format!(
                "SELECT {PAPER_COLUMNS} FROM papers p{filter_sql} ORDER BY p.id ASC LIMIT ? OFFSET ?;"
            ))?;
            let summaries = stmt
                .query_map(params_from_iter(page_values), paper_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let items = summaries
                .into_iter()
                .map(|summary| attach_authors(tx, summary))
                .collect::<RepoResult<Vec<_>>>()?;

            Ok(Page {
                items,
                total: u64::try_from(total).unwrap_or_default(),
                limit,
                offset: query.offset,
            })
        })
    }
}

/// Builds the `WHERE` clause for `query` over alias `p`, with positional binds.
fn paper_filter(query: &PaperListQuery) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(year) = query.year {
        sql.push_str(" AND p.year = ?");
        bind_values.push(Value::Integer(i64::from(year)));
    }

    if let Some(venue) = query.venue.as_deref() {
        sql.push_str(" AND instr(fold_case(p.venue), ?) > 0");
        bind_values.push(Value::Text(venue.to_lowercase()));
    }

    for name in &query.authors {
        sql.push_str(
            " AND EXISTS (
                SELECT 1
                FROM paper_authors pa
                INNER JOIN authors a ON a.id = pa.author_id
                WHERE pa.paper_id = p.id
                  AND instr(fold_case(a.name), ?) > 0
            )",
        );
        bind_values.push(Value::Text(name.to_lowercase()));
    }

    (sql, bind_values)
}

#[cfg(test)]
mod tests {
    use super::{paper_filter, PaperListQuery};

    #[test]
    fn filter_adds_one_exists_clause_per_author_value() {
        let query = PaperListQuery::default()
            .with_author("Ali")
            .with_author("Zhang");
        let (sql, binds) = paper_filter(&query);
        assert_eq!(sql.matches("EXISTS").count(), 2);
        assert_eq!(binds.len(), 2);
    }

    #[test]
    fn empty_query_has_no_binds() {
        let (sql, binds) = paper_filter(&PaperListQuery::default());
        assert_eq!(sql, " WHERE 1 = 1");
        assert!(binds.is_empty());
    }
}
