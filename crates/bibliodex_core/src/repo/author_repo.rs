//! Author repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/update/delete/list APIs over `authors`.
//! - Guard author deletion so no paper is left without authors.
//!
//! # Invariants
//! - `create_author` never deduplicates; only the resolver does.
//! - `delete_author` enumerates linked papers and deletes in one write unit,
//!   and mutates nothing when the guard rejects.
//! - List results ascend by author id; `total` ignores pagination.

use crate::db::Store;
use crate::model::author::{Author, AuthorId, AuthorInput};
use crate::model::paper::PaperId;
use crate::repo::error::{log_outcome, RepoError, RepoResult};
use crate::repo::page::{effective_limit, Page};
use crate::repo::rows::{
    attach_papers, author_exists, author_row, insert_author, load_author, AUTHOR_COLUMNS,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection};
use std::time::Instant;

/// Filter and pagination options for listing authors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorListQuery {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Case-insensitive substring of the affiliation.
    pub affiliation: Option<String>,
    /// Page size, `1..=100`. Defaults to 10.
    pub limit: Option<u32>,
    /// Number of matching authors to skip.
    pub offset: u32,
}

/// Repository interface for author operations.
pub trait AuthorRepository {
    /// Creates one author and returns it with no papers.
    fn create_author(&self, input: &AuthorInput) -> RepoResult<Author>;
    /// Gets one author with linked papers.
    fn get_author(&self, id: AuthorId) -> RepoResult<Author>;
    /// Overwrites all scalar fields.
    fn update_author(&self, id: AuthorId, input: &AuthorInput) -> RepoResult<Author>;
    /// Deletes one author unless it is the sole author of some paper.
    fn delete_author(&self, id: AuthorId) -> RepoResult<()>;
    /// Lists authors matching `query`.
    fn list_authors(&self, query: &AuthorListQuery) -> RepoResult<Page<Author>>;
}

/// SQLite-backed author repository.
#[derive(Debug, Clone)]
pub struct SqliteAuthorRepository {
    store: Store,
}

impl SqliteAuthorRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

impl AuthorRepository for SqliteAuthorRepository {
    fn create_author(&self, input: &AuthorInput) -> RepoResult<Author> {
        let started_at = Instant::now();
        let result = input.validate_at(0).map_err(RepoError::from).and_then(|()| {
            self.store
                .write("author_create", |tx| -> RepoResult<Author> {
                    let author_id = insert_author(tx, input)?;
                    load_author(tx, author_id)
                })
        });

        let created_id = result.as_ref().ok().map(|author| author.id);
        log_outcome("author_create", created_id, started_at, &result);
        result
    }

    fn get_author(&self, id: AuthorId) -> RepoResult<Author> {
        self.store.read(|tx| load_author(tx, id))
    }

    fn update_author(&self, id: AuthorId, input: &AuthorInput) -> RepoResult<Author> {
        let started_at = Instant::now();
        let result = input.validate_at(0).map_err(RepoError::from).and_then(|()| {
            self.store
                .write("author_update", |tx| -> RepoResult<Author> {
                    let changed = tx.execute(
                        "UPDATE authors
                         SET
                            name = ?2,
                            email = ?3,
                            affiliation = ?4,
                            updated_at = (strftime('%s', 'now') * 1000)
                         WHERE id = ?1;",
                        params![
                            id,
                            input.name.as_str(),
                            input.email.as_deref(),
                            input.affiliation.as_deref(),
                        ],
                    )?;
                    if changed == 0 {
                        return Err(RepoError::author_not_found(id));
                    }
                    load_author(tx, id)
                })
        });

        log_outcome("author_update", Some(id), started_at, &result);
        result
    }

    fn delete_author(&self, id: AuthorId) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.store.write("author_delete", |tx| -> RepoResult<()> {
            if !author_exists(tx, id)? {
                return Err(RepoError::author_not_found(id));
            }

            let orphaned = papers_solely_authored_by(tx, id)?;
            if !orphaned.is_empty() {
                return Err(RepoError::Constraint {
                    author_id: id,
                    paper_ids: orphaned,
                });
            }

            tx.execute("DELETE FROM paper_authors WHERE author_id = ?1;", [id])?;
            tx.execute("DELETE FROM authors WHERE id = ?1;", [id])?;
            Ok(())
        });

        log_outcome("author_delete", Some(id), started_at, &result);
        result
    }

    fn list_authors(&self, query: &AuthorListQuery) -> RepoResult<Page<Author>> {
        let limit = effective_limit(query.limit)?;
        let (filter_sql, bind_values) = author_filter(query);

        self.store.read(|tx| -> RepoResult<Page<Author>> {
            let total: i64 = tx.query_row(
                &format!("SELECT COUNT(*) FROM authors a{filter_sql};"),
                params_from_iter(bind_values.iter()),
                |row| row.get(0),
            )?;

            let mut page_values = bind_values.clone();
            page_values.push(Value::Integer(i64::from(limit)));
            page_values.push(Value::Integer(i64::from(query.offset)));

            let mut stmt = tx.prepare(&format!(
                "SELECT {AUTHOR_COLUMNS} FROM authors a{filter_sql} ORDER BY a.id ASC LIMIT ? OFFSET ?;"
            ))?;
            let summaries = stmt
                .query_map(params_from_iter(page_values), author_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            let items = summaries
                .into_iter()
                .map(|summary| attach_papers(tx, summary))
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

/// Papers linked to `author_id` that have no other author.
fn papers_solely_authored_by(conn: &Connection, author_id: AuthorId) -> RepoResult<Vec<PaperId>> {
    let mut stmt = conn.prepare(
        "SELECT pa.paper_id
         FROM paper_authors pa
         WHERE pa.author_id = ?1
           AND NOT EXISTS (
               SELECT 1
               FROM paper_authors other
               WHERE other.paper_id = pa.paper_id
                 AND other.author_id <> pa.author_id
           )
         ORDER BY pa.paper_id ASC;",
    )?;
    let paper_ids = stmt
        .query_map([author_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<PaperId>>>()?;
    Ok(paper_ids)
}

/// Builds the `WHERE` clause for `query` over alias `a`, with positional binds.
fn author_filter(query: &AuthorListQuery) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if let Some(name) = query.name.as_deref() {
        sql.push_str(" AND instr(fold_case(a.name), ?) > 0");
        bind_values.push(Value::Text(name.to_lowercase()));
    }

    if let Some(affiliation) = query.affiliation.as_deref() {
        sql.push_str(" AND instr(fold_case(a.affiliation), ?) > 0");
        bind_values.push(Value::Text(affiliation.to_lowercase()));
    }

    (sql, bind_values)
}
