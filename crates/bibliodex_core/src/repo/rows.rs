//! Row-level SQL helpers shared by the resolver and both repositories.
//!
//! Every helper takes a plain `&Connection` so it composes into whatever
//! transaction the caller opened (`Transaction` derefs to `Connection`).

use crate::model::author::{Author, AuthorId, AuthorInput, AuthorSummary};
use crate::model::paper::{Paper, PaperId, PaperSummary};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

pub(crate) const AUTHOR_COLUMNS: &str = "a.id, a.name, a.email, a.affiliation";
pub(crate) const PAPER_COLUMNS: &str = "p.id, p.title, p.venue, p.year";

pub(crate) fn author_row(row: &Row<'_>) -> rusqlite::Result<AuthorSummary> {
    Ok(AuthorSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        affiliation: row.get(3)?,
    })
}

pub(crate) fn paper_row(row: &Row<'_>) -> rusqlite::Result<PaperSummary> {
    Ok(PaperSummary {
        id: row.get(0)?,
        title: row.get(1)?,
        venue: row.get(2)?,
        year: row.get(3)?,
    })
}

pub(crate) fn insert_author(conn: &Connection, input: &AuthorInput) -> RepoResult<AuthorId> {
    conn.execute(
        "INSERT INTO authors (name, email, affiliation) VALUES (?1, ?2, ?3);",
        params![
            input.name.as_str(),
            input.email.as_deref(),
            input.affiliation.as_deref(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Exact (name, email, affiliation) match with `NULL` matching only `NULL`.
/// Returns the earliest-created author when several rows match.
pub(crate) fn find_matching_author(
    conn: &Connection,
    input: &AuthorInput,
) -> RepoResult<Option<AuthorId>> {
    let id = conn
        .query_row(
            "SELECT id
             FROM authors
             WHERE name = ?1
               AND email IS ?2
               AND affiliation IS ?3
             ORDER BY id ASC
             LIMIT 1;",
            params![
                input.name.as_str(),
                input.email.as_deref(),
                input.affiliation.as_deref(),
            ],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id)
}

pub(crate) fn link_authors(
    conn: &Connection,
    paper_id: PaperId,
    author_ids: &[AuthorId],
) -> RepoResult<()> {
    let mut stmt =
        conn.prepare("INSERT INTO paper_authors (paper_id, author_id) VALUES (?1, ?2);")?;
    for author_id in author_ids {
        stmt.execute(params![paper_id, author_id])?;
    }
    Ok(())
}

pub(crate) fn paper_exists(conn: &Connection, paper_id: PaperId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM papers WHERE id = ?1);",
        [paper_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn author_exists(conn: &Connection, author_id: AuthorId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM authors WHERE id = ?1);",
        [author_id],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Loads one paper with its authors, or `NotFound`.
pub(crate) fn load_paper(conn: &Connection, paper_id: PaperId) -> RepoResult<Paper> {
    let summary = conn
        .query_row(
            &format!("SELECT {PAPER_COLUMNS} FROM papers p WHERE p.id = ?1;"),
            [paper_id],
            paper_row,
        )
        .optional()?
        .ok_or_else(|| RepoError::paper_not_found(paper_id))?;
    attach_authors(conn, summary)
}

/// Expands a paper summary into a read model. A paper without authors is
/// reported as invalid persisted state instead of being returned.
pub(crate) fn attach_authors(conn: &Connection, summary: PaperSummary) -> RepoResult<Paper> {
    let authors = load_paper_authors(conn, summary.id)?;
    if authors.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "paper {} has no linked authors",
            summary.id
        )));
    }

    Ok(Paper {
        id: summary.id,
        title: summary.title,
        venue: summary.venue,
        year: summary.year,
        authors,
    })
}

/// Loads one author with its papers, or `NotFound`.
pub(crate) fn load_author(conn: &Connection, author_id: AuthorId) -> RepoResult<Author> {
    let summary = conn
        .query_row(
            &format!("SELECT {AUTHOR_COLUMNS} FROM authors a WHERE a.id = ?1;"),
            [author_id],
            author_row,
        )
        .optional()?
        .ok_or_else(|| RepoError::author_not_found(author_id))?;
    attach_papers(conn, summary)
}

pub(crate) fn attach_papers(conn: &Connection, summary: AuthorSummary) -> RepoResult<Author> {
    let papers = load_author_papers(conn, summary.id)?;
    Ok(Author {
        id: summary.id,
        name: summary.name,
        email: summary.email,
        affiliation: summary.affiliation,
        papers,
    })
}

fn load_paper_authors(conn: &Connection, paper_id: PaperId) -> RepoResult<Vec<AuthorSummary>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {AUTHOR_COLUMNS}
         FROM paper_authors pa
         INNER JOIN authors a ON a.id = pa.author_id
         WHERE pa.paper_id = ?1
         ORDER BY a.id ASC;"
    ))?;
    let authors = stmt
        .query_map([paper_id], author_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(authors)
}

fn load_author_papers(conn: &Connection, author_id: AuthorId) -> RepoResult<Vec<PaperSummary>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PAPER_COLUMNS}
         FROM paper_authors pa
         INNER JOIN papers p ON p.id = pa.paper_id
         WHERE pa.author_id = ?1
         ORDER BY p.id ASC;"
    ))?;
    let papers = stmt
        .query_map([author_id], paper_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(papers)
}
