//! Repository error taxonomy.
//!
//! # Responsibility
//! - Carry semantic failures (`InvalidArgument`, `NotFound`, `Constraint`)
//!   alongside storage transport failures.
//! - Collapse every failure into the four-value `ErrorKind` the transport
//!   collaborator maps to responses.

use crate::db::RetryableError;
use crate::db::DbError;
use crate::model::author::AuthorId;
use crate::model::paper::PaperId;
use crate::model::validation::ValidationError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Catalogue entity addressed by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Paper,
    Author,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Paper => write!(f, "paper"),
            Self::Author => write!(f, "author"),
        }
    }
}

/// Coarse error class exposed to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    Constraint,
    Internal,
}

/// Generic repository error for catalogue persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    InvalidArgument(ValidationError),
    NotFound { entity: EntityKind, id: i64 },
    /// Deleting `author_id` would leave `paper_ids` without any author.
    Constraint {
        author_id: AuthorId,
        paper_ids: Vec<PaperId>,
    },
    Db(DbError),
    InvalidData(String),
}

impl RepoError {
    pub fn paper_not_found(id: PaperId) -> Self {
        Self::NotFound {
            entity: EntityKind::Paper,
            id,
        }
    }

    pub fn author_not_found(id: AuthorId) -> Self {
        Self::NotFound {
            entity: EntityKind::Author,
            id,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Constraint { .. } => ErrorKind::Constraint,
            Self::Db(_) | Self::InvalidData(_) => ErrorKind::Internal,
        }
    }

    /// Stable snake_case code used in log lines.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidArgument => "invalid_argument",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Constraint => "constraint",
            ErrorKind::Internal => "internal",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(err) => write!(f, "invalid argument: {err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Constraint {
                author_id,
                paper_ids,
            } => write!(
                f,
                "cannot delete author {author_id}: they are the only author of papers {paper_ids:?}"
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted catalogue data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound { .. } | Self::Constraint { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidArgument(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RetryableError for RepoError {
    fn is_conflict(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_conflict())
    }
}

/// Emits the `event=<event> module=repo` line for one mutating operation.
///
/// Caller-side rejections log at `warn`, storage failures at `error`. Only ids
/// and error codes are logged, never titles, names or emails.
pub(crate) fn log_outcome<T>(
    event: &str,
    id: Option<i64>,
    started_at: Instant,
    result: &RepoResult<T>,
) {
    let id = id.map_or_else(|| "none".to_string(), |value| value.to_string());
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!(
            "event={} module=repo status=ok id={} duration_ms={}",
            event, id, duration_ms
        ),
        Err(err) if err.kind() == ErrorKind::Internal => error!(
            "event={} module=repo status=error id={} duration_ms={} error_code={} error={}",
            event,
            id,
            duration_ms,
            err.code(),
            err
        ),
        Err(err) => warn!(
            "event={} module=repo status=rejected id={} duration_ms={} error_code={}",
            event,
            id,
            duration_ms,
            err.code()
        ),
    }
}
