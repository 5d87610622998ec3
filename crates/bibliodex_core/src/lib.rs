//! Core persistence and consistency layer for the Bibliodex paper catalogue.
//! This crate is the single source of truth for catalogue invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{DbError, DbResult, Store, StoreConfig, StoreLocation};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::author::{Author, AuthorId, AuthorInput, AuthorSummary};
pub use model::paper::{Paper, PaperId, PaperInput, PaperSummary};
pub use model::validation::ValidationError;
pub use repo::author_repo::{AuthorListQuery, AuthorRepository, SqliteAuthorRepository};
pub use repo::author_resolver::{resolve_in_tx, AuthorResolver};
pub use repo::error::{EntityKind, ErrorKind, RepoError, RepoResult};
pub use repo::page::{Page, DEFAULT_LIMIT, MAX_LIMIT};
pub use repo::paper_repo::{PaperListQuery, PaperRepository, SqlitePaperRepository};
pub use repo::stats::{catalogue_stats, CatalogueStats};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
