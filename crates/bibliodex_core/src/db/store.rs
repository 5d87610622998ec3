//! Shared entity store handle over a SQLite connection pool.
//!
//! # Responsibility
//! - Own the connection pool every repository and resolver is built from.
//! - Run repository work as explicit read or write transactions.
//! - Retry writer conflicts instead of surfacing them to callers.
//!
//! # Invariants
//! - Write units run under `BEGIN IMMEDIATE`, so at most one write unit holds
//!   the database at a time across all pooled connections.
//! - A unit that returns `Err` is rolled back; nothing it wrote is visible.
//! - In-memory stores use exactly one pooled connection that is never recycled,
//!   since every SQLite in-memory connection is its own database.

use super::migrations::apply_migrations;
use super::open::{configure_connection, open_db, DEFAULT_BUSY_TIMEOUT};
use super::{DbError, DbResult};
use log::{error, info, warn};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Transaction, TransactionBehavior};
use std::path::PathBuf;
use std::time::{Duration, Instant};

const DEFAULT_MAX_CONNECTIONS: u32 = 8;
const DEFAULT_MAX_CONFLICT_RETRIES: u32 = 5;
const CONFLICT_BACKOFF: Duration = Duration::from_millis(20);

/// Where the catalogue database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file, created on first open.
    File(PathBuf),
    /// Private in-memory database, discarded when the store is dropped.
    Memory,
}

/// Store bootstrap options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// Pool size for file databases. Ignored for memory stores.
    pub max_connections: u32,
    /// How long one statement waits on a locked database before failing busy.
    pub busy_timeout: Duration,
    /// Extra attempts for a write unit that failed with a busy/locked conflict.
    pub max_conflict_retries: u32,
}

impl StoreConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            ..Self::default()
        }
    }

    pub fn memory() -> Self {
        Self::default()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            location: StoreLocation::Memory,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            max_conflict_retries: DEFAULT_MAX_CONFLICT_RETRIES,
        }
    }
}

/// Errors that can tell a retryable writer conflict apart from other failures.
pub trait RetryableError: From<DbError> {
    fn is_conflict(&self) -> bool;
}

impl RetryableError for DbError {
    fn is_conflict(&self) -> bool {
        DbError::is_conflict(self)
    }
}

/// Cloneable, thread-safe handle to the catalogue database.
#[derive(Debug, Clone)]
pub struct Store {
    pool: Pool<SqliteConnectionManager>,
    max_conflict_retries: u32,
}

impl Store {
    /// Opens (and migrates) the store described by `config`.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        let started_at = Instant::now();
        let busy_timeout = config.busy_timeout;

        let (manager, builder, mode) = match &config.location {
            StoreLocation::File(path) => {
                // Schema and journal mode are persisted in the file, so one
                // bootstrap connection settles them before the pool exists.
                let conn = open_db(path)?;
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                drop(conn);

                let manager = SqliteConnectionManager::file(path);
                let builder = Pool::<SqliteConnectionManager>::builder()
                    .max_size(config.max_connections.max(1));
                (manager, builder, "file")
            }
            StoreLocation::Memory => {
                let manager = SqliteConnectionManager::memory();
                let builder = Pool::<SqliteConnectionManager>::builder()
                    .max_size(1)
                    .min_idle(Some(1))
                    .max_lifetime(None)
                    .idle_timeout(None);
                (manager, builder, "memory")
            }
        };

        let manager = manager.with_init(move |conn| configure_connection(conn, busy_timeout));
        let pool = builder.build(manager)?;

        if config.location == StoreLocation::Memory {
            let mut conn = pool.get()?;
            apply_migrations(&mut conn)?;
        }

        info!(
            "event=store_open module=db status=ok mode={} max_connections={} duration_ms={}",
            mode,
            pool.max_size(),
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            pool,
            max_conflict_retries: config.max_conflict_retries,
        })
    }

    /// Opens a private in-memory store with default settings.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(&StoreConfig::memory())
    }

    /// Opens a file-backed store with default settings.
    pub fn open_file(path: impl Into<PathBuf>) -> DbResult<Self> {
        Self::open(&StoreConfig::file(path))
    }

    /// Runs `unit` inside an immediate (writer-exclusive) transaction.
    ///
    /// `unit` may run more than once when a busy/locked conflict forces a
    /// retry, so it must not have side effects outside the transaction.
    pub fn write<T, E>(
        &self,
        operation: &str,
        mut unit: impl FnMut(&Transaction<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: RetryableError,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.try_write(&mut unit) {
                Err(err) if err.is_conflict() && attempt <= self.max_conflict_retries => {
                    warn!(
                        "event=store_write module=db status=retry operation={} attempt={}",
                        operation, attempt
                    );
                    std::thread::sleep(CONFLICT_BACKOFF * attempt);
                }
                Err(err) if err.is_conflict() => {
                    error!(
                        "event=store_write module=db status=error operation={} attempts={} error_code=conflict_retries_exhausted",
                        operation, attempt
                    );
                    return Err(DbError::ConflictRetriesExhausted { attempts: attempt }.into());
                }
                other => return other,
            }
        }
    }

    /// Runs `unit` inside a deferred transaction so multi-statement reads
    /// observe one snapshot.
    pub fn read<T, E>(&self, unit: impl FnOnce(&Transaction<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let mut conn = self.pool.get().map_err(DbError::from)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(DbError::from)?;
        let value = unit(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }

    fn try_write<T, E>(
        &self,
        unit: &mut impl FnMut(&Transaction<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<DbError>,
    {
        let mut conn = self.pool.get().map_err(DbError::from)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(DbError::from)?;
        let value = unit(&tx)?;
        tx.commit().map_err(DbError::from)?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{Store, StoreConfig, StoreLocation};
    use crate::db::migrations::latest_version;
    use crate::db::DbError;

    #[test]
    fn memory_store_keeps_schema_across_units() {
        let store = Store::open_in_memory().unwrap();
        store
            .write("seed", |tx| {
                tx.execute("INSERT INTO authors (name) VALUES ('Ada');", [])
                    .map_err(DbError::from)?;
                Ok::<_, DbError>(())
            })
            .unwrap();

        let (version, count) = store
            .read(|tx| {
                let version: u32 = tx.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
                let count: i64 = tx.query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))?;
                Ok::<_, DbError>((version, count))
            })
            .unwrap();
        assert_eq!(version, latest_version());
        assert_eq!(count, 1);
    }

    #[test]
    fn failed_write_unit_is_rolled_back() {
        let store = Store::open_in_memory().unwrap();
        let result = store.write("failing", |tx| {
            tx.execute("INSERT INTO authors (name) VALUES ('Grace');", [])
                .map_err(DbError::from)?;
            Err::<(), _>(DbError::ConflictRetriesExhausted { attempts: 0 })
        });
        assert!(result.is_err());

        let count: i64 = store
            .read(|tx| {
                tx.query_row("SELECT COUNT(*) FROM authors;", [], |row| row.get(0))
                    .map_err(DbError::from)
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn file_config_defaults() {
        let config = StoreConfig::file("/tmp/catalogue.db");
        assert_eq!(
            config.location,
            StoreLocation::File("/tmp/catalogue.db".into())
        );
        assert_eq!(config.max_connections, 8);
        assert_eq!(config.max_conflict_retries, 5);
    }
}
