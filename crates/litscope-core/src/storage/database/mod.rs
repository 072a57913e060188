mod connection;
pub(crate) mod migrations;
pub(crate) mod schema;

pub use connection::ConnectionPool;
pub use migrations::{Migration, get_applied_versions, run_migrations};
pub use schema::{SCHEMA_VERSION, init_schema};

use std::path::Path;

use crate::error::{CoreError, Result};
use crate::models::{DocumentRecord, RecordId, StoreStats};

use super::queries::StoreStatsQuery;
use super::repositories::{RecordStore, SqliteRecordRepository};
use super::session::StoreSession;

pub fn open_database(path: &Path) -> Result<ConnectionPool> {
    let pool = ConnectionPool::open(path)?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

pub fn open_in_memory() -> Result<ConnectionPool> {
    let pool = ConnectionPool::open_in_memory()?;
    {
        let conn = pool.get_connection();
        migrations::run_migrations(&conn)?;
    }
    Ok(pool)
}

/// The document store. Plain [`RecordStore`] calls autocommit; use
/// [`Database::transaction`] or [`Database::begin`] for all-or-nothing passes.
pub struct Database {
    pool: ConnectionPool,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let pool = open_database(path)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> Result<Self> {
        let pool = open_in_memory()?;
        Ok(Self { pool })
    }

    pub fn path(&self) -> Option<&str> {
        self.pool.path()
    }

    /// Apply pending migrations. Returns how many ran.
    pub fn migrate(&self) -> Result<usize> {
        let conn = self.pool.get_connection();
        migrations::run_migrations(&conn)
    }

    pub fn schema_version(&self) -> Result<u32> {
        let conn = self.pool.get_connection();
        let versions = migrations::get_applied_versions(&conn)?;
        Ok(versions.last().copied().unwrap_or(0))
    }

    /// Open a write transaction. Must not be called while another session
    /// from the same `Database` is alive on this thread.
    pub fn begin(&self) -> Result<StoreSession<'_>> {
        StoreSession::begin(self.pool.get_connection())
    }

    /// Run `f` inside one transaction: commit on `Ok`, roll back on `Err`.
    pub fn transaction<T, E, F>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&StoreSession<'_>) -> std::result::Result<T, E>,
        E: From<CoreError>,
    {
        let session = self.begin()?;
        match f(&session) {
            Ok(value) => {
                session.commit()?;
                Ok(value)
            }
            Err(err) => {
                tracing::warn!("pass failed, rolling back");
                if let Err(rollback_err) = session.rollback() {
                    tracing::warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.pool.get_connection();
        StoreStatsQuery::new(&conn).get_stats()
    }

    fn with_repo<T>(&self, f: impl FnOnce(&SqliteRecordRepository<'_>) -> Result<T>) -> Result<T> {
        let conn = self.pool.get_connection();
        let repo = SqliteRecordRepository::new(&conn);
        f(&repo)
    }
}

impl RecordStore for Database {
    fn list_all(&self) -> Result<Vec<DocumentRecord>> {
        self.with_repo(|repo| repo.list_all())
    }

    fn find(&self, id: RecordId) -> Result<Option<DocumentRecord>> {
        self.with_repo(|repo| repo.find(id))
    }

    fn insert(&self, record: &DocumentRecord) -> Result<RecordId> {
        self.with_repo(|repo| repo.insert(record))
    }

    fn upsert(&self, record: &DocumentRecord) -> Result<()> {
        self.with_repo(|repo| repo.upsert(record))
    }

    fn set_relevance(&self, id: RecordId, score: f64, keywords_found: &[String]) -> Result<()> {
        self.with_repo(|repo| repo.set_relevance(id, score, keywords_found))
    }

    fn delete(&self, id: RecordId) -> Result<bool> {
        self.with_repo(|repo| repo.delete(id))
    }

    fn find_by_doi(&self, doi: &str) -> Result<Vec<DocumentRecord>> {
        self.with_repo(|repo| repo.find_by_doi(doi))
    }

    fn find_by_title(&self, title: &str) -> Result<Vec<DocumentRecord>> {
        self.with_repo(|repo| repo.find_by_title(title))
    }

    fn count(&self) -> Result<usize> {
        self.with_repo(|repo| repo.count())
    }
}
