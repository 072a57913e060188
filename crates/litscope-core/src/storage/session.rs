use std::sync::MutexGuard;

use rusqlite::Connection;

use crate::error::Result;
use crate::models::{DocumentRecord, RecordId};

use super::repositories::{RecordStore, SqliteRecordRepository};

/// An open write transaction over the record store.
///
/// Holds the connection lock for its whole lifetime. Dropping a session
/// that was neither committed nor rolled back rolls it back.
pub struct StoreSession<'a> {
    conn: MutexGuard<'a, Connection>,
    finished: bool,
}

impl<'a> StoreSession<'a> {
    pub(crate) fn begin(conn: MutexGuard<'a, Connection>) -> Result<Self> {
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Self {
            conn,
            finished: false,
        })
    }

    pub fn commit(mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT")?;
        self.finished = true;
        Ok(())
    }

    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.conn.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn repo(&self) -> SqliteRecordRepository<'_> {
        SqliteRecordRepository::new(&self.conn)
    }
}

impl Drop for StoreSession<'_> {
    fn drop(&mut self) {
        if !self.finished
            && let Err(e) = self.conn.execute_batch("ROLLBACK")
        {
            tracing::warn!(error = %e, "rollback of abandoned session failed");
        }
    }
}

impl RecordStore for StoreSession<'_> {
    fn list_all(&self) -> Result<Vec<DocumentRecord>> {
        self.repo().list_all()
    }

    fn find(&self, id: RecordId) -> Result<Option<DocumentRecord>> {
        self.repo().find(id)
    }

    fn insert(&self, record: &DocumentRecord) -> Result<RecordId> {
        self.repo().insert(record)
    }

    fn upsert(&self, record: &DocumentRecord) -> Result<()> {
        self.repo().upsert(record)
    }

    fn set_relevance(&self, id: RecordId, score: f64, keywords_found: &[String]) -> Result<()> {
        self.repo().set_relevance(id, score, keywords_found)
    }

    fn delete(&self, id: RecordId) -> Result<bool> {
        self.repo().delete(id)
    }

    fn find_by_doi(&self, doi: &str) -> Result<Vec<DocumentRecord>> {
        self.repo().find_by_doi(doi)
    }

    fn find_by_title(&self, title: &str) -> Result<Vec<DocumentRecord>> {
        self.repo().find_by_title(title)
    }

    fn count(&self) -> Result<usize> {
        self.repo().count()
    }
}
