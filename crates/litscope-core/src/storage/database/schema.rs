use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: u32 = 2;

pub fn apply_pragmas(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        ",
    )?;
    Ok(())
}

/// Base `documents` table as first shipped. Later columns arrive through migrations.
pub fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS documents (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            source_url      TEXT NOT NULL DEFAULT '',
            doi             TEXT,
            title           TEXT,
            authors         TEXT,
            venue           TEXT,
            year            INTEGER,
            file_type       TEXT,
            open_access     INTEGER NOT NULL DEFAULT 0,
            abstract        TEXT,
            local_path      TEXT,
            keywords_found  TEXT,
            relevance_score REAL,
            status          TEXT NOT NULL DEFAULT 'not_fetched',
            fetched_at      TEXT,
            license         TEXT
        );
        ",
    )?;
    Ok(())
}

pub fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_documents_doi    ON documents(doi);
        CREATE INDEX IF NOT EXISTS idx_documents_title  ON documents(title);
        CREATE INDEX IF NOT EXISTS idx_documents_status ON documents(status);
        ",
    )?;
    Ok(())
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    create_tables(conn)?;
    create_indexes(conn)?;
    Ok(())
}
