use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{CoreError, Result};
use crate::models::{DocStatus, DocumentRecord, RecordId};

use super::RecordStore;

const SELECT_COLUMNS: &str = "SELECT id, source_url, doi, title, authors, venue, year, file_type,
        open_access, abstract, local_path, keywords_found, relevance_score, status,
        fetched_at, license, file_size, source, oa_status, checksum_sha256, mime_type
     FROM documents";

/// `RecordStore` over a borrowed SQLite connection. Works the same inside or
/// outside an open transaction.
pub struct SqliteRecordRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteRecordRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<DocumentRecord> {
        let keywords_str: Option<String> = row.get(11)?;
        let status_str: String = row.get(13)?;

        Ok(DocumentRecord {
            id: RecordId::new(row.get(0)?),
            source_url: row.get(1)?,
            doi: row.get(2)?,
            title: row.get(3)?,
            authors: row.get(4)?,
            venue: row.get(5)?,
            year: row.get(6)?,
            file_type: row.get(7)?,
            open_access: row.get(8)?,
            abstract_text: row.get(9)?,
            local_path: row.get(10)?,
            keywords_found: keywords_str.and_then(|s| serde_json::from_str(&s).ok()),
            relevance_score: row.get(12)?,
            status: DocStatus::from(status_str),
            fetched_at: row.get(14)?,
            license: row.get(15)?,
            file_size: row.get(16)?,
            source: row.get(17)?,
            oa_status: row.get(18)?,
            checksum_sha256: row.get(19)?,
            mime_type: row.get(20)?,
        })
    }

    fn query_records(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<DocumentRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(args, Self::row_to_record)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn write(&self, verb: &str, id: Option<RecordId>, record: &DocumentRecord) -> Result<()> {
        let keywords_json = record
            .keywords_found
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            &format!(
                "{verb} INTO documents
                    (id, source_url, doi, title, authors, venue, year, file_type,
                     open_access, abstract, local_path, keywords_found, relevance_score,
                     status, fetched_at, license, file_size, source, oa_status,
                     checksum_sha256, mime_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                         ?15, ?16, ?17, ?18, ?19, ?20, ?21)"
            ),
            params![
                id.map(RecordId::get),
                record.source_url,
                record.doi,
                record.title,
                record.authors,
                record.venue,
                record.year,
                record.file_type,
                record.open_access,
                record.abstract_text,
                record.local_path,
                keywords_json,
                record.relevance_score,
                record.status.as_str(),
                record.fetched_at,
                record.license,
                record.file_size,
                record.source,
                record.oa_status,
                record.checksum_sha256,
                record.mime_type,
            ],
        )?;
        Ok(())
    }
}

impl<'a> RecordStore for SqliteRecordRepository<'a> {
    fn list_all(&self) -> Result<Vec<DocumentRecord>> {
        self.query_records(&format!("{SELECT_COLUMNS} ORDER BY id ASC"), [])
    }

    fn find(&self, id: RecordId) -> Result<Option<DocumentRecord>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_COLUMNS} WHERE id = ?1"))?;
        let record = stmt
            .query_row(params![id.get()], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    fn insert(&self, record: &DocumentRecord) -> Result<RecordId> {
        self.write("INSERT", None, record)?;
        Ok(RecordId::new(self.conn.last_insert_rowid()))
    }

    fn upsert(&self, record: &DocumentRecord) -> Result<()> {
        if record.id.get() <= 0 {
            return Err(CoreError::Validation(format!(
                "cannot upsert a record without an assigned id ({})",
                record.id
            )));
        }
        self.write("INSERT OR REPLACE", Some(record.id), record)
    }

    fn set_relevance(&self, id: RecordId, score: f64, keywords_found: &[String]) -> Result<()> {
        let keywords_json = serde_json::to_string(keywords_found)?;
        let updated = self.conn.execute(
            "UPDATE documents SET relevance_score = ?1, keywords_found = ?2 WHERE id = ?3",
            params![score, keywords_json, id.get()],
        )?;
        if updated == 0 {
            return Err(CoreError::RecordNotFound(id));
        }
        Ok(())
    }

    fn delete(&self, id: RecordId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM documents WHERE id = ?1", params![id.get()])?;
        Ok(deleted > 0)
    }

    fn find_by_doi(&self, doi: &str) -> Result<Vec<DocumentRecord>> {
        self.query_records(
            &format!("{SELECT_COLUMNS} WHERE doi = ?1 ORDER BY id ASC"),
            params![doi],
        )
    }

    fn find_by_title(&self, title: &str) -> Result<Vec<DocumentRecord>> {
        self.query_records(
            &format!("{SELECT_COLUMNS} WHERE title = ?1 ORDER BY id ASC"),
            params![title],
        )
    }

    fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}
