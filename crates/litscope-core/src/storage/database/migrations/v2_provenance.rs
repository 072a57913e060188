use rusqlite::Connection;

use super::Migration;
use crate::error::Result;

pub struct V2Provenance;

const COLUMNS: &[(&str, &str)] = &[
    ("file_size", "INTEGER"),
    ("source", "TEXT"),
    ("oa_status", "TEXT"),
    ("checksum_sha256", "TEXT"),
    ("mime_type", "TEXT"),
];

impl Migration for V2Provenance {
    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Add source, open-access and file provenance columns to documents table"
    }

    fn up(&self, conn: &Connection) -> Result<()> {
        for (name, sql_type) in COLUMNS {
            let has_column: bool = conn
                .prepare("SELECT 1 FROM pragma_table_info('documents') WHERE name = ?1")?
                .exists([name])?;

            if !has_column {
                conn.execute_batch(&format!(
                    "ALTER TABLE documents ADD COLUMN {name} {sql_type};"
                ))?;
            }
        }

        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_documents_source ON documents(source);",
        )?;
        Ok(())
    }
}
