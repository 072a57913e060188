mod record_repository;

pub use record_repository::SqliteRecordRepository;

use crate::error::{CoreError, Result};
use crate::models::{DocumentRecord, RecordId};

/// Storage seam for every reconciliation pass.
///
/// Implementations return records from [`RecordStore::list_all`] in
/// ascending id order, which is insertion order.
pub trait RecordStore {
    fn list_all(&self) -> Result<Vec<DocumentRecord>>;

    fn find(&self, id: RecordId) -> Result<Option<DocumentRecord>>;

    /// Insert a new row. The record's own id is ignored; the assigned one is returned.
    fn insert(&self, record: &DocumentRecord) -> Result<RecordId>;

    /// Write the record under its id, replacing any existing row.
    fn upsert(&self, record: &DocumentRecord) -> Result<()>;

    /// Overwrite only the relevance score and matched keywords of an existing row.
    fn set_relevance(&self, id: RecordId, score: f64, keywords_found: &[String]) -> Result<()>;

    fn delete(&self, id: RecordId) -> Result<bool>;

    fn find_by_doi(&self, doi: &str) -> Result<Vec<DocumentRecord>>;

    fn find_by_title(&self, title: &str) -> Result<Vec<DocumentRecord>>;

    fn count(&self) -> Result<usize>;

    fn get(&self, id: RecordId) -> Result<DocumentRecord> {
        self.find(id)?.ok_or(CoreError::RecordNotFound(id))
    }
}
