use std::path::Path;

use litscope_core::{Database, DocumentRecord, RecordStore};
use serde::Serialize;

use crate::error::Result;
use crate::sources::{SourceKind, parse_payload};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub inserted: usize,
    pub skipped: usize,
}

fn already_stored<S: RecordStore + ?Sized>(store: &S, record: &DocumentRecord) -> Result<bool> {
    if record.has_doi()
        && let Some(doi) = record.doi.as_deref()
    {
        return Ok(!store.find_by_doi(doi)?.is_empty());
    }
    match record.title.as_deref() {
        Some(title) if record.has_title() => Ok(!store.find_by_title(title)?.is_empty()),
        _ => Ok(false),
    }
}

/// Insert `records`, skipping any whose DOI (or, without a DOI, exact title)
/// is already in the store. Records earlier in the batch count as stored.
pub fn import_records<S: RecordStore + ?Sized>(
    store: &S,
    records: &[DocumentRecord],
) -> Result<ImportReport> {
    let mut report = ImportReport::default();
    for record in records {
        if already_stored(store, record)? {
            report.skipped += 1;
            continue;
        }
        store.insert(record)?;
        report.inserted += 1;
    }
    Ok(report)
}

/// Run [`import_records`] as one transaction.
pub fn import_into_database(db: &Database, records: &[DocumentRecord]) -> Result<ImportReport> {
    let report = db.transaction(|store| import_records(store, records))?;
    tracing::info!(
        inserted = report.inserted,
        skipped = report.skipped,
        "import committed"
    );
    Ok(report)
}

/// Parse a saved payload from `kind` and import it.
pub fn import_file(db: &Database, kind: SourceKind, path: &Path) -> Result<ImportReport> {
    let payload = std::fs::read_to_string(path)?;
    let records = parse_payload(kind, &payload)?;
    tracing::debug!(path = %path.display(), source = %kind, records = records.len(), "importing payload");
    import_into_database(db, &records)
}
