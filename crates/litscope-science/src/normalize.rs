//! Canonical text forms for the fields duplicate detection compares on.
//!
//! Normalization is idempotent: a record that went through [`normalize`] once
//! reports `changed == false` the second time.

use litscope_core::{Database, DocumentRecord, RecordStore};
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub examined: usize,
    pub changed: usize,
    /// Records whose author list could not be parsed and was left as-is.
    pub malformed_authors: usize,
}

/// Collapse every whitespace run (spaces, tabs, newlines) to one space and trim the ends.
pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_doi(raw: &str) -> Option<String> {
    let doi = raw.trim().to_lowercase();
    (!doi.is_empty()).then_some(doi)
}

/// Trim only, so paragraph breaks inside an abstract survive.
fn normalize_abstract(raw: &str) -> Option<String> {
    let text = raw.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn normalize_text(raw: &str) -> Option<String> {
    let text = collapse_whitespace(raw);
    (!text.is_empty()).then_some(text)
}

/// Re-serialize an author list with each name whitespace-collapsed.
/// `None` when the value is not a JSON array.
fn normalize_authors(raw: &str) -> Option<String> {
    let entries: Vec<Value> = serde_json::from_str(raw).ok()?;
    let names: Vec<String> = entries
        .iter()
        .map(|entry| match entry {
            Value::String(name) => collapse_whitespace(name),
            other => collapse_whitespace(&other.to_string()),
        })
        .collect();
    serde_json::to_string(&names).ok()
}

fn replace_if_different(field: &mut Option<String>, normalized: Option<String>) -> bool {
    if *field != normalized {
        *field = normalized;
        true
    } else {
        false
    }
}

/// Normalize `record` in place. Returns whether any field changed.
pub fn normalize_record(record: &mut DocumentRecord) -> bool {
    let mut changed = false;

    if let Some(doi) = record.doi.as_deref() {
        let normalized = normalize_doi(doi);
        changed |= replace_if_different(&mut record.doi, normalized);
    }
    if let Some(title) = record.title.as_deref() {
        let normalized = normalize_text(title);
        changed |= replace_if_different(&mut record.title, normalized);
    }
    if let Some(abstract_text) = record.abstract_text.as_deref() {
        let normalized = normalize_abstract(abstract_text);
        changed |= replace_if_different(&mut record.abstract_text, normalized);
    }
    if let Some(venue) = record.venue.as_deref() {
        let normalized = normalize_text(venue);
        changed |= replace_if_different(&mut record.venue, normalized);
    }
    if let Some(authors) = record.authors.as_deref() {
        match normalize_authors(authors) {
            Some(normalized) => changed |= replace_if_different(&mut record.authors, Some(normalized)),
            None => {
                tracing::debug!(id = %record.id, "author list is not a JSON array, left untouched");
            }
        }
    }

    changed
}

/// Value-style wrapper around [`normalize_record`].
pub fn normalize(mut record: DocumentRecord) -> (DocumentRecord, bool) {
    let changed = normalize_record(&mut record);
    (record, changed)
}

/// Normalize every record in `store`, writing back only the ones that changed.
pub fn normalize_store<S: RecordStore + ?Sized>(store: &S) -> Result<NormalizeReport> {
    let mut report = NormalizeReport::default();

    for mut record in store.list_all()? {
        report.examined += 1;
        if record.authors.as_deref().is_some_and(|a| normalize_authors(a).is_none()) {
            report.malformed_authors += 1;
        }
        if normalize_record(&mut record) {
            store.upsert(&record)?;
            report.changed += 1;
        }
    }

    Ok(report)
}

/// Run [`normalize_store`] as one transaction.
pub fn normalize_database(db: &Database) -> Result<NormalizeReport> {
    let report = db.transaction(|store| normalize_store(store))?;
    tracing::info!(
        examined = report.examined,
        changed = report.changed,
        malformed_authors = report.malformed_authors,
        "normalization pass committed"
    );
    Ok(report)
}
