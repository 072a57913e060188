//! Export of the scored, deduplicated record set.

pub mod csv;
pub mod jsonl;

use std::path::Path;

pub use litscope_core::SortOrder;
use litscope_core::{Database, DocumentRecord, ExportConfig, RecordStore};
use serde::Serialize;

use crate::error::{Result, ScienceError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jsonl,
    Csv,
}

impl ExportFormat {
    /// Pick the format from the file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "jsonl" => Ok(Self::Jsonl),
            "csv" => Ok(Self::Csv),
            _ => Err(ScienceError::UnsupportedFormat(format!(
                "cannot export to '{}', use .jsonl or .csv",
                path.display()
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExportOptions {
    /// Scored records below this are dropped. Unscored records are kept.
    pub min_score: f64,
    /// Records older than this are dropped. Records without a year are kept.
    pub year_min: Option<i32>,
    pub sort: SortOrder,
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            min_score: config.min_score,
            year_min: None,
            sort: config.sort,
        }
    }
}

/// One exported document, with a fixed column set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub id: i64,
    pub source_url: String,
    pub doi: Option<String>,
    pub title: Option<String>,
    pub authors: Option<String>,
    pub venue: Option<String>,
    pub year: Option<i32>,
    pub relevance_score: Option<f64>,
    pub keywords_found: Option<Vec<String>>,
    pub status: String,
    pub local_path: Option<String>,
    pub open_access: bool,
    pub license: Option<String>,
    pub file_size: Option<i64>,
}

pub const COLUMNS: [&str; 14] = [
    "id",
    "source_url",
    "doi",
    "title",
    "authors",
    "venue",
    "year",
    "relevance_score",
    "keywords_found",
    "status",
    "local_path",
    "open_access",
    "license",
    "file_size",
];

impl From<DocumentRecord> for ExportRow {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: record.id.get(),
            source_url: record.source_url,
            doi: record.doi,
            title: record.title,
            authors: record.authors,
            venue: record.venue,
            year: record.year,
            relevance_score: record.relevance_score,
            keywords_found: record.keywords_found,
            status: record.status.to_string(),
            local_path: record.local_path,
            open_access: record.open_access,
            license: record.license,
            file_size: record.file_size,
        }
    }
}

fn keep(record: &DocumentRecord, options: &ExportOptions) -> bool {
    if record
        .relevance_score
        .is_some_and(|score| score < options.min_score)
    {
        return false;
    }
    if let (Some(min), Some(year)) = (options.year_min, record.year)
        && year != 0
        && year < min
    {
        return false;
    }
    true
}

/// Filter and order records for export. Sorting is stable.
pub fn select_rows(records: Vec<DocumentRecord>, options: &ExportOptions) -> Vec<ExportRow> {
    let mut rows: Vec<ExportRow> = records
        .into_iter()
        .filter(|record| keep(record, options))
        .map(ExportRow::from)
        .collect();

    match options.sort {
        SortOrder::Relevance => rows.sort_by(|a, b| {
            let a = a.relevance_score.unwrap_or(0.0);
            let b = b.relevance_score.unwrap_or(0.0);
            b.total_cmp(&a)
        }),
        SortOrder::Year => rows.sort_by_key(|row| row.year.unwrap_or(0)),
    }
    rows
}

pub fn render(rows: &[ExportRow], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Jsonl => jsonl::render(rows),
        ExportFormat::Csv => csv::render(rows),
    }
}

/// Write the selected records to `path`, format chosen by extension.
/// Returns the number of rows written.
pub fn export_to_path(db: &Database, path: &Path, options: &ExportOptions) -> Result<usize> {
    let format = ExportFormat::from_path(path)?;
    let rows = select_rows(db.list_all()?, options);
    let body = render(&rows, format)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;

    tracing::info!(path = %path.display(), rows = rows.len(), "export written");
    Ok(rows.len())
}
