use serde::Serialize;

use super::{COLUMNS, ExportRow};
use crate::error::{Result, ScienceError};

/// Flat view of an [`ExportRow`]: CSV cells cannot hold sequences, so the
/// matched keywords travel as JSON text.
#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    source_url: &'a str,
    doi: Option<&'a str>,
    title: Option<&'a str>,
    authors: Option<&'a str>,
    venue: Option<&'a str>,
    year: Option<i32>,
    relevance_score: Option<f64>,
    keywords_found: Option<String>,
    status: &'a str,
    local_path: Option<&'a str>,
    open_access: bool,
    license: Option<&'a str>,
    file_size: Option<i64>,
}

impl<'a> CsvRow<'a> {
    fn new(row: &'a ExportRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            source_url: &row.source_url,
            doi: row.doi.as_deref(),
            title: row.title.as_deref(),
            authors: row.authors.as_deref(),
            venue: row.venue.as_deref(),
            year: row.year,
            relevance_score: row.relevance_score,
            keywords_found: row
                .keywords_found
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            status: &row.status,
            local_path: row.local_path.as_deref(),
            open_access: row.open_access,
            license: row.license.as_deref(),
            file_size: row.file_size,
        })
    }
}

/// Header row plus one line per record, RFC 4180 quoting, CRLF line ends.
/// The header is written even when there are no rows.
pub fn render(rows: &[ExportRow]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::CRLF)
        .from_writer(Vec::new());

    wtr.write_record(COLUMNS)?;
    for row in rows {
        wtr.serialize(CsvRow::new(row)?)?;
    }

    let bytes = wtr.into_inner().map_err(|e| ScienceError::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ScienceError::Parse(format!("CSV output is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use litscope_core::DocumentRecord;

    use super::*;

    #[test]
    fn renders_header_and_rows() {
        let mut record = DocumentRecord {
            title: Some("Corrosion, revisited".to_string()),
            year: Some(2020),
            relevance_score: Some(0.5),
            open_access: true,
            ..DocumentRecord::new("https://a")
        };
        record.set_authors(&["Ada Lovelace"]);
        let out = render(&[ExportRow::from(record)]).unwrap();

        let lines: Vec<&str> = out.split("\r\n").collect();
        assert_eq!(lines[0], COLUMNS.join(","));
        assert_eq!(
            lines[1],
            "0,https://a,,\"Corrosion, revisited\",\"[\"\"Ada Lovelace\"\"]\",,2020,0.5,,not_fetched,,true,,"
        );
        assert_eq!(lines[2], "");
    }

    #[test]
    fn quotes_embedded_newlines_and_keywords() {
        let record = DocumentRecord {
            title: Some("two\nlines".to_string()),
            keywords_found: Some(vec!["rebar".to_string()]),
            ..DocumentRecord::new("https://b")
        };
        let out = render(&[ExportRow::from(record)]).unwrap();

        let mut reader = csv::ReaderBuilder::new().from_reader(out.as_bytes());
        assert_eq!(reader.headers().unwrap(), COLUMNS.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][3], "two\nlines");
        assert_eq!(&rows[0][8], "[\"rebar\"]");
        assert_eq!(&rows[0][11], "false");
    }

    #[test]
    fn empty_export_still_has_header() {
        assert_eq!(render(&[]).unwrap(), format!("{}\r\n", COLUMNS.join(",")));
    }
}
