//! Mapping of already-fetched source payloads onto [`DocumentRecord`]s.
//!
//! Fetching itself happens elsewhere; these parsers only understand the
//! response shapes.

pub mod arxiv;
pub mod crossref;
pub mod openalex;

use std::fmt;
use std::str::FromStr;

use litscope_core::DocumentRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ScienceError};
use crate::normalize::collapse_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    OpenAlex,
    Crossref,
    Arxiv,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OpenAlex => openalex::SOURCE_TAG,
            Self::Crossref => crossref::SOURCE_TAG,
            Self::Arxiv => arxiv::SOURCE_TAG,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ScienceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openalex" => Ok(Self::OpenAlex),
            "crossref" => Ok(Self::Crossref),
            "arxiv" => Ok(Self::Arxiv),
            other => Err(ScienceError::UnsupportedFormat(format!("unknown source '{other}'"))),
        }
    }
}

/// Parse a payload from `kind` into records.
///
/// JSON sources accept a bare array, a JSONL stream, a single work object, or
/// the API envelope (`results` for OpenAlex, `message.items` for Crossref).
pub fn parse_payload(kind: SourceKind, payload: &str) -> Result<Vec<DocumentRecord>> {
    let records = match kind {
        SourceKind::Arxiv => arxiv::parse_atom_feed(payload)?,
        SourceKind::OpenAlex => json_items(payload)?
            .iter()
            .filter_map(openalex::record_from_work)
            .collect(),
        SourceKind::Crossref => json_items(payload)?
            .iter()
            .filter_map(crossref::record_from_work)
            .collect(),
    };
    tracing::debug!(source = %kind, records = records.len(), "parsed source payload");
    Ok(records)
}

fn json_items(payload: &str) -> Result<Vec<Value>> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Ok(unwrap_envelope(value)),
        Err(_) => parse_json_lines(trimmed),
    }
}

fn unwrap_envelope(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            if let Some(Value::Array(items)) = map.remove("results") {
                return items;
            }
            match map.remove("message") {
                Some(Value::Object(mut message)) => match message.remove("items") {
                    Some(Value::Array(items)) => items,
                    _ => vec![Value::Object(message)],
                },
                Some(other) => {
                    map.insert("message".to_string(), other);
                    vec![Value::Object(map)]
                }
                None => vec![Value::Object(map)],
            }
        }
        other => vec![other],
    }
}

fn parse_json_lines(payload: &str) -> Result<Vec<Value>> {
    payload
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str(line)
                .map_err(|e| ScienceError::Parse(format!("line {}: {e}", idx + 1)))
        })
        .collect()
}

pub(crate) fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

pub(crate) fn clean_optional(value: Option<&str>) -> Option<String> {
    value.map(collapse_whitespace).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_kind_parses_case_insensitively() {
        assert_eq!("OpenAlex".parse::<SourceKind>().unwrap(), SourceKind::OpenAlex);
        assert_eq!(" crossref ".parse::<SourceKind>().unwrap(), SourceKind::Crossref);
        assert_eq!(SourceKind::Arxiv.to_string(), "arxiv");
        assert!("scopus".parse::<SourceKind>().is_err());
    }

    #[test]
    fn accepts_openalex_envelope_and_bare_array() {
        let envelope = r#"{"meta": {"count": 2}, "results": [{"title": "A"}, {"title": "B"}]}"#;
        assert_eq!(parse_payload(SourceKind::OpenAlex, envelope).unwrap().len(), 2);

        let array = r#"[{"title": "A"}, 7, {"title": "B"}]"#;
        assert_eq!(parse_payload(SourceKind::OpenAlex, array).unwrap().len(), 2);
    }

    #[test]
    fn accepts_crossref_envelope_and_single_work() {
        let envelope = r#"{"status": "ok", "message": {"items": [{"DOI": "10.1/a"}]}}"#;
        let records = parse_payload(SourceKind::Crossref, envelope).unwrap();
        assert_eq!(records[0].doi.as_deref(), Some("10.1/a"));

        let single = r#"{"status": "ok", "message": {"DOI": "10.1/b", "title": ["One"]}}"#;
        let records = parse_payload(SourceKind::Crossref, single).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title.as_deref(), Some("One"));
    }

    #[test]
    fn accepts_json_lines() {
        let jsonl = "{\"title\": \"A\"}\n\n{\"title\": \"B\"}\n";
        let records = parse_payload(SourceKind::OpenAlex, jsonl).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].title.as_deref(), Some("B"));
    }

    #[test]
    fn reports_bad_json_line() {
        let err = parse_payload(SourceKind::OpenAlex, "{\"title\": \"A\"}\n{oops\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn empty_payload_has_no_records() {
        assert!(parse_payload(SourceKind::Crossref, "  \n").unwrap().is_empty());
    }
}
