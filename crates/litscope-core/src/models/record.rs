use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a document row. Ascending ids follow insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Lifecycle marker, owned by the fetch stage.
///
/// The set is open: a status string this crate does not know survives a
/// read/write cycle as [`DocStatus::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocStatus {
    #[default]
    NotFetched,
    MetadataOnly,
    Fetched,
    Failed,
    Other(String),
}

impl DocStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::NotFetched => "not_fetched",
            Self::MetadataOnly => "metadata_only",
            Self::Fetched => "fetched",
            Self::Failed => "failed",
            Self::Other(status) => status,
        }
    }

    /// How far along the fetch lifecycle a record is. Used when merging duplicates.
    /// Unknown statuses rank with `failed`: something happened, nothing usable is known.
    pub fn rank(&self) -> u8 {
        match self {
            Self::NotFetched => 0,
            Self::Failed | Self::Other(_) => 1,
            Self::MetadataOnly => 2,
            Self::Fetched => 3,
        }
    }
}

impl fmt::Display for DocStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for DocStatus {
    fn from(s: &str) -> Self {
        match s {
            "not_fetched" => Self::NotFetched,
            "metadata_only" => Self::MetadataOnly,
            "fetched" => Self::Fetched,
            "failed" => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for DocStatus {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<DocStatus> for String {
    fn from(status: DocStatus) -> Self {
        match status {
            DocStatus::Other(status) => status,
            known => known.as_str().to_string(),
        }
    }
}

impl std::str::FromStr for DocStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// One scholarly work (or candidate) as tracked by the store.
///
/// `authors` is kept in its serialized JSON form so that a malformed value
/// written by an upstream collaborator survives untouched; use
/// [`DocumentRecord::authors_list`] for a best-effort parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: RecordId,
    pub source_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authors: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,

    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,

    #[serde(default)]
    pub open_access: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oa_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_sha256: Option<String>,

    /// Fetch timestamp as written by the fetch stage. See [`DocumentRecord::fetched_time`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords_found: Option<Vec<String>>,

    #[serde(default)]
    pub status: DocStatus,
}

impl DocumentRecord {
    /// A fresh record. The id is assigned by the store on insert.
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Default::default()
        }
    }

    /// Parse the serialized author list. `None` when absent or malformed.
    pub fn authors_list(&self) -> Option<Vec<String>> {
        self.authors
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Vec<String>>(raw).ok())
    }

    pub fn set_authors<S: AsRef<str>>(&mut self, authors: &[S]) {
        let names: Vec<&str> = authors.iter().map(AsRef::as_ref).collect();
        self.authors = serde_json::to_string(&names).ok();
    }

    /// A DOI that is absent, empty or whitespace counts as "no DOI".
    pub fn has_doi(&self) -> bool {
        self.doi.as_deref().is_some_and(|doi| !doi.trim().is_empty())
    }

    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|title| !title.trim().is_empty())
    }

    /// Parse `fetched_at`. Accepts RFC 3339 and the naive
    /// `YYYY-MM-DD HH:MM:SS[.ffffff]` form, read as UTC.
    pub fn fetched_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.fetched_at.as_deref()?.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }
}
