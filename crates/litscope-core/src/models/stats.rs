use serde::{Deserialize, Serialize};

/// Aggregate counts over the record store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total: usize,
    pub with_doi: usize,
    pub with_abstract: usize,
    pub open_access: usize,
    pub scored: usize,
    pub fetched: usize,
    /// `(source tag, count)`, most frequent first. Untagged rows are reported as `"unknown"`.
    pub by_source: Vec<(String, usize)>,
}
