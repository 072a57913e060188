use std::collections::{HashMap, HashSet};

use litscope_core::{Database, DedupConfig, DocumentRecord, RecordStore};
use serde::Serialize;

use super::merge::merge_into;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyOptions {
    /// Minimum Jaccard ratio between title token sets for a merge.
    pub threshold: f64,
    /// Leading characters of the normalized title that must match exactly.
    pub prefix_len: usize,
}

impl Default for FuzzyOptions {
    fn default() -> Self {
        Self::from(&DedupConfig::default())
    }
}

impl From<&DedupConfig> for FuzzyOptions {
    fn from(config: &DedupConfig) -> Self {
        Self {
            threshold: config.fuzzy_threshold,
            prefix_len: config.prefix_len,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FuzzyReport {
    pub buckets: usize,
    pub merged: usize,
}

/// Jaccard similarity of the whitespace-separated token sets. 0 when either side is empty.
pub fn token_overlap(a: &str, b: &str) -> f64 {
    let left: HashSet<&str> = a.split_whitespace().collect();
    let right: HashSet<&str> = b.split_whitespace().collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared = left.intersection(&right).count();
    let union = left.union(&right).count();
    shared as f64 / union as f64
}

fn comparison_key(record: &DocumentRecord) -> Option<String> {
    let key = record.title.as_deref()?.trim().to_lowercase();
    (!key.is_empty()).then_some(key)
}

fn bucket_prefix(key: &str, prefix_len: usize) -> String {
    key.chars().take(prefix_len).collect()
}

/// Merge near-duplicate titles that share a prefix bucket.
///
/// Titles differing inside the first `prefix_len` characters land in separate
/// buckets and are never compared.
pub fn resolve_fuzzy<S: RecordStore + ?Sized>(store: &S, options: FuzzyOptions) -> Result<FuzzyReport> {
    let mut records = store.list_all()?;
    let keys: Vec<Option<String>> = records.iter().map(comparison_key).collect();

    let mut slot_by_prefix: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<Vec<usize>> = Vec::new();
    for (idx, key) in keys.iter().enumerate() {
        let Some(key) = key else {
            continue;
        };
        let slot = *slot_by_prefix
            .entry(bucket_prefix(key, options.prefix_len))
            .or_insert_with(|| {
                buckets.push(Vec::new());
                buckets.len() - 1
            });
        buckets[slot].push(idx);
    }

    let mut report = FuzzyReport {
        buckets: buckets.len(),
        merged: 0,
    };

    for bucket in buckets {
        let mut remaining = bucket;
        while !remaining.is_empty() {
            let base_idx = remaining.remove(0);
            let base_key = keys[base_idx].as_deref().unwrap_or_default();

            let mut base = records[base_idx].clone();
            let mut unmatched = Vec::with_capacity(remaining.len());
            let mut merged_here = 0usize;

            for idx in remaining {
                let candidate_key = keys[idx].as_deref().unwrap_or_default();
                let ratio = token_overlap(base_key, candidate_key);
                if ratio >= options.threshold {
                    merge_into(&mut base, &records[idx]);
                    store.delete(records[idx].id)?;
                    tracing::debug!(
                        survivor = %base.id,
                        removed = %records[idx].id,
                        ratio,
                        "merged near-duplicate title"
                    );
                    merged_here += 1;
                } else {
                    unmatched.push(idx);
                }
            }

            if merged_here > 0 {
                store.upsert(&base)?;
                records[base_idx] = base;
                report.merged += merged_here;
            }
            remaining = unmatched;
        }
    }

    Ok(report)
}

/// Run [`resolve_fuzzy`] as one transaction.
pub fn resolve_fuzzy_database(db: &Database, options: FuzzyOptions) -> Result<FuzzyReport> {
    let report = db.transaction(|store| resolve_fuzzy(store, options))?;
    tracing::info!(
        buckets = report.buckets,
        merged = report.merged,
        threshold = options.threshold,
        "fuzzy duplicate pass committed"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(title: &str) -> DocumentRecord {
        DocumentRecord {
            title: Some(title.to_string()),
            ..DocumentRecord::new("")
        }
    }

    fn with_threshold(threshold: f64) -> FuzzyOptions {
        FuzzyOptions {
            threshold,
            ..FuzzyOptions::default()
        }
    }

    #[test]
    fn token_overlap_is_jaccard() {
        assert_eq!(token_overlap("a b c", "a b c"), 1.0);
        assert_eq!(token_overlap("a b", "b c"), 1.0 / 3.0);
        assert_eq!(token_overlap("", "a"), 0.0);
        assert_eq!(token_overlap("   ", "   "), 0.0);
        assert_eq!(token_overlap("a  a b", "b a"), 1.0);
    }

    #[test]
    fn bucket_prefix_counts_characters() {
        assert_eq!(bucket_prefix("béton armé", 5), "béton");
        assert_eq!(bucket_prefix("abc", 20), "abc");
    }

    #[test]
    fn merges_only_above_threshold() {
        let near = [
            "Chloride Ingress in Reinforced Concrete",
            "Chloride Ingress in Reinforced Concrete Slabs",
        ];

        let db = Database::open_in_memory().unwrap();
        for title in near {
            db.insert(&titled(title)).unwrap();
        }
        assert_eq!(resolve_fuzzy_database(&db, with_threshold(0.9)).unwrap().merged, 0);
        assert_eq!(db.count().unwrap(), 2);

        assert_eq!(resolve_fuzzy_database(&db, with_threshold(0.8)).unwrap().merged, 1);
        assert_eq!(db.count().unwrap(), 1);
    }

    #[test]
    fn titles_differing_early_are_never_compared() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&titled("Effects of Chloride Ingress on Rebar")).unwrap();
        db.insert(&titled("Effect of Chloride Ingress on Rebar")).unwrap();

        let report = resolve_fuzzy_database(&db, with_threshold(0.0)).unwrap();
        assert_eq!(report.buckets, 2);
        assert_eq!(report.merged, 0);
    }

    #[test]
    fn first_remaining_record_is_the_base() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert(&titled("Concrete Corrosion Study")).unwrap();
        let second = db
            .insert(&DocumentRecord {
                open_access: true,
                year: Some(2022),
                ..titled("concrete corrosion study ")
            })
            .unwrap();

        let report = resolve_fuzzy_database(&db, FuzzyOptions::default()).unwrap();
        assert_eq!(report.merged, 1);
        assert!(db.find(second).unwrap().is_none());

        let survivor = db.get(first).unwrap();
        assert!(survivor.open_access);
        assert_eq!(survivor.year, Some(2022));
    }

    #[test]
    fn each_bucket_keeps_one_survivor_per_title() {
        let db = Database::open_in_memory().unwrap();
        for title in [
            "Corrosion of steel in concrete",
            "Corrosion of steel reinforcement",
            "corrosion of steel in concrete",
            "Corrosion of steel reinforcement",
        ] {
            db.insert(&titled(title)).unwrap();
        }

        let report = resolve_fuzzy_database(&db, FuzzyOptions::default()).unwrap();
        assert_eq!(report.buckets, 2);
        assert_eq!(report.merged, 2);
        assert_eq!(db.count().unwrap(), 2);
    }

    #[test]
    fn untitled_records_are_ignored() {
        let db = Database::open_in_memory().unwrap();
        db.insert(&DocumentRecord::new("a")).unwrap();
        db.insert(&titled("")).unwrap();
        let report = resolve_fuzzy_database(&db, with_threshold(0.0)).unwrap();
        assert_eq!(report, FuzzyReport::default());
        assert_eq!(db.count().unwrap(), 2);
    }
}
