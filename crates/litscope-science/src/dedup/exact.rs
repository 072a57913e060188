use std::collections::HashMap;
use std::hash::Hash;

use litscope_core::{Database, DocumentRecord, RecordStore};
use serde::Serialize;

use super::merge::merge_into;
use super::quality::choose_survivor;
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExactReport {
    /// Clusters collapsed because their members share a DOI.
    pub merged_by_doi: usize,
    /// Clusters of DOI-less records collapsed by case-insensitive title.
    pub merged_by_title: usize,
    /// Records removed across both groupings.
    pub deleted: usize,
}

/// Group record positions by key, keeping only clusters of two or more.
/// Clusters come out in order of their first member; members keep record order.
fn clusters_by<K, F>(records: &[DocumentRecord], alive: &[bool], key_of: F) -> Vec<Vec<usize>>
where
    K: Eq + Hash,
    F: Fn(&DocumentRecord) -> Option<K>,
{
    let mut slot_by_key: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        if !alive[idx] {
            continue;
        }
        let Some(key) = key_of(record) else {
            continue;
        };
        let slot = *slot_by_key.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(idx);
    }

    groups.retain(|members| members.len() > 1);
    groups
}

/// Merge every member of `cluster` into its best-quality record and delete the rest.
/// Returns how many records were deleted.
fn collapse_cluster<S: RecordStore + ?Sized>(
    store: &S,
    records: &mut [DocumentRecord],
    alive: &mut [bool],
    cluster: &[usize],
) -> Result<usize> {
    let members: Vec<&DocumentRecord> = cluster.iter().map(|&idx| &records[idx]).collect();
    let keep_idx = cluster[choose_survivor(&members)];

    let mut keep = records[keep_idx].clone();
    for &idx in cluster {
        if idx != keep_idx {
            merge_into(&mut keep, &records[idx]);
        }
    }
    store.upsert(&keep)?;

    let mut deleted = 0;
    for &idx in cluster {
        if idx != keep_idx {
            store.delete(records[idx].id)?;
            alive[idx] = false;
            deleted += 1;
        }
    }

    tracing::debug!(survivor = %keep.id, deleted, "collapsed duplicate cluster");
    records[keep_idx] = keep;
    Ok(deleted)
}

/// Collapse records that share a DOI, then DOI-less records that share a
/// title ignoring case. DOIs are compared exactly as stored.
pub fn resolve_exact<S: RecordStore + ?Sized>(store: &S) -> Result<ExactReport> {
    let mut records = store.list_all()?;
    let mut alive = vec![true; records.len()];
    let mut report = ExactReport::default();

    let doi_clusters = clusters_by(&records, &alive, |record| {
        record.has_doi().then(|| record.doi.clone()).flatten()
    });
    for cluster in &doi_clusters {
        report.deleted += collapse_cluster(store, &mut records, &mut alive, cluster)?;
        report.merged_by_doi += 1;
    }

    let title_clusters = clusters_by(&records, &alive, |record| {
        if record.has_doi() || !record.has_title() {
            return None;
        }
        record.title.as_deref().map(str::to_lowercase)
    });
    for cluster in &title_clusters {
        report.deleted += collapse_cluster(store, &mut records, &mut alive, cluster)?;
        report.merged_by_title += 1;
    }

    Ok(report)
}

/// Run [`resolve_exact`] as one transaction.
pub fn resolve_exact_database(db: &Database) -> Result<ExactReport> {
    let report = db.transaction(|store| resolve_exact(store))?;
    tracing::info!(
        merged_by_doi = report.merged_by_doi,
        merged_by_title = report.merged_by_title,
        deleted = report.deleted,
        "exact duplicate pass committed"
    );
    Ok(report)
}
