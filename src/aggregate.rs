//! Per-author metrics.
//!
//! Filtered records are grouped by author name and each group is reduced to
//! an [`AuthorMetrics`]. Co-authorship is derived from publication identity:
//! two authors are co-authors iff they share at least one publication among
//! the filtered records.

use crate::filter::Filter;
use crate::record::{Column, Record};
use crate::store::{group_records, RecordStore};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Derived metrics for one author, rebuilt on every query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorMetrics {
    pub paper_count: usize,
    pub citation_count: u64,
    pub influential_citation_count: u64,
    pub self_citation_count: u64,
    /// Median of per-paper self-citation percentages
    pub self_citation_rate: f64,
    pub co_author_count: usize,
    pub h_index: usize,
    pub open_access_count: usize,
    pub retraction_count: usize,
}

/// Largest `h` such that `h` papers have at least `h` citations each.
pub fn h_index(citations: &[u64]) -> usize {
    let mut sorted = citations.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted
        .iter()
        .enumerate()
        .take_while(|&(i, &c)| c > i as u64)
        .count()
}

/// Median of `values`; the mean of the two middle values for even lengths.
///
/// Returns `None` for an empty slice. NaNs sort last.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Compute metrics for every author with at least one record passing `filter`.
pub fn compute_author_metrics(
    store: &RecordStore,
    filter: Option<&Filter>,
) -> HashMap<String, AuthorMetrics> {
    let records = store.filtered(filter);
    let metrics = metrics_for_records(&records);
    debug!(
        records = records.len(),
        authors = metrics.len(),
        "Computed author metrics"
    );
    metrics
}

/// Reduce an already-filtered record sequence into per-author metrics.
pub fn metrics_for_records(records: &[&Record]) -> HashMap<String, AuthorMetrics> {
    let co_authors = co_author_sets(records);

    group_records(records.iter().copied(), Column::AuthorName)
        .into_iter()
        .filter_map(|(key, group)| {
            let name = key.as_text()?.to_string();
            let co_author_count = co_authors.get(name.as_str()).map_or(0, HashSet::len);
            Some((name, reduce_group(&group, co_author_count)))
        })
        .collect()
}

fn reduce_group(group: &[&Record], co_author_count: usize) -> AuthorMetrics {
    let citations: Vec<u64> = group.iter().map(|r| r.citation_count).collect();
    let rates: Vec<f64> = group.iter().map(|r| r.self_citation_percent()).collect();

    AuthorMetrics {
        paper_count: group.len(),
        citation_count: citations.iter().sum(),
        influential_citation_count: group.iter().map(|r| r.influential_citation_count).sum(),
        self_citation_count: group.iter().map(|r| r.self_citations).sum(),
        self_citation_rate: median(&rates).unwrap_or(0.0),
        co_author_count,
        h_index: h_index(&citations),
        open_access_count: group.iter().filter(|r| r.is_open_access).count(),
        retraction_count: group.iter().filter(|r| r.is_retracted).count(),
    }
}

/// Distinct co-authors of each author, built from publication membership.
///
/// An author never appears in their own set.
pub fn co_author_sets<'a>(records: &[&'a Record]) -> HashMap<&'a str, HashSet<&'a str>> {
    let mut by_publication: HashMap<&str, Vec<&str>> = HashMap::new();
    for &record in records {
        by_publication
            .entry(record.publication_id.as_str())
            .or_default()
            .push(record.author_name.as_str());
    }

    let mut sets: HashMap<&'a str, HashSet<&'a str>> = HashMap::new();
    for &record in records {
        let author = record.author_name.as_str();
        let entry = sets.entry(author).or_default();
        if let Some(members) = by_publication.get(record.publication_id.as_str()) {
            entry.extend(members.iter().copied().filter(|&m| m != author));
        }
    }
    sets
}
