//! Per-category summaries and the top-paper list.
//!
//! These feed the bar and violin plots: records are grouped by a category
//! column, a per-paper metric is collected for each group, and the values
//! are reduced with the chosen aggregation.

use crate::aggregate::{h_index, median};
use crate::error::{PubMetricsError, Result};
use crate::filter::Filter;
use crate::record::{Column, FieldValue, Record};
use crate::store::RecordStore;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Entries kept for scalar aggregations.
pub const MAX_BARS: usize = 50;

/// Entries kept for distributions.
pub const MAX_DISTRIBUTIONS: usize = 10;

/// Per-paper quantity collected for each category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Citations,
    References,
    InfluentialCitations,
    Papers,
    /// Number of authors on the paper
    Authors,
}

impl Metric {
    fn value(self, record: &Record, author_count: usize) -> f64 {
        match self {
            Metric::Citations => record.citation_count as f64,
            Metric::References => record.reference_count as f64,
            Metric::InfluentialCitations => record.influential_citation_count as f64,
            Metric::Papers => 1.0,
            Metric::Authors => author_count as f64,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::Citations => "citations",
            Metric::References => "references",
            Metric::InfluentialCitations => "influential citations",
            Metric::Papers => "papers",
            Metric::Authors => "authors",
        }
    }
}

impl FromStr for Metric {
    type Err = PubMetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "citations" => Ok(Metric::Citations),
            "references" => Ok(Metric::References),
            "influential" | "influential_citations" | "influential-citations" => {
                Ok(Metric::InfluentialCitations)
            }
            "papers" => Ok(Metric::Papers),
            "authors" | "# authors" => Ok(Metric::Authors),
            other => Err(PubMetricsError::unknown("metric", other)),
        }
    }
}

/// How a category's values are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Total,
    Mean,
    Median,
    Min,
    Max,
    HIndex,
    /// Keep the raw values (violin plot).
    Distribution,
}

impl Aggregation {
    pub fn name(self) -> &'static str {
        match self {
            Aggregation::Total => "total",
            Aggregation::Mean => "mean",
            Aggregation::Median => "median",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
            Aggregation::HIndex => "h-index",
            Aggregation::Distribution => "none",
        }
    }

    /// Reduce a value list. Empty lists reduce to 0.
    pub fn reduce(self, values: &[f64]) -> f64 {
        match self {
            Aggregation::Total | Aggregation::Distribution => values.iter().sum(),
            Aggregation::Mean => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            Aggregation::Median => median(values).unwrap_or(0.0),
            Aggregation::Min => values.iter().copied().reduce(f64::min).unwrap_or(0.0),
            Aggregation::Max => values.iter().copied().reduce(f64::max).unwrap_or(0.0),
            Aggregation::HIndex => {
                let counts: Vec<u64> = values.iter().map(|v| v.max(0.0) as u64).collect();
                h_index(&counts) as f64
            }
        }
    }
}

impl FromStr for Aggregation {
    type Err = PubMetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "total" | "sum" => Ok(Aggregation::Total),
            "mean" | "avg" => Ok(Aggregation::Mean),
            "median" => Ok(Aggregation::Median),
            "min" => Ok(Aggregation::Min),
            "max" => Ok(Aggregation::Max),
            "h-index" | "hindex" | "h_index" => Ok(Aggregation::HIndex),
            "none" | "distribution" => Ok(Aggregation::Distribution),
            other => Err(PubMetricsError::unknown("aggregation", other)),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One bar (or violin) of a category plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryValue {
    pub key: FieldValue,
    /// Aggregated value; the sum for distributions
    pub value: f64,
    /// Raw values, only kept for distributions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<f64>,
}

/// A titled, ranked category summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub title: String,
    pub entries: Vec<CategoryValue>,
}

/// Records with one representative per publication, in source order.
pub fn distinct_publications<'a>(records: &[&'a Record]) -> Vec<&'a Record> {
    let mut seen = HashSet::new();
    records
        .iter()
        .copied()
        .filter(|&r| seen.insert(r.publication_id.as_str()))
        .collect()
}

/// Group, collect and reduce a metric per category, ranked descending.
///
/// Grouping by author counts every authored paper; any other key counts each
/// publication once.
pub fn category_summary(
    store: &RecordStore,
    filter: Option<&Filter>,
    key: Column,
    metric: Metric,
    aggregation: Aggregation,
) -> CategorySummary {
    let filtered = store.filtered(filter);
    let authors = authors_by_publication(&filtered);
    let rows = if key == Column::AuthorName {
        filtered
    } else {
        distinct_publications(&filtered)
    };

    let mut bins: HashMap<FieldValue, Vec<f64>> = HashMap::new();
    for record in rows {
        let value = record.value(key);
        if value.is_empty() {
            continue;
        }
        let author_count = authors
            .get(record.publication_id.as_str())
            .map_or(0, Vec::len);
        bins.entry(value).or_default().push(metric.value(record, author_count));
    }

    let mut entries: Vec<CategoryValue> = bins
        .into_iter()
        .map(|(key, values)| CategoryValue {
            key,
            value: aggregation.reduce(&values),
            values: if aggregation == Aggregation::Distribution {
                values
            } else {
                Vec::new()
            },
        })
        .collect();

    entries.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });

    let limit = if aggregation == Aggregation::Distribution {
        MAX_DISTRIBUTIONS
    } else {
        MAX_BARS
    };
    entries.truncate(limit);

    CategorySummary {
        title: summary_title(key, metric, aggregation),
        entries,
    }
}

fn summary_title(key: Column, metric: Metric, aggregation: Aggregation) -> String {
    let prefix = if aggregation == Aggregation::Distribution {
        String::new()
    } else {
        format!("{} ", aggregation.name())
    };
    capitalize(&format!("{}{} by {}", prefix, metric.name(), key.name()))
}

fn capitalize(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Author names of each publication, in their order on the paper.
fn authors_by_publication<'a>(records: &[&'a Record]) -> HashMap<&'a str, Vec<&'a str>> {
    let mut authors: HashMap<&str, Vec<&str>> = HashMap::new();
    for &record in records {
        authors
            .entry(record.publication_id.as_str())
            .or_default()
            .push(record.author_name.as_str());
    }
    authors
}

/// One entry of the top-paper list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperSummary {
    pub citations: u64,
    pub title: String,
    pub authors: String,
    pub venue: String,
    pub year: i32,
}

/// The `n` most cited publications passing `filter`.
///
/// Ties keep source order. Authors are listed in their order on the paper.
pub fn top_papers(store: &RecordStore, filter: Option<&Filter>, n: usize) -> Vec<PaperSummary> {
    let filtered = store.filtered(filter);
    let authors = authors_by_publication(&filtered);

    let mut papers = distinct_publications(&filtered);
    papers.sort_by(|a, b| b.citation_count.cmp(&a.citation_count));

    papers
        .into_iter()
        .take(n)
        .map(|paper| PaperSummary {
            citations: paper.citation_count,
            title: paper.title.clone(),
            authors: authors
                .get(paper.publication_id.as_str())
                .map(|names| names.join(", "))
                .unwrap_or_default(),
            venue: paper.venue.clone(),
            year: paper.year,
        })
        .collect()
}
