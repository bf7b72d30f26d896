//! Ranked author table.
//!
//! Turns the aggregator's author -> metrics mapping into ordered rows with a
//! rank position, ready for display or export.

use crate::aggregate::AuthorMetrics;
use crate::error::{PubMetricsError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Sortable columns of the author table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricColumn {
    #[default]
    HIndex,
    PaperCount,
    Citations,
    SelfCitations,
    SelfCitationRate,
    InfluentialCitations,
    CoAuthors,
    OpenAccess,
    Retractions,
}

impl MetricColumn {
    pub const ALL: [MetricColumn; 9] = [
        MetricColumn::HIndex,
        MetricColumn::PaperCount,
        MetricColumn::Citations,
        MetricColumn::SelfCitations,
        MetricColumn::SelfCitationRate,
        MetricColumn::InfluentialCitations,
        MetricColumn::CoAuthors,
        MetricColumn::OpenAccess,
        MetricColumn::Retractions,
    ];

    /// Short machine name, accepted by `FromStr`.
    pub fn key(self) -> &'static str {
        match self {
            MetricColumn::HIndex => "h-index",
            MetricColumn::PaperCount => "papers",
            MetricColumn::Citations => "citations",
            MetricColumn::SelfCitations => "self-citations",
            MetricColumn::SelfCitationRate => "self-citation-rate",
            MetricColumn::InfluentialCitations => "influential",
            MetricColumn::CoAuthors => "co-authors",
            MetricColumn::OpenAccess => "open-access",
            MetricColumn::Retractions => "retractions",
        }
    }

    /// Column heading.
    pub fn title(self) -> &'static str {
        match self {
            MetricColumn::HIndex => "H-Index",
            MetricColumn::PaperCount => "No. Papers",
            MetricColumn::Citations => "Citations",
            MetricColumn::SelfCitations => "Self Citations",
            MetricColumn::SelfCitationRate => "Median Self Citation %",
            MetricColumn::InfluentialCitations => "Influential Citations",
            MetricColumn::CoAuthors => "No. Co-Authors",
            MetricColumn::OpenAccess => "No. Open Access",
            MetricColumn::Retractions => "No. Retractions",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MetricColumn::HIndex => "At least h papers have at least h citations",
            MetricColumn::PaperCount => "Total number of papers",
            MetricColumn::Citations => "Total number of citations",
            MetricColumn::SelfCitations => "Total number of self-citations",
            MetricColumn::SelfCitationRate => "Median percentage of self-citations per-paper",
            MetricColumn::InfluentialCitations => "Total number of influential citations",
            MetricColumn::CoAuthors => "Total number of unique co-authors",
            MetricColumn::OpenAccess => "Number of open access papers",
            MetricColumn::Retractions => "Number of retracted papers",
        }
    }

    /// The column's value for one author, as a sortable number.
    pub fn value(self, metrics: &AuthorMetrics) -> f64 {
        match self {
            MetricColumn::HIndex => metrics.h_index as f64,
            MetricColumn::PaperCount => metrics.paper_count as f64,
            MetricColumn::Citations => metrics.citation_count as f64,
            MetricColumn::SelfCitations => metrics.self_citation_count as f64,
            MetricColumn::SelfCitationRate => metrics.self_citation_rate,
            MetricColumn::InfluentialCitations => metrics.influential_citation_count as f64,
            MetricColumn::CoAuthors => metrics.co_author_count as f64,
            MetricColumn::OpenAccess => metrics.open_access_count as f64,
            MetricColumn::Retractions => metrics.retraction_count as f64,
        }
    }
}

impl fmt::Display for MetricColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MetricColumn {
    type Err = PubMetricsError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        match wanted.as_str() {
            "hindex" => return Ok(MetricColumn::HIndex),
            "count" => return Ok(MetricColumn::PaperCount),
            "coauthors" => return Ok(MetricColumn::CoAuthors),
            _ => {}
        }
        MetricColumn::ALL
            .into_iter()
            .find(|c| c.key() == wanted)
            .ok_or_else(|| PubMetricsError::unknown("sort column", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

/// One row of the author table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorRow {
    pub position: usize,
    pub name: String,
    pub h_index: usize,
    pub papers: usize,
    pub citations: u64,
    pub self_citations: u64,
    pub self_citation_rate: f64,
    pub influential_citations: u64,
    pub co_authors: usize,
    pub open_access: usize,
    pub retractions: usize,
}

impl AuthorRow {
    fn new(position: usize, name: String, m: &AuthorMetrics) -> Self {
        Self {
            position,
            name,
            h_index: m.h_index,
            papers: m.paper_count,
            citations: m.citation_count,
            self_citations: m.self_citation_count,
            self_citation_rate: m.self_citation_rate,
            influential_citations: m.influential_citation_count,
            co_authors: m.co_author_count,
            open_access: m.open_access_count,
            retractions: m.retraction_count,
        }
    }
}

/// Sort authors by `column` and number them.
///
/// Ties are broken by name so the output is deterministic. Positions count
/// from the top for descending order and from the bottom for ascending order,
/// so an author keeps the same position whichever way the table is read.
pub fn rank_authors(
    metrics: &HashMap<String, AuthorMetrics>,
    column: MetricColumn,
    order: SortOrder,
) -> Vec<AuthorRow> {
    let mut entries: Vec<(&String, &AuthorMetrics)> = metrics.iter().collect();
    entries.sort_by(|(name_a, a), (name_b, b)| {
        column
            .value(b)
            .partial_cmp(&column.value(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| name_a.cmp(name_b))
    });
    if order == SortOrder::Ascending {
        entries.reverse();
    }

    let total = entries.len();
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (name, m))| {
            let position = match order {
                SortOrder::Descending => idx + 1,
                SortOrder::Ascending => total - idx,
            };
            AuthorRow::new(position, name.clone(), m)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(h_index: usize, citations: u64) -> AuthorMetrics {
        AuthorMetrics {
            paper_count: h_index.max(1),
            citation_count: citations,
            h_index,
            ..Default::default()
        }
    }

    fn sample() -> HashMap<String, AuthorMetrics> {
        HashMap::from([
            ("Ada".to_string(), metrics(3, 40)),
            ("Grace".to_string(), metrics(5, 20)),
            ("Linus".to_string(), metrics(3, 90)),
        ])
    }

    #[test]
    fn test_parse_metric_column() {
        assert_eq!("h-index".parse::<MetricColumn>().ok(), Some(MetricColumn::HIndex));
        assert_eq!("hIndex".parse::<MetricColumn>().ok(), Some(MetricColumn::HIndex));
        assert_eq!("co_authors".parse::<MetricColumn>().ok(), Some(MetricColumn::CoAuthors));
        assert!("impact".parse::<MetricColumn>().is_err());
        for column in MetricColumn::ALL {
            assert_eq!(column.key().parse::<MetricColumn>().ok(), Some(column));
        }
    }

    #[test]
    fn test_rank_descending_breaks_ties_by_name() {
        let rows = rank_authors(&sample(), MetricColumn::HIndex, SortOrder::Descending);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Grace", "Ada", "Linus"]);
        assert_eq!(rows.iter().map(|r| r.position).collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_ascending_keeps_positions() {
        let rows = rank_authors(&sample(), MetricColumn::Citations, SortOrder::Ascending);
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Grace", "Ada", "Linus"]);
        assert_eq!(rows.iter().map(|r| r.position).collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(rows[2].citations, 90);
    }

    #[test]
    fn test_rank_empty() {
        assert!(rank_authors(&HashMap::new(), MetricColumn::default(), SortOrder::default()).is_empty());
    }
}
