//! Publication records.
//!
//! A [`Publication`] is one row of the source dataset. The store does not keep
//! publications directly: each one is exploded into a [`Record`] per author,
//! and everything downstream works on those flat pairings.

use crate::error::{PubMetricsError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One author entry of a publication row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorEntry {
    pub name: String,
    /// References in this paper that cite the author's own earlier work
    #[serde(rename = "selfCitations", default)]
    pub self_citations: u64,
}

/// A publication row after numeric/boolean coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub year: i32,
    pub venue: String,
    pub area: String,
    pub citation_count: u64,
    pub reference_count: u64,
    pub influential_citation_count: u64,
    pub is_open_access: bool,
    pub is_retracted: bool,
    pub authors: Vec<AuthorEntry>,
}

impl Publication {
    /// Explode the publication into one record per author, in author order.
    pub fn into_records(self) -> Vec<Record> {
        let Publication {
            id,
            title,
            year,
            venue,
            area,
            citation_count,
            reference_count,
            influential_citation_count,
            is_open_access,
            is_retracted,
            authors,
        } = self;

        authors
            .into_iter()
            .map(|author| Record {
                publication_id: id.clone(),
                title: title.clone(),
                author_name: author.name,
                year,
                venue: venue.clone(),
                area: area.clone(),
                citation_count,
                reference_count,
                self_citations: author.self_citations,
                influential_citation_count,
                is_open_access,
                is_retracted,
            })
            .collect()
    }
}

/// One publication-author pairing. Immutable once ingested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    pub publication_id: String,
    pub title: String,
    pub author_name: String,
    pub year: i32,
    pub venue: String,
    pub area: String,
    pub citation_count: u64,
    pub reference_count: u64,
    pub self_citations: u64,
    pub influential_citation_count: u64,
    pub is_open_access: bool,
    pub is_retracted: bool,
}

impl Record {
    /// Percentage of this paper's references that are self-citations.
    ///
    /// Papers without references count as 0.0 so they do not poison a median.
    pub fn self_citation_percent(&self) -> f64 {
        if self.reference_count == 0 {
            0.0
        } else {
            self.self_citations as f64 / self.reference_count as f64 * 100.0
        }
    }

    /// Value of a single column, used for unique-value and grouping queries.
    pub fn value(&self, column: Column) -> FieldValue {
        match column {
            Column::PublicationId => FieldValue::Text(self.publication_id.clone()),
            Column::Title => FieldValue::Text(self.title.clone()),
            Column::AuthorName => FieldValue::Text(self.author_name.clone()),
            Column::Year => FieldValue::Int(i64::from(self.year)),
            Column::Venue => FieldValue::Text(self.venue.clone()),
            Column::Area => FieldValue::Text(self.area.clone()),
            Column::CitationCount => FieldValue::from(self.citation_count),
            Column::ReferenceCount => FieldValue::from(self.reference_count),
            Column::SelfCitations => FieldValue::from(self.self_citations),
            Column::InfluentialCitationCount => FieldValue::from(self.influential_citation_count),
            Column::IsOpenAccess => FieldValue::Int(i64::from(self.is_open_access)),
            Column::IsRetracted => FieldValue::Int(i64::from(self.is_retracted)),
        }
    }
}

/// Record attributes that can be queried by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    PublicationId,
    Title,
    AuthorName,
    Year,
    Venue,
    Area,
    CitationCount,
    ReferenceCount,
    SelfCitations,
    InfluentialCitationCount,
    IsOpenAccess,
    IsRetracted,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::PublicationId,
        Column::Title,
        Column::AuthorName,
        Column::Year,
        Column::Venue,
        Column::Area,
        Column::CitationCount,
        Column::ReferenceCount,
        Column::SelfCitations,
        Column::InfluentialCitationCount,
        Column::IsOpenAccess,
        Column::IsRetracted,
    ];

    /// Canonical snake_case name.
    pub fn name(self) -> &'static str {
        match self {
            Column::PublicationId => "publication_id",
            Column::Title => "title",
            Column::AuthorName => "author",
            Column::Year => "year",
            Column::Venue => "venue",
            Column::Area => "area",
            Column::CitationCount => "citations",
            Column::ReferenceCount => "references",
            Column::SelfCitations => "self_citations",
            Column::InfluentialCitationCount => "influential_citations",
            Column::IsOpenAccess => "open_access",
            Column::IsRetracted => "retracted",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = PubMetricsError;

    /// Accepts the snake_case names as well as the dataset's column headers.
    fn from_str(s: &str) -> Result<Self> {
        let column = match s.trim() {
            "publication_id" | "paperId" | "paper_id" => Column::PublicationId,
            "title" => Column::Title,
            "author" | "author_name" | "name" => Column::AuthorName,
            "year" => Column::Year,
            "venue" | "venue_acronym" => Column::Venue,
            "area" => Column::Area,
            "citations" | "citationCount" | "citation_count" => Column::CitationCount,
            "references" | "referenceCount" | "reference_count" => Column::ReferenceCount,
            "self_citations" | "selfCitations" => Column::SelfCitations,
            "influential_citations" | "influentialCitationCount" => {
                Column::InfluentialCitationCount
            }
            "open_access" | "isOpenAccess" => Column::IsOpenAccess,
            "retracted" | "is_retracted" => Column::IsRetracted,
            other => return Err(PubMetricsError::unknown("column", other)),
        };
        Ok(column)
    }
}

/// A single cell value, hashable so it can key a grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Empty strings are the "missing" marker in the source data.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            FieldValue::Int(n) => Some(*n),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<u64> for FieldValue {
    fn from(value: u64) -> Self {
        FieldValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_publication() -> Publication {
        Publication {
            id: "p1".to_string(),
            title: "Scaling Collectives".to_string(),
            year: 2021,
            venue: "SC".to_string(),
            area: "HPC".to_string(),
            citation_count: 12,
            reference_count: 40,
            influential_citation_count: 3,
            is_open_access: true,
            is_retracted: false,
            authors: vec![
                AuthorEntry {
                    name: "Ada".to_string(),
                    self_citations: 4,
                },
                AuthorEntry {
                    name: "Grace".to_string(),
                    self_citations: 0,
                },
            ],
        }
    }

    #[test]
    fn test_into_records_one_per_author() {
        let records = sample_publication().into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].author_name, "Ada");
        assert_eq!(records[0].self_citations, 4);
        assert_eq!(records[1].author_name, "Grace");
        assert!(records.iter().all(|r| r.publication_id == "p1"));
        assert!(records.iter().all(|r| r.citation_count == 12));
    }

    #[test]
    fn test_self_citation_percent() {
        let records = sample_publication().into_records();
        assert!((records[0].self_citation_percent() - 10.0).abs() < f64::EPSILON);

        let no_refs = Record {
            self_citations: 2,
            reference_count: 0,
            ..Default::default()
        };
        assert_eq!(no_refs.self_citation_percent(), 0.0);
    }

    #[test]
    fn test_column_from_str() {
        assert_eq!("venue_acronym".parse::<Column>().ok(), Some(Column::Venue));
        assert_eq!("citationCount".parse::<Column>().ok(), Some(Column::CitationCount));
        assert!("journal".parse::<Column>().is_err());

        for column in Column::ALL {
            assert_eq!(column.name().parse::<Column>().ok(), Some(column));
        }
    }

    #[test]
    fn test_record_value() {
        let records = sample_publication().into_records();
        let record = &records[0];
        assert_eq!(record.value(Column::Year), FieldValue::Int(2021));
        assert_eq!(record.value(Column::Venue), FieldValue::from("SC"));
        assert_eq!(record.value(Column::IsOpenAccess), FieldValue::Int(1));
        assert!(FieldValue::from("").is_empty());
        assert!(!FieldValue::Int(0).is_empty());
    }
}
