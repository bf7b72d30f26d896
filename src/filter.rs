//! Record filters.
//!
//! A [`Filter`] is a stateless predicate over a year range and a venue set.
//! Either side may be left open, in which case it accepts everything.

use crate::record::Record;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Predicate over (year range, venue set).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    years: Option<RangeInclusive<i32>>,
    venues: Option<BTreeSet<String>>,
}

impl Filter {
    /// A filter that accepts every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to an inclusive year range.
    pub fn with_years(mut self, years: RangeInclusive<i32>) -> Self {
        self.years = Some(years);
        self
    }

    /// Restrict to a set of venues.
    ///
    /// An empty set selects nothing, matching an all-unchecked venue picker.
    pub fn with_venues<I, S>(mut self, venues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.venues = Some(venues.into_iter().map(Into::into).collect());
        self
    }

    pub fn years(&self) -> Option<&RangeInclusive<i32>> {
        self.years.as_ref()
    }

    pub fn venues(&self) -> Option<&BTreeSet<String>> {
        self.venues.as_ref()
    }

    /// Whether a record satisfies the filter.
    pub fn matches(&self, record: &Record) -> bool {
        let year_ok = self
            .years
            .as_ref()
            .map(|range| range.contains(&record.year))
            .unwrap_or(true);
        let venue_ok = self
            .venues
            .as_ref()
            .map(|venues| venues.contains(&record.venue))
            .unwrap_or(true);
        year_ok && venue_ok
    }
}

/// Order-preserving subsequence of `records` accepted by `filter`.
///
/// With no filter every record is returned.
pub fn apply<'a, I>(records: I, filter: Option<&Filter>) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    match filter {
        Some(f) => records.into_iter().filter(|r| f.matches(r)).collect(),
        None => records.into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i32, venue: &str) -> Record {
        Record {
            year,
            venue: venue.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_open_filter_matches_everything() {
        let filter = Filter::new();
        assert!(filter.matches(&record(1990, "")));
        assert!(filter.matches(&record(2024, "SC")));
    }

    #[test]
    fn test_year_range_is_inclusive() {
        let filter = Filter::new().with_years(2019..=2021);
        assert!(filter.matches(&record(2019, "SC")));
        assert!(filter.matches(&record(2021, "SC")));
        assert!(!filter.matches(&record(2018, "SC")));
        assert!(!filter.matches(&record(2022, "SC")));
    }

    #[test]
    fn test_venue_set() {
        let filter = Filter::new().with_venues(["SC", "IPDPS"]);
        assert!(filter.matches(&record(2020, "IPDPS")));
        assert!(!filter.matches(&record(2020, "HPDC")));

        let nothing = Filter::new().with_venues(Vec::<String>::new());
        assert!(!nothing.matches(&record(2020, "SC")));
    }

    #[test]
    fn test_apply_preserves_order() {
        let records = vec![record(2020, "SC"), record(2015, "SC"), record(2021, "SC")];
        let filter = Filter::new().with_years(2020..=2021);

        let kept = apply(&records, Some(&filter));
        assert_eq!(kept.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2020, 2021]);

        assert_eq!(apply(&records, None).len(), 3);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let records = vec![record(2020, "SC"), record(2020, "ICS"), record(2010, "SC")];
        let filter = Filter::new().with_years(2015..=2025).with_venues(["SC"]);

        let once = apply(&records, Some(&filter));
        let twice = apply(once.iter().copied(), Some(&filter));
        assert_eq!(once, twice);
    }
}
