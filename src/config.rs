//! Run configuration.
//!
//! Defaults mirror the published site: HPC venues selected, the last ten
//! years of data shown. Environment variables override the defaults and CLI
//! flags override both.

use crate::error::{PubMetricsError, Result};
use crate::filter::Filter;
use crate::store::RecordStore;
use std::path::PathBuf;
use tracing::warn;

/// Default dataset location.
pub const DEFAULT_DATA_PATH: &str = "data/site-data.csv";

/// Number of years before the latest one selected by default.
pub const DEFAULT_YEAR_WINDOW: i32 = 10;

/// Venues selected when no explicit venue list is given.
pub const DEFAULT_VENUES: &[&str] = &[
    "SC", "IPDPS", "ISC", "ICS", "PPoPP", "HPDC", "CLUSTER", "ICPP", "EuroPar", "CCGRID", "HiPC",
];

/// Environment variable names.
pub mod env {
    pub const DATA: &str = "PUBMETRICS_DATA";
    pub const VENUES: &str = "PUBMETRICS_VENUES";
    pub const YEAR_WINDOW: &str = "PUBMETRICS_YEAR_WINDOW";
}

/// Source column names in the dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvColumns {
    pub publication_id: String,
    pub title: String,
    pub year: String,
    pub venue: String,
    pub area: String,
    pub citation_count: String,
    pub reference_count: String,
    pub influential_citation_count: String,
    pub is_open_access: String,
    pub is_retracted: String,
    pub authors: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            publication_id: "paperId".to_string(),
            title: "title".to_string(),
            year: "year".to_string(),
            venue: "venue_acronym".to_string(),
            area: "area".to_string(),
            citation_count: "citationCount".to_string(),
            reference_count: "referenceCount".to_string(),
            influential_citation_count: "influentialCitationCount".to_string(),
            is_open_access: "isOpenAccess".to_string(),
            is_retracted: "is_retracted".to_string(),
            authors: "authors".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub default_venues: Vec<String>,
    pub year_window: i32,
    pub columns: CsvColumns,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_venues: DEFAULT_VENUES.iter().map(|v| v.to_string()).collect(),
            year_window: DEFAULT_YEAR_WINDOW,
            columns: CsvColumns::default(),
        }
    }
}

impl Config {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(env::DATA).filter(|p| !p.trim().is_empty()) {
            config.data_path = PathBuf::from(path.trim());
        }

        if let Some(venues) = lookup(env::VENUES) {
            config.default_venues = split_list(&venues);
        }

        if let Some(window) = lookup(env::YEAR_WINDOW) {
            config.year_window = window.trim().parse().map_err(|_| {
                PubMetricsError::Config(format!("{} must be an integer, got {:?}", env::YEAR_WINDOW, window))
            })?;
            if config.year_window < 0 {
                return Err(PubMetricsError::Config(format!(
                    "{} must not be negative",
                    env::YEAR_WINDOW
                )));
            }
        }

        Ok(config)
    }

    /// Initial year range: `last - window` when that year exists, else the first year.
    pub fn default_years(&self, store: &RecordStore) -> Option<(i32, i32)> {
        let years = store.unique_years();
        let first = *years.first()?;
        let last = *years.last()?;
        let start = match last.checked_sub(self.year_window) {
            Some(start) if years.contains(&start) => start,
            _ => first,
        };
        Some((start, last))
    }

    /// Filter shown before the user picks anything.
    ///
    /// Default venues missing from the data are ignored; if none remain, all
    /// venues are kept.
    pub fn default_filter(&self, store: &RecordStore) -> Filter {
        let mut filter = Filter::new();
        if let Some((start, end)) = self.default_years(store) {
            filter = filter.with_years(start..=end);
        }

        let available: Vec<String> = store
            .venues_by_area()
            .into_values()
            .flatten()
            .collect();
        let venues: Vec<&String> = self
            .default_venues
            .iter()
            .filter(|v| available.contains(*v))
            .collect();

        if venues.is_empty() {
            warn!(
                defaults = self.default_venues.len(),
                "None of the default venues are in the dataset, selecting all venues"
            );
            filter
        } else {
            filter.with_venues(venues.into_iter().cloned())
        }
    }
}

/// Split a comma separated list, dropping blanks.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use std::collections::HashMap;

    fn record(year: i32, venue: &str) -> Record {
        Record {
            publication_id: format!("{}-{}", venue, year),
            author_name: "Ada".to_string(),
            year,
            venue: venue.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
        assert_eq!(config.year_window, 10);
        assert!(config.default_venues.contains(&"SC".to_string()));
        assert_eq!(config.columns.venue, "venue_acronym");
    }

    #[test]
    fn test_from_lookup_overrides() -> Result<()> {
        let vars: HashMap<&str, &str> = HashMap::from([
            (env::DATA, "/tmp/pubs.csv"),
            (env::VENUES, "SC, ICS,,"),
            (env::YEAR_WINDOW, " 5 "),
        ]);
        let config = Config::from_lookup(|k| vars.get(k).map(|v| v.to_string()))?;
        assert_eq!(config.data_path, PathBuf::from("/tmp/pubs.csv"));
        assert_eq!(config.default_venues, vec!["SC", "ICS"]);
        assert_eq!(config.year_window, 5);
        Ok(())
    }

    #[test]
    fn test_from_lookup_rejects_bad_window() {
        let result = Config::from_lookup(|k| (k == env::YEAR_WINDOW).then(|| "ten".to_string()));
        assert!(matches!(result, Err(PubMetricsError::Config(_))));

        let result = Config::from_lookup(|k| (k == env::YEAR_WINDOW).then(|| "-1".to_string()));
        assert!(matches!(result, Err(PubMetricsError::Config(_))));
    }

    #[test]
    fn test_default_years_window() {
        let store = RecordStore::from_records((2005..=2022).map(|y| record(y, "SC")).collect());
        let config = Config::default();
        assert_eq!(config.default_years(&store), Some((2012, 2022)));

        let short = RecordStore::from_records(vec![record(2019, "SC"), record(2022, "SC")]);
        assert_eq!(config.default_years(&short), Some((2019, 2022)));

        assert_eq!(config.default_years(&RecordStore::new()), None);
    }

    #[test]
    fn test_default_years_huge_window_with_negative_year() {
        let store = RecordStore::from_records(vec![record(-5, "SC"), record(-3, "SC")]);
        let config = Config {
            year_window: i32::MAX,
            ..Config::default()
        };
        assert_eq!(config.default_years(&store), Some((-5, -3)));
    }

    #[test]
    fn test_default_filter_intersects_venues() {
        let store = RecordStore::from_records(vec![
            record(2020, "SC"),
            record(2020, "ICML"),
            record(2021, "ICS"),
        ]);
        let filter = Config::default().default_filter(&store);
        let venues: Vec<&str> = filter
            .venues()
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(venues, vec!["ICS", "SC"]);
        assert_eq!(filter.years(), Some(&(2020..=2021)));
    }

    #[test]
    fn test_default_filter_falls_back_to_all_venues() {
        let store = RecordStore::from_records(vec![record(2020, "ICML")]);
        let filter = Config::default().default_filter(&store);
        assert!(filter.venues().is_none());
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" a ,b,, c"), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }
}
