//! In-memory record store.
//!
//! Populated once at startup and never mutated afterwards. Every query
//! returns a fresh structure borrowing from the stored records.

use crate::filter::{self, Filter};
use crate::record::{Column, FieldValue, Record};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Area label used for records that carry none.
pub const UNKNOWN_AREA: &str = "Other";

/// Readable name of an area code; unknown codes are returned unchanged.
pub fn area_name(area: &str) -> &str {
    match area {
        "HPC" => "High Performance Computing",
        "COMPBIO" => "Computational Biology",
        "ARCH" => "Architecture",
        "SE" => "Software Engineering",
        "VIS" => "Visualization",
        "PL" => "Programming Languages",
        "NLP" => "Natural Language Processing",
        "DB" => "Databases",
        "ML" => "Machine Learning",
        "CV" => "Computer Vision",
        other => other,
    }
}

/// Flat list of publication-author records.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already-coerced records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut store = Self::new();
        store.ingest(records);
        store
    }

    /// Append records to the store.
    pub fn ingest<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = Record>,
    {
        let before = self.records.len();
        self.records.extend(rows);
        debug!(
            added = self.records.len() - before,
            total = self.records.len(),
            "Ingested records"
        );
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct values of a column, optionally without the empty string.
    pub fn unique_values(&self, column: Column, exclude_empty: bool) -> HashSet<FieldValue> {
        self.records
            .iter()
            .map(|r| r.value(column))
            .filter(|v| !(exclude_empty && v.is_empty()))
            .collect()
    }

    /// Distinct non-zero years, ascending. Zero is the coerced "missing" year.
    pub fn unique_years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self
            .records
            .iter()
            .map(|r| r.year)
            .filter(|&y| y != 0)
            .collect();
        years.into_iter().collect()
    }

    /// Venues grouped under their research area, both sorted.
    pub fn venues_by_area(&self) -> BTreeMap<String, BTreeSet<String>> {
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in self.records.iter().filter(|r| !r.venue.is_empty()) {
            let area = if record.area.is_empty() {
                UNKNOWN_AREA
            } else {
                record.area.as_str()
            };
            map.entry(area.to_string())
                .or_default()
                .insert(record.venue.clone());
        }
        map
    }

    /// Records accepted by `filter`, in source order. All records when `None`.
    pub fn filtered(&self, filter: Option<&Filter>) -> Vec<&Record> {
        filter::apply(&self.records, filter)
    }

    /// Filtered records grouped by the value of `key`.
    ///
    /// Records keep source order within a group; key order is unspecified.
    pub fn group_by(&self, key: Column, filter: Option<&Filter>) -> HashMap<FieldValue, Vec<&Record>> {
        group_records(self.filtered(filter), key)
    }
}

/// Group an already-filtered record sequence by `key`.
pub fn group_records<'a, I>(records: I, key: Column) -> HashMap<FieldValue, Vec<&'a Record>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: HashMap<FieldValue, Vec<&'a Record>> = HashMap::new();
    for record in records {
        groups.entry(record.value(key)).or_default().push(record);
    }
    groups
}
