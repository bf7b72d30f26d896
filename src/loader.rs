//! Dataset loading.
//!
//! Reads the publication dataset (CSV or a JSON array of objects), coerces
//! every numeric column to a non-negative number and every boolean column to
//! true/false, and explodes each publication into per-author records.
//!
//! Bad cells never fail the load. Malformed numbers become 0 and an
//! unparseable author list leaves the publication without records.

use crate::config::CsvColumns;
use crate::error::{PubMetricsError, Result};
use crate::record::{AuthorEntry, Publication, Record};
use crate::store::RecordStore;
use csv::{ByteRecord, ReaderBuilder};
use serde_json::Value;
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info, warn};

/// Coerce a cell to a non-negative count; anything unparseable is 0.
pub fn coerce_count(raw: &str) -> u64 {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n > 0.0 => n as u64,
        _ => 0,
    }
}

/// Coerce a cell to a year; anything unparseable is 0.
pub fn coerce_year(raw: &str) -> i32 {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() && n >= f64::from(i32::MIN) && n <= f64::from(i32::MAX) => n as i32,
        _ => 0,
    }
}

/// `True`/`true`/`1` are true, everything else false.
pub fn coerce_bool(raw: &str) -> bool {
    let raw = raw.trim();
    raw.eq_ignore_ascii_case("true") || raw == "1"
}

/// Parse the JSON author list of one row.
///
/// Entries without a name are skipped; `selfCitations` is coerced like any
/// other count.
pub fn parse_authors(raw: &str) -> Result<Vec<AuthorEntry>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(raw)?;
    authors_from_value(&value)
}

fn authors_from_value(value: &Value) -> Result<Vec<AuthorEntry>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(PubMetricsError::Validation(format!(
                "author list must be an array, got {}",
                other
            )))
        }
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let name = item.get("name").map(value_to_string)?;
            if name.is_empty() {
                return None;
            }
            let self_citations = item
                .get("selfCitations")
                .map(|v| coerce_count(&value_to_string(v)))
                .unwrap_or(0);
            Some(AuthorEntry {
                name,
                self_citations,
            })
        })
        .collect())
}

/// Render a JSON scalar the way it would appear in a CSV cell.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => (if *b { "True" } else { "False" }).to_string(),
        other => other.to_string(),
    }
}

/// Column positions resolved against a CSV header row.
struct HeaderIndex {
    publication_id: Option<usize>,
    title: Option<usize>,
    year: Option<usize>,
    venue: Option<usize>,
    area: Option<usize>,
    citation_count: Option<usize>,
    reference_count: Option<usize>,
    influential_citation_count: Option<usize>,
    is_open_access: Option<usize>,
    is_retracted: Option<usize>,
    authors: usize,
}

impl HeaderIndex {
    fn new(headers: &ByteRecord, columns: &CsvColumns) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| String::from_utf8_lossy(h).trim() == name)
        };
        let authors = find(columns.authors.as_str()).ok_or_else(|| {
            PubMetricsError::Validation(format!("missing required column '{}'", columns.authors))
        })?;

        Ok(Self {
            publication_id: find(columns.publication_id.as_str()),
            title: find(columns.title.as_str()),
            year: find(columns.year.as_str()),
            venue: find(columns.venue.as_str()),
            area: find(columns.area.as_str()),
            citation_count: find(columns.citation_count.as_str()),
            reference_count: find(columns.reference_count.as_str()),
            influential_citation_count: find(columns.influential_citation_count.as_str()),
            is_open_access: find(columns.is_open_access.as_str()),
            is_retracted: find(columns.is_retracted.as_str()),
            authors,
        })
    }
}

/// Cell text with invalid UTF-8 replaced, so one bad byte cannot fail the load.
fn cell(row: &ByteRecord, idx: Option<usize>) -> Cow<'_, str> {
    idx.and_then(|i| row.get(i))
        .map(String::from_utf8_lossy)
        .unwrap_or(Cow::Borrowed(""))
}

/// Identity for a row without a publication id, kept apart from dataset ids
/// by the `#row` prefix.
fn row_publication_id(row_idx: usize) -> String {
    format!("#row{}", row_idx)
}

/// Read publications from CSV.
pub fn read_csv_publications<R: Read>(reader: R, columns: &CsvColumns) -> Result<Vec<Publication>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.byte_headers()?.clone();
    let index = HeaderIndex::new(&headers, columns)?;

    let mut publications = Vec::new();
    for (row_idx, result) in rdr.byte_records().enumerate() {
        let row = result?;

        let authors = match parse_authors(&cell(&row, Some(index.authors))) {
            Ok(authors) => authors,
            Err(e) => {
                warn!(row = row_idx, error = %e, "Unparseable author list, skipping authors");
                Vec::new()
            }
        };

        let id = cell(&row, index.publication_id);
        publications.push(Publication {
            id: if id.trim().is_empty() {
                row_publication_id(row_idx)
            } else {
                id.trim().to_string()
            },
            title: cell(&row, index.title).to_string(),
            year: coerce_year(&cell(&row, index.year)),
            venue: cell(&row, index.venue).trim().to_string(),
            area: cell(&row, index.area).trim().to_string(),
            citation_count: coerce_count(&cell(&row, index.citation_count)),
            reference_count: coerce_count(&cell(&row, index.reference_count)),
            influential_citation_count: coerce_count(&cell(&row, index.influential_citation_count)),
            is_open_access: coerce_bool(&cell(&row, index.is_open_access)),
            is_retracted: coerce_bool(&cell(&row, index.is_retracted)),
            authors,
        });
    }

    debug!(rows = publications.len(), "Read CSV publications");
    Ok(publications)
}

/// Read publications from a JSON array of row objects.
pub fn read_json_publications<R: Read>(reader: R, columns: &CsvColumns) -> Result<Vec<Publication>> {
    let rows: Vec<serde_json::Map<String, Value>> = serde_json::from_reader(reader)?;

    let publications: Vec<Publication> = rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let text = |key: &str| row.get(key).map(value_to_string).unwrap_or_default();

            let authors = match row.get(&columns.authors) {
                // Author lists may arrive either as nested JSON or as an encoded string.
                Some(Value::String(s)) => parse_authors(s),
                Some(v) => authors_from_value(v),
                None => Ok(Vec::new()),
            }
            .unwrap_or_else(|e| {
                warn!(row = row_idx, error = %e, "Unparseable author list, skipping authors");
                Vec::new()
            });

            let id = text(columns.publication_id.as_str());
            Publication {
                id: if id.trim().is_empty() {
                    row_publication_id(row_idx)
                } else {
                    id.trim().to_string()
                },
                title: text(columns.title.as_str()),
                year: coerce_year(&text(columns.year.as_str())),
                venue: text(columns.venue.as_str()).trim().to_string(),
                area: text(columns.area.as_str()).trim().to_string(),
                citation_count: coerce_count(&text(columns.citation_count.as_str())),
                reference_count: coerce_count(&text(columns.reference_count.as_str())),
                influential_citation_count: coerce_count(&text(columns.influential_citation_count.as_str())),
                is_open_access: coerce_bool(&text(columns.is_open_access.as_str())),
                is_retracted: coerce_bool(&text(columns.is_retracted.as_str())),
                authors,
            }
        })
        .collect();

    debug!(rows = publications.len(), "Read JSON publications");
    Ok(publications)
}

/// Explode publications into a store.
pub fn build_store(publications: Vec<Publication>) -> RecordStore {
    let rows = publications.len();
    let without_authors = publications.iter().filter(|p| p.authors.is_empty()).count();
    let records: Vec<Record> = publications
        .into_iter()
        .flat_map(Publication::into_records)
        .collect();

    info!(
        rows = rows,
        records = records.len(),
        without_authors = without_authors,
        "Loaded dataset"
    );
    RecordStore::from_records(records)
}

/// Load a CSV dataset into a store.
pub fn load_csv(path: &Path, columns: &CsvColumns) -> Result<RecordStore> {
    let file = File::open(path)?;
    let publications = read_csv_publications(BufReader::new(file), columns)?;
    Ok(build_store(publications))
}

/// Load a JSON dataset into a store.
pub fn load_json(path: &Path, columns: &CsvColumns) -> Result<RecordStore> {
    let file = File::open(path)?;
    let publications = read_json_publications(BufReader::new(file), columns)?;
    Ok(build_store(publications))
}

/// Load by file extension: `.json` as JSON, everything else as CSV.
pub fn load(path: &Path, columns: &CsvColumns) -> Result<RecordStore> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        load_json(path, columns)
    } else {
        load_csv(path, columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE_CSV: &str = "\
paperId,title,year,venue_acronym,area,citationCount,referenceCount,influentialCitationCount,isOpenAccess,is_retracted,authors
p1,Scaling Collectives,2021,SC,HPC,12,40,3,True,False,\"[{\"\"name\"\": \"\"Ada\"\", \"\"selfCitations\"\": 4}, {\"\"name\"\": \"\"Grace\"\"}]\"
p2,Sparse Kernels,2020.0,IPDPS,HPC,,n/a,1,False,True,\"[{\"\"name\"\": \"\"Ada\"\", \"\"selfCitations\"\": \"\"2\"\"}]\"
,Orphan,2019,ICS,HPC,5,5,0,false,false,not json
";

    #[test]
    fn test_coercions() {
        assert_eq!(coerce_count("12"), 12);
        assert_eq!(coerce_count(" 7.0 "), 7);
        assert_eq!(coerce_count(""), 0);
        assert_eq!(coerce_count("-3"), 0);
        assert_eq!(coerce_count("NaN"), 0);
        assert_eq!(coerce_count("abc"), 0);

        assert_eq!(coerce_year("2021"), 2021);
        assert_eq!(coerce_year("2020.0"), 2020);
        assert_eq!(coerce_year(""), 0);

        assert!(coerce_bool("True"));
        assert!(coerce_bool("true"));
        assert!(coerce_bool("1"));
        assert!(!coerce_bool("False"));
        assert!(!coerce_bool(""));
    }

    #[test]
    fn test_parse_authors() -> Result<()> {
        let authors = parse_authors(r#"[{"name": "Ada", "selfCitations": 3}, {"name": ""}, {"selfCitations": 1}]"#)?;
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].name, "Ada");
        assert_eq!(authors[0].self_citations, 3);

        assert!(parse_authors("")?.is_empty());
        assert!(parse_authors("{\"name\": \"Ada\"}").is_err());
        assert!(parse_authors("not json").is_err());
        Ok(())
    }

    #[test]
    fn test_read_csv_publications() -> Result<()> {
        let publications = read_csv_publications(SAMPLE_CSV.as_bytes(), &CsvColumns::default())?;
        assert_eq!(publications.len(), 3);

        let first = &publications[0];
        assert_eq!(first.id, "p1");
        assert_eq!(first.year, 2021);
        assert_eq!(first.citation_count, 12);
        assert!(first.is_open_access);
        assert_eq!(first.authors.len(), 2);
        assert_eq!(first.authors[1].self_citations, 0);

        let second = &publications[1];
        assert_eq!(second.year, 2020);
        assert_eq!(second.citation_count, 0);
        assert_eq!(second.reference_count, 0);
        assert!(second.is_retracted);
        assert_eq!(second.authors[0].self_citations, 2);

        let orphan = &publications[2];
        assert_eq!(orphan.id, "#row2");
        assert!(orphan.authors.is_empty());
        Ok(())
    }

    #[test]
    fn test_missing_id_does_not_merge_with_real_id() -> Result<()> {
        let csv = "paperId,year,venue_acronym,authors\n\
1,2020,SC,\"[{\"\"name\"\": \"\"Ada\"\"}]\"\n\
,2020,SC,\"[{\"\"name\"\": \"\"Grace\"\"}]\"\n";
        let publications = read_csv_publications(csv.as_bytes(), &CsvColumns::default())?;
        assert_eq!(publications[0].id, "1");
        assert_eq!(publications[1].id, "#row1");

        let store = build_store(publications);
        let metrics = crate::aggregate::compute_author_metrics(&store, None);
        assert_eq!(metrics["Ada"].co_author_count, 0);
        assert_eq!(metrics["Grace"].co_author_count, 0);
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_cell_does_not_fail_load() -> Result<()> {
        let mut csv = b"paperId,title,year,authors\np1,".to_vec();
        csv.extend_from_slice(b"\xff\xfe Kernels");
        csv.extend_from_slice(b",2021,\"[{\"\"name\"\": \"\"Ada\"\"}]\"\n");
        csv.extend_from_slice(b"p2,Sparse,2022,\"[{\"\"name\"\": \"\"Grace\"\"}]\"\n");

        let publications = read_csv_publications(csv.as_slice(), &CsvColumns::default())?;
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[0].title, "\u{FFFD}\u{FFFD} Kernels");
        assert_eq!(publications[0].year, 2021);
        assert_eq!(publications[0].authors[0].name, "Ada");
        assert_eq!(publications[1].title, "Sparse");
        Ok(())
    }

    #[test]
    fn test_missing_authors_column_is_an_error() {
        let csv = "paperId,year\np1,2020\n";
        let result = read_csv_publications(csv.as_bytes(), &CsvColumns::default());
        assert!(matches!(result, Err(PubMetricsError::Validation(_))));
    }

    #[test]
    fn test_read_json_publications() -> Result<()> {
        let json = r#"[
            {"paperId": "p1", "year": 2021, "venue_acronym": "SC", "citationCount": 9,
             "referenceCount": "20", "isOpenAccess": true,
             "authors": [{"name": "Ada", "selfCitations": 2}, {"name": "Grace"}]},
            {"year": "bad", "venue_acronym": "ICS", "citationCount": null,
             "authors": "[{\"name\": \"Linus\"}]"}
        ]"#;
        let publications = read_json_publications(json.as_bytes(), &CsvColumns::default())?;
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[0].reference_count, 20);
        assert!(publications[0].is_open_access);
        assert_eq!(publications[0].authors.len(), 2);
        assert_eq!(publications[1].id, "#row1");
        assert_eq!(publications[1].year, 0);
        assert_eq!(publications[1].citation_count, 0);
        assert_eq!(publications[1].authors[0].name, "Linus");
        Ok(())
    }

    #[test]
    fn test_load_csv_from_file() -> Result<()> {
        let mut temp = NamedTempFile::new()?;
        temp.write_all(SAMPLE_CSV.as_bytes())?;

        let store = load(temp.path(), &CsvColumns::default())?;
        // Two authors on p1, one on p2, none on the orphan row.
        assert_eq!(store.len(), 3);
        assert_eq!(store.records()[0].author_name, "Ada");
        assert_eq!(store.records()[2].publication_id, "p2");
        Ok(())
    }

    #[test]
    fn test_load_json_by_extension() -> Result<()> {
        let mut temp = tempfile::Builder::new().suffix(".json").tempfile()?;
        temp.write_all(br#"[{"paperId": "p1", "authors": [{"name": "Ada"}]}]"#)?;

        let store = load(temp.path(), &CsvColumns::default())?;
        assert_eq!(store.len(), 1);
        Ok(())
    }
}
