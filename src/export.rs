//! Output writers: CSV, JSON and a plain text table.

use crate::error::{PubMetricsError, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Output format of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

impl FromStr for OutputFormat {
    type Err = PubMetricsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" | "text" => Ok(OutputFormat::Table),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(PubMetricsError::unknown("output format", other)),
        }
    }
}

/// Serialize rows as CSV with a header row.
pub fn write_csv<W: Write, T: Serialize>(writer: W, rows: &[T]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(true).from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save rows to a CSV file. Nothing is written for an empty slice.
pub fn save_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if rows.is_empty() {
        info!(path = %path.display(), "No data to save");
        return Ok(());
    }

    let file = std::fs::File::create(path)?;
    write_csv(file, rows)?;
    info!(path = %path.display(), rows = rows.len(), "Saved CSV");
    Ok(())
}

/// Serialize a value as pretty JSON followed by a newline.
pub fn write_json<W: Write, T: Serialize + ?Sized>(mut writer: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Render a fixed-width text table. Numeric-looking cells are right aligned.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            let len = cell.chars().count();
            match widths.get_mut(i) {
                Some(w) => *w = (*w).max(len),
                None => widths.push(len),
            }
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_line(&mut out, &header_cells, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| {
            if is_numeric(cell) {
                format!("{:>width$}", cell, width = width)
            } else {
                format!("{:<width$}", cell, width = width)
            }
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[derive(Serialize)]
    struct Row {
        name: String,
        count: u32,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                name: "Ada".to_string(),
                count: 3,
            },
            Row {
                name: "Grace".to_string(),
                count: 12,
            },
        ]
    }

    #[test]
    fn test_write_csv() -> Result<()> {
        let mut buf = Vec::new();
        write_csv(&mut buf, &rows())?;
        let text = String::from_utf8_lossy(&buf);
        assert_eq!(text, "name,count\nAda,3\nGrace,12\n");
        Ok(())
    }

    #[test]
    fn test_save_csv() -> Result<()> {
        let temp = NamedTempFile::new()?;
        save_csv(temp.path(), &rows())?;
        let text = std::fs::read_to_string(temp.path())?;
        assert!(text.starts_with("name,count\n"));
        assert_eq!(text.lines().count(), 3);
        Ok(())
    }

    #[test]
    fn test_write_json() -> Result<()> {
        let mut buf = Vec::new();
        write_json(&mut buf, &rows())?;
        let value: serde_json::Value = serde_json::from_slice(&buf)?;
        assert_eq!(value[1]["name"], "Grace");
        assert_eq!(value[1]["count"], 12);
        Ok(())
    }

    #[test]
    fn test_render_table() {
        let table = render_table(
            &["Name", "Count"],
            &[
                vec!["Ada".to_string(), "3".to_string()],
                vec!["Grace".to_string(), "12".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Name   Count");
        assert_eq!(lines[1], "-----  -----");
        assert_eq!(lines[2], "Ada        3");
        assert_eq!(lines[3], "Grace     12");
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("CSV".parse::<OutputFormat>().ok(), Some(OutputFormat::Csv));
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
