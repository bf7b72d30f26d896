//! pubmetrics - author and venue metrics over a publication dataset
//!
//! ## Usage
//!
//! ```bash
//! pubmetrics authors --years 2015-2022 --areas HPC --sort citations --limit 20
//! pubmetrics papers --venues SC,ICS --count 10
//! pubmetrics summary --by venue --metric citations --agg median --format json
//! pubmetrics venues
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pubmetrics::config::Config;
use pubmetrics::export::{self, OutputFormat};
use pubmetrics::report::{rank_authors, AuthorRow, MetricColumn, SortOrder};
use pubmetrics::summary::{self, Aggregation, CategorySummary, Metric, PaperSummary};
use pubmetrics::store::area_name;
use pubmetrics::{compute_author_metrics, loader, Column, Filter, PubMetricsError, RecordStore};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Author and venue metrics over a publication dataset
#[derive(Parser)]
#[command(name = "pubmetrics")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Dataset path, CSV or JSON (overrides PUBMETRICS_DATA)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ranked table of per-author metrics
    Authors {
        #[command(flatten)]
        filter: FilterArgs,

        /// Sort column (h-index, papers, citations, self-citations,
        /// self-citation-rate, influential, co-authors, open-access, retractions)
        #[arg(long, default_value = "h-index")]
        sort: MetricColumn,

        /// Sort ascending instead of descending
        #[arg(long)]
        ascending: bool,

        /// Maximum number of rows
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Most cited papers
    Papers {
        #[command(flatten)]
        filter: FilterArgs,

        /// Number of papers to list
        #[arg(long, default_value_t = 10)]
        count: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Aggregate a per-paper metric by category
    Summary {
        #[command(flatten)]
        filter: FilterArgs,

        /// Category column (venue, year, area, author, ...)
        #[arg(long, default_value = "venue")]
        by: Column,

        /// Metric: citations, references, influential, papers or authors
        #[arg(long, default_value = "citations")]
        metric: Metric,

        /// Aggregation: total, mean, median, min, max, h-index or none
        #[arg(long, default_value = "total")]
        agg: Aggregation,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List available years and venues by area
    Venues {
        #[command(flatten)]
        output: OutputArgs,
    },
}

/// Record selection flags shared by the report commands.
#[derive(Args, Debug, Default)]
struct FilterArgs {
    /// Year range (e.g., "2015-2022", "2020")
    #[arg(long)]
    years: Option<String>,

    /// Comma separated venue list
    #[arg(long, value_delimiter = ',')]
    venues: Vec<String>,

    /// Comma separated area list; selects every venue in those areas
    #[arg(long, value_delimiter = ',')]
    areas: Vec<String>,

    /// Select every venue instead of the defaults
    #[arg(long, conflicts_with_all = ["venues", "areas"])]
    all_venues: bool,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output format: table, csv or json
    #[arg(long, default_value = "table")]
    format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .init();

    let mut config = Config::from_env().context("Invalid configuration")?;
    if let Some(path) = cli.data {
        config.data_path = path;
    }

    let store = loader::load(&config.data_path, &config.columns)
        .with_context(|| format!("Failed to load dataset {}", config.data_path.display()))?;

    match cli.command {
        Commands::Authors {
            filter,
            sort,
            ascending,
            limit,
            output,
        } => {
            let filter = resolve_filter(&filter, &config, &store)?;
            run_authors(&store, &filter, sort, ascending, limit, &output)
        }
        Commands::Papers {
            filter,
            count,
            output,
        } => {
            let filter = resolve_filter(&filter, &config, &store)?;
            run_papers(&store, &filter, count, &output)
        }
        Commands::Summary {
            filter,
            by,
            metric,
            agg,
            output,
        } => {
            let filter = resolve_filter(&filter, &config, &store)?;
            run_summary(&store, &filter, by, metric, agg, &output)
        }
        Commands::Venues { output } => run_venues(&store, &output),
    }
}

// ============================================================================
// Filter Resolution
// ============================================================================

/// Build the record filter from flags, falling back to the configured defaults
/// for whichever side was not given.
fn resolve_filter(args: &FilterArgs, config: &Config, store: &RecordStore) -> Result<Filter> {
    let defaults = config.default_filter(store);
    let mut filter = Filter::new();

    let years = match &args.years {
        Some(raw) => Some(parse_years(raw)?),
        None => defaults.years().cloned(),
    };
    if let Some(years) = years {
        filter = filter.with_years(years);
    }

    if args.all_venues {
        return Ok(filter);
    }

    if args.venues.is_empty() && args.areas.is_empty() {
        if let Some(venues) = defaults.venues() {
            filter = filter.with_venues(venues.iter().cloned());
        }
        return Ok(filter);
    }

    let by_area = store.venues_by_area();
    let known: BTreeSet<&String> = by_area.values().flatten().collect();
    let mut venues: BTreeSet<String> = BTreeSet::new();

    for venue in &args.venues {
        if !known.contains(venue) {
            warn!(venue = %venue, "Venue not found in dataset");
        }
        venues.insert(venue.clone());
    }
    for area in &args.areas {
        let in_area = by_area
            .get(area)
            .ok_or_else(|| PubMetricsError::unknown("area", area.as_str()))?;
        venues.extend(in_area.iter().cloned());
    }

    Ok(filter.with_venues(venues))
}

/// Parse year range string (e.g., "2020", "2015-2022")
fn parse_years(years_str: &str) -> Result<RangeInclusive<i32>> {
    if let Some((start, end)) = years_str.split_once('-') {
        let start: i32 = start.trim().parse().context("Invalid start year")?;
        let end: i32 = end.trim().parse().context("Invalid end year")?;
        if start > end {
            anyhow::bail!("Invalid year range {}: start is after end", years_str);
        }
        Ok(start..=end)
    } else {
        let year: i32 = years_str.trim().parse().context("Invalid year")?;
        Ok(year..=year)
    }
}

fn log_filter(filter: &Filter) {
    debug!(
        years = ?filter.years(),
        venues = ?filter.venues().map(|v| v.len()),
        "Resolved filter"
    );
}

// ============================================================================
// Commands
// ============================================================================

fn run_authors(
    store: &RecordStore,
    filter: &Filter,
    sort: MetricColumn,
    ascending: bool,
    limit: Option<usize>,
    output: &OutputArgs,
) -> Result<()> {
    log_filter(filter);
    let metrics = compute_author_metrics(store, Some(filter));
    let order = if ascending {
        SortOrder::Ascending
    } else {
        SortOrder::Descending
    };

    let mut rows = rank_authors(&metrics, sort, order);
    if let Some(limit) = limit {
        rows.truncate(limit);
    }
    info!(authors = metrics.len(), shown = rows.len(), sort = %sort, "Ranked authors");

    emit(output, &rows, &rows, || author_table(&rows))
}

fn run_papers(store: &RecordStore, filter: &Filter, count: usize, output: &OutputArgs) -> Result<()> {
    log_filter(filter);
    let papers = summary::top_papers(store, Some(filter), count);
    emit(output, &papers, &papers, || paper_table(&papers))
}

fn run_summary(
    store: &RecordStore,
    filter: &Filter,
    by: Column,
    metric: Metric,
    agg: Aggregation,
    output: &OutputArgs,
) -> Result<()> {
    log_filter(filter);
    let summary = summary::category_summary(store, Some(filter), by, metric, agg);
    let rows: Vec<SummaryRow> = summary.entries.iter().map(SummaryRow::from_entry).collect();
    emit(output, &rows, &summary, || summary_table(&summary, agg))
}

fn run_venues(store: &RecordStore, output: &OutputArgs) -> Result<()> {
    let listing = VenueListing {
        years: store.unique_years(),
        areas: store.venues_by_area(),
    };
    let rows: Vec<VenueRow> = listing
        .areas
        .iter()
        .flat_map(|(area, venues)| {
            venues.iter().map(move |venue| VenueRow {
                area: area.clone(),
                venue: venue.clone(),
            })
        })
        .collect();

    emit(output, &rows, &listing, || venue_text(&listing))
}

// ============================================================================
// Output
// ============================================================================

/// Flat CSV row for a category summary entry.
#[derive(Debug, Serialize)]
struct SummaryRow {
    key: String,
    value: f64,
    /// Raw values joined with ';', distributions only
    values: String,
}

impl SummaryRow {
    fn from_entry(entry: &summary::CategoryValue) -> Self {
        Self {
            key: entry.key.to_string(),
            value: entry.value,
            values: entry
                .values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

#[derive(Debug, Serialize)]
struct VenueListing {
    years: Vec<i32>,
    areas: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Serialize)]
struct VenueRow {
    area: String,
    venue: String,
}

/// Write `csv_rows`, `json` or the rendered table, depending on the format.
fn emit<T, J>(output: &OutputArgs, csv_rows: &[T], json: &J, table: impl FnOnce() -> String) -> Result<()>
where
    T: Serialize,
    J: Serialize + ?Sized,
{
    match &output.output {
        Some(path) => {
            let notice = save_output(output.format, path, csv_rows, json, table)?;
            println!("{}", notice);
        }
        None => match output.format {
            OutputFormat::Table => print!("{}", table()),
            OutputFormat::Csv => {
                export::write_csv(io::stdout().lock(), csv_rows).context("Failed to write CSV")?
            }
            OutputFormat::Json => {
                export::write_json(io::stdout().lock(), json).context("Failed to write JSON")?
            }
        },
    }
    io::stdout().flush()?;
    Ok(())
}

/// Write the report to `path` and return the line to show the user.
fn save_output<T, J>(
    format: OutputFormat,
    path: &Path,
    csv_rows: &[T],
    json: &J,
    table: impl FnOnce() -> String,
) -> Result<String>
where
    T: Serialize,
    J: Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => {
            std::fs::write(path, table())
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        OutputFormat::Csv => {
            if csv_rows.is_empty() {
                return Ok(format!("No data to save to {:?}", path));
            }
            export::save_csv(path, csv_rows).context("Failed to save CSV")?;
        }
        OutputFormat::Json => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            export::write_json(file, json).context("Failed to write JSON")?;
        }
    }
    Ok(format!("Saved: {:?}", path))
}

fn author_table(rows: &[AuthorRow]) -> String {
    let mut headers = vec!["#", "Name"];
    headers.extend(MetricColumn::ALL.iter().map(|c| c.title()));

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            vec![
                row.position.to_string(),
                row.name.clone(),
                row.h_index.to_string(),
                row.papers.to_string(),
                row.citations.to_string(),
                row.self_citations.to_string(),
                format!("{:.1}", row.self_citation_rate),
                row.influential_citations.to_string(),
                row.co_authors.to_string(),
                row.open_access.to_string(),
                row.retractions.to_string(),
            ]
        })
        .collect();

    export::render_table(&headers, &cells)
}

fn paper_table(papers: &[PaperSummary]) -> String {
    let cells: Vec<Vec<String>> = papers
        .iter()
        .map(|p| {
            vec![
                p.citations.to_string(),
                p.title.clone(),
                p.authors.clone(),
                p.venue.clone(),
                p.year.to_string(),
            ]
        })
        .collect();
    export::render_table(&["Citations", "Title", "Authors", "Venue", "Year"], &cells)
}

fn summary_table(summary: &CategorySummary, agg: Aggregation) -> String {
    let distribution = agg == Aggregation::Distribution;
    let cells: Vec<Vec<String>> = summary
        .entries
        .iter()
        .map(|entry| {
            let mut row = vec![entry.key.to_string(), format_value(entry.value)];
            if distribution {
                row.push(entry.values.len().to_string());
            }
            row
        })
        .collect();

    let headers: &[&str] = if distribution {
        &["Key", "Total", "Values"]
    } else {
        &["Key", "Value"]
    };
    format!("{}\n\n{}", summary.title, export::render_table(headers, &cells))
}

fn venue_text(listing: &VenueListing) -> String {
    let mut out = String::new();
    match (listing.years.first(), listing.years.last()) {
        (Some(first), Some(last)) => out.push_str(&format!("Years: {}-{}\n", first, last)),
        _ => out.push_str("Years: none\n"),
    }
    for (area, venues) in &listing.areas {
        let names: Vec<&str> = venues.iter().map(String::as_str).collect();
        out.push_str(&format!("{}: {}\n", area_name(area), names.join(", ")));
    }
    out
}

/// Whole numbers print without decimals, everything else with two.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}
