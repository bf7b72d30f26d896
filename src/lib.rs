//! # pubmetrics
//!
//! Author and venue metrics over a publication dataset.
//!
//! ## Modules
//!
//! - [`loader`] - CSV/JSON ingestion and field coercion
//! - [`store`] - Exploded per-author records and grouping
//! - [`filter`] - Year range / venue set predicate
//! - [`aggregate`] - Per-author metrics (h-index, co-authors, self-citations)
//! - [`report`] - Ranked author table
//! - [`summary`] - Category summaries and top papers
//! - [`export`] - CSV, JSON and text table output
//! - [`config`] - Defaults and environment overrides
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pubmetrics::{compute_author_metrics, config::Config, loader};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let store = loader::load(&config.data_path, &config.columns)?;
//!     let filter = config.default_filter(&store);
//!     let metrics = compute_author_metrics(&store, Some(&filter));
//!     println!("{} authors", metrics.len());
//!     Ok(())
//! }
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod record;
pub mod report;
pub mod store;
pub mod summary;

pub use aggregate::{compute_author_metrics, AuthorMetrics};
pub use error::{PubMetricsError, Result};
pub use filter::Filter;
pub use record::{Column, Record};
pub use store::RecordStore;
