//! Custom error types for pubmetrics.
//!
//! The record store and aggregator never fail; these errors only come out of
//! the boundary code (loading files, reading configuration, writing output).

use thiserror::Error;

/// Main error type for pubmetrics operations.
#[derive(Debug, Error)]
pub enum PubMetricsError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A column, metric or aggregation name that is not recognised
    #[error("Unknown {kind}: {name}")]
    UnknownName {
        /// What was being parsed ("column", "metric", ...)
        kind: &'static str,
        /// The offending input
        name: String,
    },
}

impl PubMetricsError {
    /// Create an unknown-name error.
    pub fn unknown(kind: &'static str, name: impl Into<String>) -> Self {
        Self::UnknownName {
            kind,
            name: name.into(),
        }
    }
}

/// Result type alias using `PubMetricsError`
pub type Result<T> = std::result::Result<T, PubMetricsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_name_message() {
        let err = PubMetricsError::unknown("column", "journal");
        assert_eq!(err.to_string(), "Unknown column: journal");
    }
}
