use thiserror::Error;

/// Fatal load-time failures. Nothing is aggregated or rendered after one of
/// these; per-record parse problems are not errors (see `dataset::ParseIssue`).
#[derive(Debug, Error)]
pub enum DataLoadError {
    #[error("failed to read dataset source: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("required column '{column}' not found (available columns: {available})")]
    MissingColumn { column: String, available: String },
}

/// An aggregate operation was invoked with inconsistent inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("desired bin count must be at least 1")]
    InvalidBinCount,

    #[error("secondary category list must not be empty")]
    EmptySecondaryCategories,
}
