use thiserror::Error;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by ingestion, storage, and reporting functions.
///
/// Rows that are skipped (blank lines, arity mismatches, failed validation) are never reported
/// through this type; see [`crate::processing::DropReason`] and
/// [`crate::ingestion::IngestionObserver::on_drop`].
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied, invalid UTF-8).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Parquet store read/write error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Report aggregation error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// JSON (de)serialization of stored structured columns.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or malformed configuration.
    #[error("config error: {message}")]
    Config { message: String },

    /// The row store rejected an operation (not initialized, shut down, bad row).
    #[error("store error: {message}")]
    Store { message: String },
}
