//! Path-based ingestion entrypoint.
//!
//! [`ingest_from_path`] reads every record of a delimited text file and reports the outcome to an
//! optional [`IngestionObserver`]:
//!
//! - `on_success` with [`IngestionStats`] when the whole file was read
//! - `on_failure` with a computed severity when it was not
//! - `on_alert` when that severity is at or above [`IngestionOptions::alert_at_or_above`]

use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::StructuredRecord;

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};
use super::reader::read_records_from_path;

/// Options controlling ingestion reporting.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Optional observer for logging/alerts/drop diagnostics.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Records read from one source, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub records: Vec<StructuredRecord>,
    pub stats: IngestionStats,
}

/// Read all records from the file at `path`.
///
/// Arity mismatches and blank lines are skipped and counted; they are not errors. Any I/O
/// failure (missing file, unreadable or non-UTF-8 content) fails the whole call.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
///
/// use csv_user_ingest::ingestion::{ingest_from_path, IngestionOptions, StdErrObserver};
///
/// # fn main() -> Result<(), csv_user_ingest::IngestionError> {
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
/// let ingested = ingest_from_path("users.csv", &opts)?;
/// println!("records={}", ingested.records.len());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Ingested> {
    let path = path.as_ref();
    let ctx = IngestionContext {
        path: path.to_path_buf(),
    };

    let result = read_records_from_path(path).map(|(records, stats)| Ingested {
        records,
        stats: stats.into(),
    });

    match &result {
        Ok(ingested) => {
            tracing::debug!(
                path = %path.display(),
                records = ingested.stats.records,
                blank_lines = ingested.stats.blank_lines,
                shape_mismatches = ingested.stats.shape_mismatches,
                "source read"
            );
            if let Some(obs) = options.observer.as_ref() {
                obs.on_success(&ctx, ingested.stats);
            }
        }
        Err(e) => {
            let sev = severity_for_error(e);
            tracing::error!(path = %path.display(), severity = ?sev, error = %e, "source read failed");
            if let Some(obs) = options.observer.as_ref() {
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

pub(crate) fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::Io(_) => IngestionSeverity::Critical,
        IngestionError::Parquet(err) => {
            // Parquet errors often wrap IO, but not always in a structured way.
            if error_chain_contains_io(err) {
                IngestionSeverity::Critical
            } else {
                IngestionSeverity::Error
            }
        }
        IngestionError::Polars(_)
        | IngestionError::Json(_)
        | IngestionError::Config { .. }
        | IngestionError::Store { .. } => IngestionSeverity::Error,
    }
}

fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::severity_for_error;
    use crate::error::IngestionError;
    use crate::ingestion::IngestionSeverity;

    #[test]
    fn io_errors_are_critical() {
        let e = IngestionError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(severity_for_error(&e), IngestionSeverity::Critical);
    }

    #[test]
    fn store_errors_are_plain_errors() {
        let e = IngestionError::Store {
            message: "not initialized".to_string(),
        };
        assert_eq!(severity_for_error(&e), IngestionSeverity::Error);
    }
}
