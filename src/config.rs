//! Process configuration read from environment variables.
//!
//! | Variable               | Meaning                                                      |
//! |------------------------|--------------------------------------------------------------|
//! | `CSV_FILE_PATH`        | input file; required by `process`                            |
//! | `USERS_STORE_PATH`     | Parquet file backing the store; in-memory store when unset   |
//! | `INGEST_THREADS`       | positive integer; normalizes on the parallel engine when set |
//! | `ALLOW_ZERO_AGE`       | `true`/`false` (also `1`/`0`, `yes`/`no`); default `false`   |
//! | `INGEST_STDERR_EVENTS` | boolean; echo ingestion events to stderr                     |
//! | `INGEST_EVENT_LOG`     | file that ingestion events are appended to                   |

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::execution::ExecutionOptions;
use crate::ingestion::{CompositeObserver, FileObserver, IngestionObserver, IngestionOptions, StdErrObserver};
use crate::pipeline::PipelineOptions;
use crate::processing::{NormalizeOptions, ZeroAgePolicy};
use crate::store::{MemoryStore, ParquetStore, RowStore};

pub const CSV_FILE_PATH_VAR: &str = "CSV_FILE_PATH";
pub const USERS_STORE_PATH_VAR: &str = "USERS_STORE_PATH";
pub const INGEST_THREADS_VAR: &str = "INGEST_THREADS";
pub const ALLOW_ZERO_AGE_VAR: &str = "ALLOW_ZERO_AGE";
pub const STDERR_EVENTS_VAR: &str = "INGEST_STDERR_EVENTS";
pub const EVENT_LOG_VAR: &str = "INGEST_EVENT_LOG";

/// Settings for one `ingest-users` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Input file for `process`.
    pub csv_file_path: Option<PathBuf>,
    /// Parquet file backing the store. `None` selects [`MemoryStore`].
    pub store_path: Option<PathBuf>,
    /// Worker threads for parallel normalization. `None` normalizes sequentially.
    pub threads: Option<usize>,
    /// Store records whose age is exactly zero.
    pub allow_zero_age: bool,
    /// Attach a [`StdErrObserver`].
    pub stderr_events: bool,
    /// Attach a [`FileObserver`] appending to this file.
    pub event_log: Option<PathBuf>,
}

impl AppConfig {
    /// Load from the process environment.
    pub fn from_env() -> IngestionResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> IngestionResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let flag = |key: &str| -> IngestionResult<bool> {
            match get(key) {
                None => Ok(false),
                Some(raw) => parse_bool(&raw).ok_or_else(|| config_error(format!("{key} must be a boolean, got '{raw}'"))),
            }
        };

        let threads = match get(INGEST_THREADS_VAR) {
            None => None,
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    return Err(config_error(format!(
                        "{INGEST_THREADS_VAR} must be a positive integer, got '{raw}'"
                    )));
                }
            },
        };

        Ok(Self {
            csv_file_path: get(CSV_FILE_PATH_VAR).map(PathBuf::from),
            store_path: get(USERS_STORE_PATH_VAR).map(PathBuf::from),
            threads,
            allow_zero_age: flag(ALLOW_ZERO_AGE_VAR)?,
            stderr_events: flag(STDERR_EVENTS_VAR)?,
            event_log: get(EVENT_LOG_VAR).map(PathBuf::from),
        })
    }

    /// The input file, or a config error naming the missing variable.
    pub fn input_path(&self) -> IngestionResult<&Path> {
        self.csv_file_path
            .as_deref()
            .ok_or_else(|| config_error(format!("{CSV_FILE_PATH_VAR} is not set")))
    }

    /// Pipeline options implied by this configuration.
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            ingestion: IngestionOptions {
                observer: self.observer(),
                ..Default::default()
            },
            normalize: NormalizeOptions {
                zero_age: if self.allow_zero_age {
                    ZeroAgePolicy::Accept
                } else {
                    ZeroAgePolicy::TreatAsMissing
                },
            },
            execution: self.threads.map(ExecutionOptions::with_threads),
        }
    }

    /// The configured store, not yet initialized.
    pub fn build_store(&self) -> Box<dyn RowStore> {
        match &self.store_path {
            Some(path) => Box::new(ParquetStore::new(path)),
            None => Box::new(MemoryStore::new()),
        }
    }

    fn observer(&self) -> Option<Arc<dyn IngestionObserver>> {
        let mut observers: Vec<Arc<dyn IngestionObserver>> = Vec::new();
        if self.stderr_events {
            observers.push(Arc::new(StdErrObserver));
        }
        if let Some(path) = &self.event_log {
            observers.push(Arc::new(FileObserver::new(path)));
        }
        match observers.len() {
            0 => None,
            1 => observers.pop(),
            _ => Some(Arc::new(CompositeObserver::new(observers))),
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn config_error(message: String) -> IngestionError {
    IngestionError::Config { message }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::AppConfig;
    use crate::pipeline::process_path;
    use crate::processing::ZeroAgePolicy;
    use crate::store::MemoryStore;

    fn config_from(pairs: &[(&str, &str)]) -> crate::IngestionResult<AppConfig> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let cfg = config_from(&[("CSV_FILE_PATH", "/data/users.csv")]).unwrap();
        assert_eq!(cfg.input_path().unwrap(), Path::new("/data/users.csv"));
        assert_eq!(cfg.store_path, None);
        assert_eq!(cfg.threads, None);
        assert!(!cfg.allow_zero_age);
        assert!(!cfg.stderr_events);

        let opts = cfg.pipeline_options();
        assert_eq!(opts.normalize.zero_age, ZeroAgePolicy::TreatAsMissing);
        assert!(opts.execution.is_none());
        assert!(opts.ingestion.observer.is_none());
        assert!(!cfg.build_store().is_open());
    }

    #[test]
    fn input_path_is_only_required_when_asked_for() {
        let cfg = config_from(&[]).unwrap();
        assert!(cfg.input_path().is_err());
        assert!(config_from(&[("CSV_FILE_PATH", "  ")]).unwrap().input_path().is_err());
    }

    #[test]
    fn optional_settings_are_parsed() {
        let cfg = config_from(&[
            ("CSV_FILE_PATH", "in.csv"),
            ("USERS_STORE_PATH", "users.parquet"),
            ("INGEST_THREADS", "3"),
            ("ALLOW_ZERO_AGE", "Yes"),
            ("INGEST_STDERR_EVENTS", "1"),
        ])
        .unwrap();
        assert_eq!(cfg.store_path, Some(PathBuf::from("users.parquet")));
        assert_eq!(cfg.threads, Some(3));
        assert!(cfg.stderr_events);

        let opts = cfg.pipeline_options();
        assert_eq!(opts.normalize.zero_age, ZeroAgePolicy::Accept);
        assert!(opts.ingestion.observer.is_some());
        assert_eq!(opts.execution.map(|e| e.num_threads), Some(Some(3)));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("INGEST_THREADS", "0")]).is_err());
        assert!(config_from(&[("INGEST_THREADS", "many")]).is_err());
        assert!(config_from(&[("ALLOW_ZERO_AGE", "maybe")]).is_err());
        assert!(config_from(&[("INGEST_STDERR_EVENTS", "loud")]).is_err());
    }

    #[test]
    fn configured_observers_receive_pipeline_events() {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
        let log_path = std::env::temp_dir().join(format!("csv-user-ingest-config-{nanos}.log"));
        let log = log_path.to_string_lossy().into_owned();
        let cfg = config_from(&[
            ("CSV_FILE_PATH", "tests/fixtures/users.csv"),
            ("INGEST_STDERR_EVENTS", "true"),
            ("INGEST_EVENT_LOG", log.as_str()),
        ])
        .unwrap();

        let mut store = MemoryStore::new();
        process_path(cfg.input_path().unwrap(), &mut store, &cfg.pipeline_options()).unwrap();

        let written = std::fs::read_to_string(&log_path).unwrap();
        let _ = std::fs::remove_file(&log_path);
        assert!(written.contains(" ok path="));
        assert_eq!(written.matches(" drop path=").count(), 4);
    }
}
