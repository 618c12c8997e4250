//! Execution engine for normalizing records with configurable parallelism.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel (chunked) normalization whose output keeps input order
//! - Resource limits / throttling (in-flight chunks)
//! - Real-time metrics + observer hooks for monitoring

mod observer;
mod semaphore;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;

use crate::error::{IngestionError, IngestionResult};
use crate::processing::{normalize, DropReason, NormalizeOptions};
use crate::types::{NormalizedRow, StructuredRecord};

pub use observer::{
    ExecutionEvent, ExecutionMetrics, ExecutionMetricsSnapshot, ExecutionObserver, TracingExecutionObserver,
};

use semaphore::Semaphore;

/// Configuration for the [`ExecutionEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Number of worker threads used by the engine.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Number of records per chunk.
    pub chunk_size: usize,
    /// Upper bound on concurrently executing chunks.
    ///
    /// This is an additional throttle on top of `num_threads`.
    pub max_in_flight_chunks: usize,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = available_threads();
        Self {
            num_threads: Some(n),
            chunk_size: 1_024,
            max_in_flight_chunks: n,
        }
    }
}

impl ExecutionOptions {
    /// Options for a fixed thread count, with one in-flight chunk per thread.
    pub fn with_threads(n: usize) -> Self {
        Self {
            num_threads: Some(n),
            max_in_flight_chunks: n.max(1),
            ..Default::default()
        }
    }
}

/// Per-record normalization outcome, in input order.
pub type NormalizeOutcome = Result<NormalizedRow, DropReason>;

/// A configurable execution engine for record normalization.
pub struct ExecutionEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn ExecutionObserver>>,
    metrics: Arc<ExecutionMetrics>,
}

impl ExecutionEngine {
    /// Create a new engine with the given options.
    ///
    /// Fails with [`IngestionError::Config`] if `chunk_size == 0`, `max_in_flight_chunks == 0`,
    /// `num_threads == Some(0)`, or the thread pool cannot be built.
    pub fn new(opts: ExecutionOptions) -> IngestionResult<Self> {
        if opts.chunk_size == 0 {
            return Err(config_error("chunk_size must be > 0"));
        }
        if opts.max_in_flight_chunks == 0 {
            return Err(config_error("max_in_flight_chunks must be > 0"));
        }
        if opts.num_threads == Some(0) {
            return Err(config_error("num_threads must be > 0 when set"));
        }

        let n_threads = opts.num_threads.unwrap_or_else(available_threads);
        let pool = ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .map_err(|e| config_error(&format!("failed to build thread pool: {e}")))?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(ExecutionMetrics::new()),
        })
    }

    /// Attach an observer for execution events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn ExecutionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time execution metrics.
    pub fn metrics(&self) -> Arc<ExecutionMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Normalize every record in parallel chunks.
    ///
    /// The returned vector has one outcome per input record, in input order.
    pub fn normalize_parallel(&self, records: &[StructuredRecord], options: &NormalizeOptions) -> Vec<NormalizeOutcome> {
        self.pool.install(|| self.normalize_parallel_impl(records, options))
    }

    fn normalize_parallel_impl(&self, records: &[StructuredRecord], options: &NormalizeOptions) -> Vec<NormalizeOutcome> {
        let start = Instant::now();
        self.metrics.begin_run();
        self.emit(ExecutionEvent::RunStarted);

        let sem = Semaphore::new(self.opts.max_in_flight_chunks);
        let chunk_ranges = chunk_ranges(records.len(), self.opts.chunk_size);

        let per_chunk: Vec<Vec<NormalizeOutcome>> = chunk_ranges
            .into_par_iter()
            .map(|range| {
                let waited = sem.acquire();
                if waited > Duration::ZERO {
                    self.metrics.on_throttle_wait(waited);
                    self.emit(ExecutionEvent::ThrottleWaited { duration: waited });
                }

                self.metrics.on_chunk_start();
                self.emit(ExecutionEvent::ChunkStarted {
                    start_record: range.start,
                    record_count: range.end - range.start,
                });

                let mut out = Vec::with_capacity(range.end - range.start);
                let mut dropped = 0usize;
                for record in &records[range] {
                    let outcome = normalize(record, options);
                    self.metrics.on_record_processed(outcome.is_err());
                    if outcome.is_err() {
                        dropped += 1;
                    }
                    out.push(outcome);
                }

                self.emit(ExecutionEvent::ChunkFinished {
                    accepted: out.len() - dropped,
                    dropped,
                });
                self.metrics.on_chunk_end();
                sem.release();
                out
            })
            .collect();

        let out = per_chunk.into_iter().flatten().collect::<Vec<_>>();

        self.metrics.end_run(start.elapsed());
        self.emit(ExecutionEvent::RunFinished {
            elapsed: start.elapsed(),
            metrics: self.metrics.snapshot(),
        });

        out
    }

    fn emit(&self, event: ExecutionEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

fn available_threads() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

fn config_error(message: &str) -> IngestionError {
    IngestionError::Config {
        message: message.to_string(),
    }
}

fn chunk_ranges(row_count: usize, chunk_size: usize) -> Vec<std::ops::Range<usize>> {
    if row_count == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(row_count.div_ceil(chunk_size));
    let mut start = 0usize;
    while start < row_count {
        let end = (start + chunk_size).min(row_count);
        out.push(start..end);
        start = end;
    }
    out
}
