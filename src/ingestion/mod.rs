//! Text-to-record ingestion.
//!
//! Most callers should use [`ingest_from_path`] (from [`source`]) which:
//!
//! - reads a comma-delimited file whose first non-blank line is a header row
//! - turns every data line into a nested [`crate::types::StructuredRecord`] using dotted header
//!   paths (`name.firstName`)
//! - optionally reports success/failure/alerts to an [`IngestionObserver`]
//!
//! The building blocks are public too:
//! - [`tokenizer`]: one line → fields
//! - [`coerce`]: one field → null/number/text
//! - [`record`]: header paths + fields → nested record
//! - [`reader`]: lazy record iterator over a buffered source

pub mod coerce;
pub mod observability;
pub mod reader;
pub mod record;
pub mod source;
pub mod tokenizer;

pub use coerce::coerce;
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver,
};
pub use reader::{read_records_from_path, read_records_from_str, ReaderStats, SourceReader};
pub use record::{build, HeaderPath, RecordBuilder};
pub use source::{ingest_from_path, Ingested, IngestionOptions};
pub use tokenizer::tokenize;
