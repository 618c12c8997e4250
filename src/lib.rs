//! `csv-user-ingest` reads a comma-delimited file of user records, reshapes each row into a nested
//! record using dotted header paths, validates it, stores the accepted rows, and reports an age
//! distribution over everything stored.
//!
//! The primary entrypoint is [`pipeline::process_path`]. Its building blocks are public:
//!
//! - [`ingestion`]: tokenizer, value coercion, nested record builder, and the lazy source reader
//! - [`processing`]: record normalization plus row filtering over in-memory tables
//! - [`execution`]: parallel, order-preserving normalization with metrics
//! - [`store`]: the [`store::RowStore`] trait with in-memory and Parquet-backed implementations
//! - [`report`]: the age distribution report
//! - [`commands`]: report/users/clear/health operations and their response bodies
//! - [`config`]: environment-based configuration for the `ingest-users` binary
//!
//! ## Input format
//!
//! The first non-blank line is the header row. A header such as `name.firstName` places the value
//! at `{"name": {"firstName": ...}}`. Fields may be quoted; `""` inside quotes is a literal quote.
//! Data lines whose field count differs from the header are skipped and counted.
//!
//! Values are coerced per field: empty → null, numeric text → integer or float, anything else →
//! text.
//!
//! ## Validation
//!
//! A record is stored when it has a non-empty `name` (either text or a map with
//! `firstName`/`lastName`) and an integer `age` within `0..=150`. Everything other than `name`,
//! `age` and `address` goes to the row's auxiliary data.
//!
//! ## Quick example
//!
//! ```no_run
//! use csv_user_ingest::pipeline::{process_path, PipelineOptions};
//! use csv_user_ingest::store::{MemoryStore, RowStore};
//!
//! # fn main() -> Result<(), csv_user_ingest::IngestionError> {
//! let mut store = MemoryStore::new();
//! store.initialize()?;
//! let outcome = process_path("users.csv", &mut store, &PipelineOptions::default())?;
//! println!("inserted={} dropped={}", outcome.inserted, outcome.dropped);
//! println!("{}", outcome.report.to_table());
//! store.shutdown()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Building blocks
//!
//! ```rust
//! use csv_user_ingest::ingestion::{read_records_from_str, tokenize};
//! use csv_user_ingest::processing::{normalize, NormalizeOptions};
//!
//! assert_eq!(tokenize(r#""Smith, John",40"#), vec!["Smith, John", "40"]);
//!
//! let (records, stats) = read_records_from_str("name.firstName,name.lastName,age\nJane,Doe,25\n").unwrap();
//! assert_eq!(stats.records, 1);
//! let row = normalize(&records[0], &NormalizeOptions::default()).unwrap();
//! assert_eq!((row.name.as_str(), row.age), ("Jane Doe", 25));
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod execution;
pub mod ingestion;
pub mod pipeline;
pub mod processing;
pub mod report;
pub mod store;
pub mod types;

pub use error::{IngestionError, IngestionResult};
