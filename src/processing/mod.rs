//! Record validation and in-memory table operations.
//!
//! - [`normalize()`]: structured record → [`crate::types::NormalizedRow`] or [`DropReason`]
//! - [`filter()`]: row filtering by predicate over a [`crate::types::DataSet`]
//!
//! ## Example: normalize, then count stored ages
//!
//! ```rust
//! use csv_user_ingest::ingestion::build;
//! use csv_user_ingest::processing::{filter, normalize, DropReason, NormalizeOptions};
//! use csv_user_ingest::types::{DataSet, DataType, Field, Schema, Value};
//!
//! let opts = NormalizeOptions::default();
//! let ok = normalize(&build(&["name", "age"], &["Ada", "36"]), &opts).unwrap();
//! let dropped = normalize(&build(&["name", "age"], &["Bob", "151"]), &opts);
//! assert_eq!(dropped, Err(DropReason::AgeOutOfRange { age: 151 }));
//!
//! let schema = Schema::new(vec![Field::new("age", DataType::Int64)]);
//! let ds = DataSet::new(schema, vec![vec![Value::Int64(ok.age)], vec![Value::Int64(70)]]);
//! let over_60 = filter(&ds, |row| matches!(row.first(), Some(Value::Int64(a)) if *a > 60));
//! assert_eq!(over_60.row_count(), 1);
//! ```

pub mod filter;
pub mod normalize;

pub use filter::filter;
pub use normalize::{normalize, DropReason, NormalizeOptions, ZeroAgePolicy};
