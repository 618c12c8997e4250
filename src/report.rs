//! Age distribution report over a stored `users` table.
//!
//! Buckets: `age < 20`, `20 <= age < 40`, `40 <= age <= 60`, `age > 60`. Percentages are
//! formatted with two decimals. An empty table yields [`AgeReport::NoData`].
//!
//! With the `sql` feature (default) the bucket counts come from an SQL aggregate over a Polars
//! frame; without it, by counting rows kept by [`crate::processing::filter`].

use serde::Serialize;

use crate::error::IngestionResult;
use crate::store::AGE_COLUMN;
use crate::types::DataSet;

pub const NO_DATA_MESSAGE: &str = "No data available";

/// Row counts per age bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AgeBucketCounts {
    pub under_20: u64,
    pub age_20_40: u64,
    pub age_40_60: u64,
    pub age_60_plus: u64,
    pub total: u64,
}

/// Percentage per bucket, as two-decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgeDistribution {
    #[serde(rename = "< 20")]
    pub under_20: String,
    #[serde(rename = "20 to 40")]
    pub age_20_40: String,
    #[serde(rename = "40 to 60")]
    pub age_40_60: String,
    #[serde(rename = "> 60")]
    pub age_60_plus: String,
}

/// Report payload. Serializes as `{"message": ...}` or `{"distribution": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AgeReport {
    NoData { message: String },
    Distribution { distribution: AgeDistribution },
}

impl AgeReport {
    /// `NoData` when `total` is zero, percentages otherwise.
    pub fn from_counts(counts: &AgeBucketCounts) -> Self {
        if counts.total == 0 {
            return Self::NoData {
                message: NO_DATA_MESSAGE.to_string(),
            };
        }
        let pct = |n: u64| format!("{:.2}", n as f64 / counts.total as f64 * 100.0);
        Self::Distribution {
            distribution: AgeDistribution {
                under_20: pct(counts.under_20),
                age_20_40: pct(counts.age_20_40),
                age_40_60: pct(counts.age_40_60),
                age_60_plus: pct(counts.age_60_plus),
            },
        }
    }

    /// Plain-text table, one bucket per line.
    pub fn to_table(&self) -> String {
        match self {
            Self::NoData { message } => message.clone(),
            Self::Distribution { distribution: d } => format!(
                "Age-Group | % Distribution\n\
                 ---------------------------\n\
                 < 20      | {}\n\
                 20 to 40  | {}\n\
                 40 to 60  | {}\n\
                 > 60      | {}\n\
                 ---------------------------",
                d.under_20, d.age_20_40, d.age_40_60, d.age_60_plus
            ),
        }
    }
}

/// Build the age distribution report for a `users` table.
pub fn age_distribution(table: &DataSet) -> IngestionResult<AgeReport> {
    let counts = age_bucket_counts(table)?;
    Ok(AgeReport::from_counts(&counts))
}

/// Count rows per age bucket. Rows whose age is null are ignored.
#[cfg(feature = "sql")]
pub fn age_bucket_counts(table: &DataSet) -> IngestionResult<AgeBucketCounts> {
    sql::bucket_counts(&table.int_column(AGE_COLUMN))
}

/// Count rows per age bucket. Rows whose age is null are ignored.
#[cfg(not(feature = "sql"))]
pub fn age_bucket_counts(table: &DataSet) -> IngestionResult<AgeBucketCounts> {
    use crate::processing::filter;
    use crate::types::Value;

    let Some(idx) = table.schema.index_of(AGE_COLUMN) else {
        return Ok(AgeBucketCounts::default());
    };
    let count = |pred: &dyn Fn(i64) -> bool| -> u64 {
        let subset = filter(table, |row| matches!(row.get(idx), Some(Value::Int64(a)) if pred(*a)));
        subset.row_count() as u64
    };

    Ok(AgeBucketCounts {
        under_20: count(&|a| a < 20),
        age_20_40: count(&|a| (20..40).contains(&a)),
        age_40_60: count(&|a| (40..=60).contains(&a)),
        age_60_plus: count(&|a| a > 60),
        total: count(&|_| true),
    })
}

#[cfg(feature = "sql")]
mod sql {
    use polars::prelude::*;
    use polars_sql::SQLContext;

    use super::AgeBucketCounts;
    use crate::error::IngestionResult;

    const AGE_BUCKETS_SQL: &str = "
        SELECT
          SUM(CASE WHEN age < 20 THEN 1 ELSE 0 END) AS under_20,
          SUM(CASE WHEN age >= 20 AND age < 40 THEN 1 ELSE 0 END) AS age_20_40,
          SUM(CASE WHEN age >= 40 AND age <= 60 THEN 1 ELSE 0 END) AS age_40_60,
          SUM(CASE WHEN age > 60 THEN 1 ELSE 0 END) AS age_60_plus,
          COUNT(*) AS total
        FROM users
    ";

    pub(super) fn bucket_counts(ages: &[i64]) -> IngestionResult<AgeBucketCounts> {
        if ages.is_empty() {
            return Ok(AgeBucketCounts::default());
        }

        let frame = df!("age" => ages)?;
        let mut ctx = SQLContext::new();
        ctx.register("users", frame.lazy());
        let out = ctx.execute(AGE_BUCKETS_SQL)?.collect()?;

        Ok(AgeBucketCounts {
            under_20: scalar_u64(&out, "under_20")?,
            age_20_40: scalar_u64(&out, "age_20_40")?,
            age_40_60: scalar_u64(&out, "age_40_60")?,
            age_60_plus: scalar_u64(&out, "age_60_plus")?,
            total: scalar_u64(&out, "total")?,
        })
    }

    fn scalar_u64(frame: &DataFrame, name: &str) -> PolarsResult<u64> {
        let series = frame.column(name)?.as_materialized_series().cast(&DataType::Int64)?;
        let value = series.i64()?.get(0).unwrap_or(0);
        Ok(u64::try_from(value).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::{age_bucket_counts, age_distribution, AgeBucketCounts, AgeReport};
    use crate::store::users_schema;
    use crate::types::{DataSet, Value};

    fn users_with_ages(ages: &[i64]) -> DataSet {
        let rows = ages
            .iter()
            .enumerate()
            .map(|(i, a)| {
                vec![
                    Value::Int64(i as i64 + 1),
                    Value::Utf8(format!("u{i}")),
                    Value::Int64(*a),
                    Value::Null,
                    Value::Null,
                ]
            })
            .collect();
        DataSet::new(users_schema(), rows)
    }

    #[test]
    fn one_row_per_bucket_is_a_quarter_each() {
        let report = age_distribution(&users_with_ages(&[10, 25, 45, 70])).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "distribution": {"< 20": "25.00", "20 to 40": "25.00", "40 to 60": "25.00", "> 60": "25.00"}
            })
        );
    }

    #[test]
    fn bucket_edges() {
        let counts = age_bucket_counts(&users_with_ages(&[19, 20, 39, 40, 60, 61])).unwrap();
        assert_eq!(
            counts,
            AgeBucketCounts {
                under_20: 1,
                age_20_40: 2,
                age_40_60: 2,
                age_60_plus: 1,
                total: 6,
            }
        );
    }

    #[test]
    fn empty_table_has_no_data() {
        let report = age_distribution(&users_with_ages(&[])).unwrap();
        assert_eq!(serde_json::to_value(&report).unwrap(), serde_json::json!({"message": "No data available"}));
        assert_eq!(report.to_table(), "No data available");
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        let report = AgeReport::from_counts(&AgeBucketCounts {
            under_20: 1,
            age_20_40: 2,
            age_40_60: 0,
            age_60_plus: 0,
            total: 3,
        });
        let AgeReport::Distribution { distribution } = report else {
            panic!("expected a distribution");
        };
        assert_eq!(distribution.under_20, "33.33");
        assert_eq!(distribution.age_20_40, "66.67");
        assert_eq!(distribution.age_40_60, "0.00");
    }
}
