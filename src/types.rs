//! Core data model types.
//!
//! Two shapes live here:
//!
//! - the record tree ([`RecordValue`], [`StructuredRecord`]) built from one CSV data line, and the
//!   validated [`NormalizedRow`] derived from it;
//! - the typed table ([`Schema`], [`DataSet`]) that row stores expose for reporting.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A node in a [`StructuredRecord`] tree.
///
/// Serializes to plain JSON (`null`, number, string, object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordValue {
    /// Empty cell.
    Null,
    /// Numeric cell that fits in an `i64`.
    Int(i64),
    /// Any other finite numeric cell.
    Float(f64),
    /// Non-numeric cell.
    Text(String),
    /// Nested mapping created by a dotted header path.
    Map(RecordMap),
}

/// Ordered mapping used for nested record levels.
pub type RecordMap = BTreeMap<String, RecordValue>;

/// Tree-shaped representation of one data line, keyed by top-level header segment.
pub type StructuredRecord = RecordMap;

impl RecordValue {
    /// True for [`RecordValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The nested mapping, or `None` for scalars and null.
    pub fn as_map(&self) -> Option<&RecordMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Textual form of a scalar. `None` for [`RecordValue::Null`] and mappings.
    pub fn text_form(&self) -> Option<String> {
        match self {
            Self::Null | Self::Map(_) => None,
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Text(s) => Some(s.clone()),
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => f.write_str("<unprintable>"),
        }
    }
}

/// A validated row ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRow {
    pub name: String,
    pub age: i64,
    /// Carried through unvalidated.
    pub address: Option<RecordValue>,
    /// Every top-level key other than `name`/`age`/`address`; `None` when there are none.
    pub auxiliary: Option<RecordMap>,
}

/// A row as read back from a [`crate::store::RowStore`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredUser {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub address: Option<serde_json::Value>,
    pub additional_info: Option<serde_json::Value>,
}

/// Logical data type for a table column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// UTF-8 string.
    Utf8,
}

/// A single named, typed column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name.
    pub name: String,
    /// Column data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of columns describing a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed cell in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing value (nullable columns only).
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// UTF-8 string.
    Utf8(String),
}

/// In-memory table.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Collect the non-null `Int64` values of `column`. Empty if the column does not exist.
    pub fn int_column(&self, column: &str) -> Vec<i64> {
        let Some(idx) = self.schema.index_of(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|row| match row.get(idx) {
                Some(Value::Int64(v)) => Some(*v),
                _ => None,
            })
            .collect()
    }
}
