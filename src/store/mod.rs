//! Row stores: where normalized rows are persisted.
//!
//! A store is a process-scoped resource. Callers create it, call [`RowStore::initialize`] before
//! first use, inject it into [`crate::pipeline::process_path`], and call
//! [`RowStore::shutdown`] when done. Operations on a store that is not open fail with
//! [`IngestionError::Store`].
//!
//! Every store exposes its contents as a typed `users` table ([`users_schema`]) so reporting can
//! run over any implementation.

mod memory;
mod parquet_file;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, NormalizedRow, Schema, StoredUser, Value};

pub use memory::MemoryStore;
pub use parquet_file::{load_users_parquet, write_users_parquet, ParquetStore};

pub const ID_COLUMN: &str = "id";
pub const NAME_COLUMN: &str = "name";
pub const AGE_COLUMN: &str = "age";
pub const ADDRESS_COLUMN: &str = "address";
pub const ADDITIONAL_INFO_COLUMN: &str = "additional_info";

/// Column layout of the `users` table.
///
/// `address` and `additional_info` hold JSON text or null.
pub fn users_schema() -> Schema {
    Schema::new(vec![
        Field::new(ID_COLUMN, DataType::Int64),
        Field::new(NAME_COLUMN, DataType::Utf8),
        Field::new(AGE_COLUMN, DataType::Int64),
        Field::new(ADDRESS_COLUMN, DataType::Utf8),
        Field::new(ADDITIONAL_INFO_COLUMN, DataType::Utf8),
    ])
}

/// Persistence collaborator for normalized rows.
pub trait RowStore: Send {
    /// Prepare the store (create or load the table). Idempotent while open.
    fn initialize(&mut self) -> IngestionResult<()>;

    /// Whether [`Self::initialize`] has run and [`Self::shutdown`] has not.
    fn is_open(&self) -> bool;

    /// Insert one row and return its id. Ids start at 1.
    fn insert(&mut self, row: &NormalizedRow) -> IngestionResult<i64>;

    /// Snapshot of the `users` table.
    fn table(&self) -> IngestionResult<DataSet>;

    /// Remove every row and restart ids at 1.
    fn clear(&mut self) -> IngestionResult<()>;

    /// Release the store. Further operations fail until it is initialized again.
    fn shutdown(&mut self) -> IngestionResult<()>;

    /// Health check: succeeds when the store is open.
    fn ping(&self) -> IngestionResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(store_error("store is not open"))
        }
    }

    /// All stored rows with structured columns decoded from JSON.
    fn users(&self) -> IngestionResult<Vec<StoredUser>> {
        users_from_table(&self.table()?)
    }
}

pub(crate) fn store_error(message: impl Into<String>) -> IngestionError {
    IngestionError::Store {
        message: message.into(),
    }
}

/// Lifecycle of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StoreState {
    Created,
    Open,
    Closed,
}

impl StoreState {
    pub(crate) fn ensure_open(self) -> IngestionResult<()> {
        match self {
            Self::Open => Ok(()),
            Self::Created => Err(store_error("store used before initialize")),
            Self::Closed => Err(store_error("store used after shutdown")),
        }
    }
}

/// In-memory `users` table shared by the store implementations.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct UsersTable {
    data: DataSet,
    next_id: i64,
}

impl UsersTable {
    pub(crate) fn empty() -> Self {
        Self {
            data: DataSet::new(users_schema(), Vec::new()),
            next_id: 1,
        }
    }

    /// Adopt previously stored rows; ids continue after the largest stored id.
    pub(crate) fn from_dataset(data: DataSet) -> IngestionResult<Self> {
        if data.schema != users_schema() {
            return Err(store_error("stored table does not match the users schema"));
        }
        let next_id = data.int_column(ID_COLUMN).into_iter().max().unwrap_or(0) + 1;
        Ok(Self { data, next_id })
    }

    pub(crate) fn insert(&mut self, row: &NormalizedRow) -> IngestionResult<i64> {
        let address = row.address.as_ref().map(serde_json::to_string).transpose()?;
        let additional_info = row.auxiliary.as_ref().map(serde_json::to_string).transpose()?;

        let id = self.next_id;
        self.data.rows.push(vec![
            Value::Int64(id),
            Value::Utf8(row.name.clone()),
            Value::Int64(row.age),
            address.map(Value::Utf8).unwrap_or(Value::Null),
            additional_info.map(Value::Utf8).unwrap_or(Value::Null),
        ]);
        self.next_id += 1;
        Ok(id)
    }

    pub(crate) fn clear(&mut self) {
        self.data.rows.clear();
        self.next_id = 1;
    }

    pub(crate) fn data(&self) -> &DataSet {
        &self.data
    }
}

/// Decode a `users` table into [`StoredUser`]s.
pub fn users_from_table(table: &DataSet) -> IngestionResult<Vec<StoredUser>> {
    table.rows.iter().map(|row| user_from_row(row)).collect()
}

fn user_from_row(row: &[Value]) -> IngestionResult<StoredUser> {
    let int = |i: usize| match row.get(i) {
        Some(Value::Int64(v)) => Ok(*v),
        other => Err(store_error(format!("expected integer in column {i}, found {other:?}"))),
    };
    let json = |i: usize| match row.get(i) {
        Some(Value::Utf8(s)) => serde_json::from_str::<serde_json::Value>(s)
            .map(Some)
            .map_err(IngestionError::from),
        Some(Value::Null) | None => Ok(None),
        Some(other) => Err(store_error(format!("expected JSON text in column {i}, found {other:?}"))),
    };

    let name = match row.get(1) {
        Some(Value::Utf8(s)) => s.clone(),
        other => return Err(store_error(format!("expected name text, found {other:?}"))),
    };

    Ok(StoredUser {
        id: int(0)?,
        name,
        age: int(2)?,
        address: json(3)?,
        additional_info: json(4)?,
    })
}
