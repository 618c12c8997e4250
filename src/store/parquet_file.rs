//! Parquet-file-backed `users` table.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parquet::column::writer::ColumnWriter;
use parquet::data_type::ByteArray;
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::file::writer::SerializedFileWriter;
use parquet::record::Field;
use parquet::schema::parser::parse_message_type;

use crate::error::IngestionResult;
use crate::types::{DataSet, DataType, NormalizedRow, Value};

use super::{store_error, users_schema, RowStore, StoreState, UsersTable};

const USERS_MESSAGE_TYPE: &str = "
message users {
  REQUIRED INT64 id;
  REQUIRED BINARY name (UTF8);
  REQUIRED INT64 age;
  OPTIONAL BINARY address (UTF8);
  OPTIONAL BINARY additional_info (UTF8);
}
";

/// Store that keeps rows in memory and persists them to a Parquet file.
///
/// - [`RowStore::initialize`] loads the file if it exists (missing file → empty table).
/// - [`RowStore::shutdown`] writes the table to a sibling temp file, then renames it over `path`.
#[derive(Debug)]
pub struct ParquetStore {
    path: PathBuf,
    state: StoreState,
    table: UsersTable,
}

impl ParquetStore {
    /// A store backed by `path`. Nothing is read until [`RowStore::initialize`].
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            state: StoreState::Created,
            table: UsersTable::empty(),
        }
    }

    /// The Parquet file this store loads from and writes to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current table to disk without closing the store.
    pub fn flush(&self) -> IngestionResult<()> {
        self.state.ensure_open()?;
        let tmp = self.path.with_extension("parquet.tmp");
        write_users_parquet(&tmp, self.table.data())?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), rows = self.table.data().row_count(), "users table flushed");
        Ok(())
    }
}

impl RowStore for ParquetStore {
    fn initialize(&mut self) -> IngestionResult<()> {
        if self.state == StoreState::Open {
            return Ok(());
        }
        self.table = if self.path.exists() {
            UsersTable::from_dataset(load_users_parquet(&self.path)?)?
        } else {
            UsersTable::empty()
        };
        self.state = StoreState::Open;
        tracing::info!(
            path = %self.path.display(),
            rows = self.table.data().row_count(),
            "parquet store initialized"
        );
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state == StoreState::Open
    }

    fn insert(&mut self, row: &NormalizedRow) -> IngestionResult<i64> {
        self.state.ensure_open()?;
        self.table.insert(row)
    }

    fn table(&self) -> IngestionResult<DataSet> {
        self.state.ensure_open()?;
        Ok(self.table.data().clone())
    }

    fn clear(&mut self) -> IngestionResult<()> {
        self.state.ensure_open()?;
        self.table.clear();
        Ok(())
    }

    fn shutdown(&mut self) -> IngestionResult<()> {
        if self.state != StoreState::Open {
            self.state = StoreState::Closed;
            return Ok(());
        }
        self.flush()?;
        self.state = StoreState::Closed;
        self.table = UsersTable::empty();
        Ok(())
    }
}

/// Read a `users` table from a Parquet file.
///
/// Notes:
/// - Validates that every `users` column exists as a Parquet leaf column
/// - Uses the Parquet record API (`RowIter`)
pub fn load_users_parquet(path: impl AsRef<Path>) -> IngestionResult<DataSet> {
    let schema = users_schema();
    let reader = SerializedFileReader::try_from(path.as_ref())?;

    let available_columns = parquet_leaf_column_paths(&reader);
    for field in &schema.fields {
        if !available_columns.contains(field.name.as_str()) {
            return Err(store_error(format!("missing required column '{}'", field.name)));
        }
    }

    let mut rows: Vec<Vec<Value>> = Vec::new();
    for (idx0, row_res) in reader.into_iter().enumerate() {
        let row_num = idx0 + 1;
        let row = row_res?;

        let mut map: HashMap<&str, &Field> = HashMap::new();
        for (name, field) in row.get_column_iter() {
            map.insert(name.as_str(), field);
        }

        let mut out_row: Vec<Value> = Vec::with_capacity(schema.fields.len());
        for f in &schema.fields {
            let v = map
                .get(f.name.as_str())
                .ok_or_else(|| store_error(format!("row {row_num} missing column '{}'", f.name)))?;
            out_row.push(convert_parquet_field(row_num, &f.name, &f.data_type, v)?);
        }
        rows.push(out_row);
    }

    Ok(DataSet::new(schema, rows))
}

/// Write a `users` table to a Parquet file, replacing any existing file at `path`.
pub fn write_users_parquet(path: impl AsRef<Path>, table: &DataSet) -> IngestionResult<()> {
    if table.schema != users_schema() {
        return Err(store_error("table does not match the users schema"));
    }

    let mut ids = Vec::with_capacity(table.row_count());
    let mut names = Vec::with_capacity(table.row_count());
    let mut ages = Vec::with_capacity(table.row_count());
    let mut addresses = OptionalTextColumn::default();
    let mut infos = OptionalTextColumn::default();
    for (idx0, row) in table.rows.iter().enumerate() {
        match row.as_slice() {
            [Value::Int64(id), Value::Utf8(name), Value::Int64(age), address, info] => {
                ids.push(*id);
                names.push(ByteArray::from(name.as_str()));
                ages.push(*age);
                addresses.push(address);
                infos.push(info);
            }
            _ => return Err(store_error(format!("row {} does not match the users schema", idx0 + 1))),
        }
    }

    let schema = Arc::new(parse_message_type(USERS_MESSAGE_TYPE)?);
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(path.as_ref())?;
    let mut writer = SerializedFileWriter::new(file, schema, props)?;

    if !ids.is_empty() {
        let mut rg = writer.next_row_group()?;
        let mut col_idx: usize = 0;
        while let Some(mut col) = rg.next_column()? {
            match (col_idx, col.untyped()) {
                (0, ColumnWriter::Int64ColumnWriter(w)) => {
                    w.write_batch(&ids, None, None)?;
                }
                (1, ColumnWriter::ByteArrayColumnWriter(w)) => {
                    w.write_batch(&names, None, None)?;
                }
                (2, ColumnWriter::Int64ColumnWriter(w)) => {
                    w.write_batch(&ages, None, None)?;
                }
                (3, ColumnWriter::ByteArrayColumnWriter(w)) => {
                    w.write_batch(&addresses.values, Some(addresses.def_levels.as_slice()), None)?;
                }
                (4, ColumnWriter::ByteArrayColumnWriter(w)) => {
                    w.write_batch(&infos.values, Some(infos.def_levels.as_slice()), None)?;
                }
                _ => return Err(store_error(format!("unexpected parquet column writer at {col_idx}"))),
            }
            col.close()?;
            col_idx += 1;
        }
        rg.close()?;
    }
    writer.close()?;
    Ok(())
}

// Non-null values plus one definition level per row (1 = present, 0 = null).
#[derive(Default)]
struct OptionalTextColumn {
    values: Vec<ByteArray>,
    def_levels: Vec<i16>,
}

impl OptionalTextColumn {
    fn push(&mut self, v: &Value) {
        match v {
            Value::Utf8(s) => {
                self.values.push(ByteArray::from(s.as_str()));
                self.def_levels.push(1);
            }
            _ => self.def_levels.push(0),
        }
    }
}

fn parquet_leaf_column_paths<R: ChunkReader + 'static>(reader: &SerializedFileReader<R>) -> HashSet<String> {
    let mut set = HashSet::new();
    let cols = reader.metadata().file_metadata().schema_descr().columns();
    for c in cols {
        set.insert(c.path().string());
    }
    set
}

fn convert_parquet_field(row: usize, column: &str, data_type: &DataType, f: &Field) -> IngestionResult<Value> {
    match (data_type, f) {
        (_, Field::Null) => Ok(Value::Null),
        (DataType::Utf8, Field::Str(s)) => Ok(Value::Utf8(s.clone())),
        (DataType::Int64, Field::Long(v)) => Ok(Value::Int64(*v)),
        (DataType::Int64, Field::Int(v)) => Ok(Value::Int64(i64::from(*v))),
        _ => Err(store_error(format!(
            "row {row} column '{column}': unexpected parquet value {f}"
        ))),
    }
}
