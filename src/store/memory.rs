use crate::error::IngestionResult;
use crate::types::{DataSet, NormalizedRow};

use super::{RowStore, StoreState, UsersTable};

/// Process-local store. Contents are lost on shutdown.
#[derive(Debug)]
pub struct MemoryStore {
    state: StoreState,
    table: UsersTable,
}

impl MemoryStore {
    /// An empty store. Call [`RowStore::initialize`] before use.
    pub fn new() -> Self {
        Self {
            state: StoreState::Created,
            table: UsersTable::empty(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RowStore for MemoryStore {
    fn initialize(&mut self) -> IngestionResult<()> {
        if self.state != StoreState::Open {
            self.table = UsersTable::empty();
            self.state = StoreState::Open;
            tracing::debug!("memory store initialized");
        }
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
        self.state = StoreState::Closed;
        self.table = UsersTable::empty();
        Ok(())
    }
}
