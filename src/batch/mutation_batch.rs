use std::collections::HashMap;

use crate::util::{Result, Slice, Status};

/// One staged change to a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOp {
    Put {
        name: Slice,
        value: Slice,
        ttl: Option<u32>,
    },
    Delete {
        name: Slice,
    },
    /// Remove every column of the row.
    DeleteRow,
}

/// Staged changes for a single row of one column family.
#[derive(Debug, Clone)]
pub struct RowMutation {
    column_family: String,
    key: Slice,
    ops: Vec<ColumnOp>,
}

impl RowMutation {
    pub fn column_family(&self) -> &str {
        &self.column_family
    }

    pub fn key(&self) -> &Slice {
        &self.key
    }

    pub fn ops(&self) -> &[ColumnOp] {
        &self.ops
    }
}

/// MutationBatch accumulates row changes for one keyspace and is handed to
/// the driver as a single atomic round trip.
///
/// Changes to the same row are grouped under one `RowMutation`, in the order
/// they were staged.
pub struct MutationBatch {
    keyspace: String,
    /// Rows in first-touched order
    rows: Vec<RowMutation>,
    /// (column family, row key) -> index into `rows`
    index: HashMap<(String, Slice), usize>,
    /// Approximate payload size in bytes
    data_size: usize,
}

impl MutationBatch {
    #[inline]
    pub fn new(keyspace: impl Into<String>) -> Self {
        MutationBatch {
            keyspace: keyspace.into(),
            rows: Vec::new(),
            index: HashMap::new(),
            data_size: 0,
        }
    }

    pub fn keyspace(&self) -> &str {
        &self.keyspace
    }

    /// Stage a column write.
    pub fn put_column(
        &mut self,
        column_family: &str,
        key: Slice,
        name: Slice,
        value: Slice,
        ttl: Option<u32>,
    ) -> Result<()> {
        if ttl == Some(0) {
            return Err(Status::invalid_argument("ttl must be at least one second"));
        }
        self.data_size += name.size() + value.size();
        self.row_mut(column_family, key)
            .ops
            .push(ColumnOp::Put { name, value, ttl });
        Ok(())
    }

    /// Stage the removal of one column.
    pub fn delete_column(&mut self, column_family: &str, key: Slice, name: Slice) {
        self.data_size += name.size();
        self.row_mut(column_family, key)
            .ops
            .push(ColumnOp::Delete { name });
    }

    /// Stage the removal of a whole row.
    pub fn delete_row(&mut self, column_family: &str, key: Slice) {
        self.row_mut(column_family, key).ops.push(ColumnOp::DeleteRow);
    }

    fn row_mut(&mut self, column_family: &str, key: Slice) -> &mut RowMutation {
        let slot = (column_family.to_string(), key);
        let idx = match self.index.get(&slot) {
            Some(&idx) => idx,
            None => {
                self.data_size += slot.1.size();
                let idx = self.rows.len();
                self.rows.push(RowMutation {
                    column_family: slot.0.clone(),
                    key: slot.1.clone(),
                    ops: Vec::new(),
                });
                self.index.insert(slot, idx);
                idx
            },
        };
        &mut self.rows[idx]
    }

    /// Staged row mutations, in first-touched order.
    #[inline]
    pub fn rows(&self) -> &[RowMutation] {
        &self.rows
    }

    /// Staged mutations for a row, if any.
    pub fn row(&self, column_family: &str, key: &Slice) -> Option<&RowMutation> {
        self.index
            .get(&(column_family.to_string(), key.clone()))
            .map(|&idx| &self.rows[idx])
    }

    /// Total number of staged column/row operations.
    #[inline]
    pub fn count(&self) -> usize {
        self.rows.iter().map(|r| r.ops.len()).sum()
    }

    #[inline]
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
