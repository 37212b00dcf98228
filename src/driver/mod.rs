/// Store driver seam
///
/// Everything the persistence layer needs from the underlying wide-column
/// client, expressed in byte slices. Connection establishment, discovery,
/// retries and the wire protocol all live behind these two traits.
///
/// ```text
/// Persistence ──resolve──→ KeyspaceHandle ──→ Arc<dyn Session>
///                                                 │
///                    execute_batch / scan_rows / scan_index / read_slice
///                    read_column / count_columns / *_counter / ping
/// ```
mod memory;

use std::{sync::Arc, time::Duration};

use thiserror::Error;

pub use memory::MemoryDriver;

use crate::{batch::MutationBatch, util::Slice};

/// Failure reported by a driver call.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// A column as stored by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    pub name: Slice,
    pub value: Slice,
    /// Write timestamp in microseconds
    pub timestamp: i64,
}

/// A row as returned by the driver; columns ascend by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub key: Slice,
    pub columns: Vec<RawColumn>,
}

/// Key-ordered row scan starting strictly after `start_exclusive`.
#[derive(Debug, Clone)]
pub struct RowRange {
    pub start_exclusive: Option<Slice>,
    pub row_limit: usize,
    pub column_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexExpression {
    pub column: Slice,
    pub value: Slice,
}

/// Conjunction of equality expressions over indexed columns.
#[derive(Debug, Clone)]
pub struct IndexQuery {
    pub expressions: Vec<IndexExpression>,
    pub row_limit: usize,
    pub column_limit: usize,
}

/// Inclusive column-name bounds within one row; `None` is open.
#[derive(Debug, Clone)]
pub struct ColumnRange {
    pub first: Option<Slice>,
    pub last: Option<Slice>,
    pub limit: usize,
}

/// A pooled session bound to one keyspace.
pub trait Session: Send + Sync {
    fn keyspace(&self) -> &str;

    /// Apply every staged mutation as one atomic operation.
    fn execute_batch(&self, batch: &MutationBatch) -> DriverResult<()>;

    fn scan_rows(&self, column_family: &str, range: &RowRange) -> DriverResult<Vec<RawRow>>;

    fn scan_index(&self, column_family: &str, query: &IndexQuery) -> DriverResult<Vec<RawRow>>;

    fn read_slice(
        &self,
        column_family: &str,
        key: &Slice,
        range: &ColumnRange,
    ) -> DriverResult<Vec<RawColumn>>;

    fn read_column(
        &self,
        column_family: &str,
        key: &Slice,
        name: &Slice,
    ) -> DriverResult<Option<RawColumn>>;

    fn count_columns(&self, column_family: &str, key: &Slice) -> DriverResult<usize>;

    fn increment_counter(
        &self,
        column_family: &str,
        key: &Slice,
        name: &Slice,
        delta: i64,
    ) -> DriverResult<()>;

    /// Current counter value. A counter that was never written is reported
    /// as `DriverError::NotFound`.
    fn read_counter(&self, column_family: &str, key: &Slice, name: &Slice) -> DriverResult<i64>;

    fn delete_counter(&self, column_family: &str, key: &Slice, name: &Slice) -> DriverResult<()>;

    fn ping(&self) -> DriverResult<()>;
}

/// Establishes pooled sessions. Called once per keyspace at startup.
pub trait StoreDriver: Send + Sync {
    fn connect(&self, keyspace: &str) -> DriverResult<Arc<dyn Session>>;
}
