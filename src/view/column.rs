use std::{fmt, sync::Arc};

use once_cell::unsync::OnceCell;

use crate::{
    driver::RawColumn,
    serializer::{Codec, Value},
    util::Result,
};

/// A decoded column: name, value and write timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    name: Value,
    value: Value,
    clock: i64,
}

impl Column {
    pub(crate) fn decode(
        raw: &RawColumn,
        name_codec: &dyn Codec,
        value_codec: &dyn Codec,
    ) -> Result<Self> {
        Ok(Column {
            name: name_codec.decode(&raw.name)?,
            value: value_codec.decode(&raw.value)?,
            clock: raw.timestamp,
        })
    }

    pub fn name(&self) -> &Value {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Write timestamp in microseconds.
    pub fn clock(&self) -> i64 {
        self.clock
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}@{}", self.name, self.value, self.clock)
    }
}

/// Columns of one row, ascending by name
///
/// Holds the raw driver columns and decodes them on the first call to
/// [`ColumnSlice::columns`]; the decoded list is then kept for the lifetime
/// of the slice. A slice is a snapshot and is never refreshed.
pub struct ColumnSlice {
    raw: Vec<RawColumn>,
    name_codec: Arc<dyn Codec>,
    value_codec: Arc<dyn Codec>,
    columns: OnceCell<Vec<Column>>,
}

impl ColumnSlice {
    pub(crate) fn new(
        raw: Vec<RawColumn>,
        name_codec: Arc<dyn Codec>,
        value_codec: Arc<dyn Codec>,
    ) -> Self {
        ColumnSlice {
            raw,
            name_codec,
            value_codec,
            columns: OnceCell::new(),
        }
    }

    /// Decoded columns. Fails with `Corruption` if a stored name or value
    /// does not decode with the column family's serializers.
    pub fn columns(&self) -> Result<&[Column]> {
        self.columns
            .get_or_try_init(|| {
                self.raw
                    .iter()
                    .map(|raw| {
                        Column::decode(raw, self.name_codec.as_ref(), self.value_codec.as_ref())
                    })
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn get_column_by_name(&self, name: &Value) -> Result<Option<&Column>> {
        Ok(self.columns()?.iter().find(|column| column.name() == name))
    }

    /// Number of columns, without decoding them.
    pub fn size(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub(crate) fn is_materialized(&self) -> bool {
        self.columns.get().is_some()
    }
}

impl fmt::Debug for ColumnSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnSlice")
            .field("size", &self.raw.len())
            .field("materialized", &self.is_materialized())
            .finish()
    }
}
