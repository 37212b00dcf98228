use std::sync::Arc;

use super::ColumnSlice;
use crate::{
    driver::RawRow,
    serializer::{Codec, Value},
    util::Result,
};

/// A row key and its columns.
#[derive(Debug)]
pub struct Row {
    key: Value,
    columns: ColumnSlice,
}

impl Row {
    pub(crate) fn decode(
        raw: RawRow,
        key_codec: &dyn Codec,
        name_codec: &Arc<dyn Codec>,
        value_codec: &Arc<dyn Codec>,
    ) -> Result<Self> {
        Ok(Row {
            key: key_codec.decode(&raw.key)?,
            columns: ColumnSlice::new(raw.columns, Arc::clone(name_codec), Arc::clone(value_codec)),
        })
    }

    pub fn key(&self) -> &Value {
        &self.key
    }

    pub fn columns(&self) -> &ColumnSlice {
        &self.columns
    }
}
