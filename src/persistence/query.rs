use tracing::debug;

use super::{LOG_TARGET, Persistence, Target, check_limit};
use crate::{
    driver::{ColumnRange, IndexExpression, IndexQuery, RawRow, RowRange},
    serializer::Value,
    statistics::{OperationKind, OperationTimer},
    util::{Result, Slice, Status},
    view::{Column, ColumnSlice, Row},
};

impl Persistence {
    /// Rows in key order, starting strictly after `start_exclusive`.
    ///
    /// At most `row_limit` rows are returned, each with at most
    /// `column_limit` columns. Pass the last key of one page as the
    /// `start_exclusive` of the next to walk the whole column family.
    /// Rows whose columns were all deleted still appear, with no columns.
    pub fn scan_rows(
        &self,
        keyspace: &str,
        column_family: &str,
        start_exclusive: Option<Value>,
        row_limit: usize,
        column_limit: usize,
    ) -> Result<Vec<Row>> {
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Read);
        debug!(target: LOG_TARGET, event = "scan_rows", keyspace, column_family, start = ?start_exclusive, row_limit, column_limit);

        let target = self.target(keyspace, column_family)?;
        check_limit("row limit", row_limit)?;
        check_limit("column limit", column_limit)?;

        let range = RowRange {
            start_exclusive: start_exclusive
                .as_ref()
                .map(|key| target.encode_key(key))
                .transpose()?,
            row_limit,
            column_limit,
        };
        let raw = target.check(
            "scan_rows",
            target.keyspace.session().scan_rows(target.cf_name(), &range),
        )?;
        decode_rows(&target, raw)
    }

    /// Like [`Persistence::scan_rows`], but skips rows without columns and
    /// keeps paging until `row_limit` rows are found or the family ends.
    pub fn scan_non_empty_rows(
        &self,
        keyspace: &str,
        column_family: &str,
        start_exclusive: Option<Value>,
        row_limit: usize,
        column_limit: usize,
    ) -> Result<Vec<Row>> {
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Read);
        debug!(target: LOG_TARGET, event = "scan_non_empty_rows", keyspace, column_family, start = ?start_exclusive, row_limit, column_limit);

        let target = self.target(keyspace, column_family)?;
        check_limit("row limit", row_limit)?;
        check_limit("column limit", column_limit)?;

        let mut cursor: Option<Slice> = start_exclusive
            .as_ref()
            .map(|key| target.encode_key(key))
            .transpose()?;
        let mut found = Vec::new();

        while found.len() < row_limit {
            let range = RowRange {
                start_exclusive: cursor.take(),
                row_limit,
                column_limit,
            };
            let page = target.check(
                "scan_non_empty_rows",
                target.keyspace.session().scan_rows(target.cf_name(), &range),
            )?;
            let exhausted = page.len() < row_limit;
            cursor = page.last().map(|row| row.key.clone());

            let wanted = row_limit - found.len();
            found.extend(
                page.into_iter()
                    .filter(|row| !row.columns.is_empty())
                    .take(wanted),
            );
            if exhausted || cursor.is_none() {
                break;
            }
        }
        decode_rows(&target, found)
    }

    /// Rows whose indexed `column` equals `value`.
    pub fn scan_rows_by_index(
        &self,
        keyspace: &str,
        column_family: &str,
        column: impl Into<Value>,
        value: impl Into<Value>,
        row_limit: usize,
        column_limit: usize,
    ) -> Result<Vec<Row>> {
        self.scan_index(
            "scan_rows_by_index",
            keyspace,
            column_family,
            vec![(column.into(), value.into())],
            row_limit,
            column_limit,
        )
    }

    /// Rows matching every `column == value` pair; each column must be
    /// indexed.
    pub fn scan_rows_by_indexes<I, N, V>(
        &self,
        keyspace: &str,
        column_family: &str,
        expressions: I,
        row_limit: usize,
        column_limit: usize,
    ) -> Result<Vec<Row>>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<Value>,
        V: Into<Value>,
    {
        let expressions = expressions
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect();
        self.scan_index(
            "scan_rows_by_indexes",
            keyspace,
            column_family,
            expressions,
            row_limit,
            column_limit,
        )
    }

    fn scan_index(
        &self,
        event: &'static str,
        keyspace: &str,
        column_family: &str,
        expressions: Vec<(Value, Value)>,
        row_limit: usize,
        column_limit: usize,
    ) -> Result<Vec<Row>> {
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Read);
        debug!(target: LOG_TARGET, event, keyspace, column_family, expressions = expressions.len(), row_limit, column_limit);

        let target = self.target(keyspace, column_family)?;
        check_limit("row limit", row_limit)?;
        check_limit("column limit", column_limit)?;
        if expressions.is_empty() {
            return Err(Status::invalid_argument(
                "index scan needs at least one expression",
            ));
        }

        let query = IndexQuery {
            expressions: expressions
                .iter()
                .map(|(column, value)| {
                    Ok(IndexExpression {
                        column: target.encode_column(column)?,
                        value: target.encode_value(value)?,
                    })
                })
                .collect::<Result<_>>()?,
            row_limit,
            column_limit,
        };
        let raw = target.check(
            event,
            target.keyspace.session().scan_index(target.cf_name(), &query),
        )?;
        decode_rows(&target, raw)
    }

    /// Columns of one row within the inclusive bounds `[first, last]`.
    ///
    /// `None` leaves that end open. A missing row yields an empty slice.
    pub fn read_column_slice(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
        first: Option<Value>,
        last: Option<Value>,
        column_limit: usize,
    ) -> Result<ColumnSlice> {
        let key = key.into();
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Read);
        debug!(target: LOG_TARGET, event = "read_column_slice", keyspace, column_family, key = %key, ?first, ?last, column_limit);

        let target = self.target(keyspace, column_family)?;
        check_limit("column limit", column_limit)?;

        let range = ColumnRange {
            first: first.as_ref().map(|c| target.encode_column(c)).transpose()?,
            last: last.as_ref().map(|c| target.encode_column(c)).transpose()?,
            limit: column_limit,
        };
        let encoded_key = target.encode_key(&key)?;
        let raw = target.check(
            "read_column_slice",
            target
                .keyspace
                .session()
                .read_slice(target.cf_name(), &encoded_key, &range),
        )?;

        let cf = target.column_family;
        Ok(ColumnSlice::new(
            raw,
            cf.column_codec().clone(),
            cf.value_codec().clone(),
        ))
    }

    /// A single column, `None` when it does not exist.
    pub fn read_column(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
        column: impl Into<Value>,
    ) -> Result<Option<Column>> {
        let (key, column) = (key.into(), column.into());
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Read);
        debug!(target: LOG_TARGET, event = "read_column", keyspace, column_family, key = %key, column = %column);

        let target = self.target(keyspace, column_family)?;
        let raw = target.check(
            "read_column",
            target.keyspace.session().read_column(
                target.cf_name(),
                &target.encode_key(&key)?,
                &target.encode_column(&column)?,
            ),
        )?;

        let cf = target.column_family;
        raw.map(|raw| {
            Column::decode(&raw, cf.column_codec().as_ref(), cf.value_codec().as_ref())
        })
        .transpose()
    }

    /// Number of live columns in a row.
    pub fn count_columns(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
    ) -> Result<usize> {
        let key = key.into();
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Read);
        debug!(target: LOG_TARGET, event = "count_columns", keyspace, column_family, key = %key);

        let target = self.target(keyspace, column_family)?;
        let encoded_key = target.encode_key(&key)?;
        target.check(
            "count_columns",
            target
                .keyspace
                .session()
                .count_columns(target.cf_name(), &encoded_key),
        )
    }
}

fn decode_rows(target: &Target<'_>, raw: Vec<RawRow>) -> Result<Vec<Row>> {
    let cf = target.column_family;
    raw.into_iter()
        .map(|row| Row::decode(row, cf.key_codec().as_ref(), cf.column_codec(), cf.value_codec()))
        .collect()
}
