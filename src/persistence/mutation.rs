use tracing::debug;

use super::{LOG_TARGET, Persistence, Target};
use crate::{
    batch::MutationBatch,
    serializer::Value,
    statistics::{OperationKind, OperationTimer},
    util::{Result, Status},
};

impl Persistence {
    /// Write one column.
    pub fn put_column(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
        column: impl Into<Value>,
        value: impl Into<Value>,
        ttl: Option<u32>,
    ) -> Result<()> {
        let (key, column, value) = (key.into(), column.into(), value.into());
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Write);
        debug!(target: LOG_TARGET, event = "put_column", keyspace, column_family, key = %key, column = %column, ?ttl);

        let target = self.target(keyspace, column_family)?;
        let mut batch = MutationBatch::new(keyspace);
        batch.put_column(
            target.cf_name(),
            target.encode_key(&key)?,
            target.encode_column(&column)?,
            target.encode_value(&value)?,
            ttl,
        )?;
        self.submit(&target, "put_column", &batch)
    }

    /// Write several columns of one row in a single batch.
    pub fn put_row<I, N, V>(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
        columns: I,
        ttl: Option<u32>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<Value>,
        V: Into<Value>,
    {
        let key = key.into();
        let mut timer = OperationTimer::start(self.metrics(), OperationKind::Write);
        debug!(target: LOG_TARGET, event = "put_row", keyspace, column_family, key = %key, ?ttl);

        let target = self.target(keyspace, column_family)?;
        let mut batch = MutationBatch::new(keyspace);
        stage_row(&target, &mut batch, &key, columns, ttl)?;
        if batch.is_empty() {
            return Ok(());
        }
        timer.set_units(batch.count());
        self.submit(&target, "put_row", &batch)
    }

    /// Write several rows in a single batch.
    pub fn put_rows<I, K, C, N, V>(
        &self,
        keyspace: &str,
        column_family: &str,
        rows: I,
        ttl: Option<u32>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<Value>,
        C: IntoIterator<Item = (N, V)>,
        N: Into<Value>,
        V: Into<Value>,
    {
        let mut timer = OperationTimer::start(self.metrics(), OperationKind::Write);
        debug!(target: LOG_TARGET, event = "put_rows", keyspace, column_family, ?ttl);

        let target = self.target(keyspace, column_family)?;
        let mut batch = MutationBatch::new(keyspace);
        for (key, columns) in rows {
            stage_row(&target, &mut batch, &key.into(), columns, ttl)?;
        }
        if batch.is_empty() {
            return Ok(());
        }
        timer.set_units(batch.count());
        self.submit(&target, "put_rows", &batch)
    }

    /// Delete one column, or the whole row when `column` is `None`.
    pub fn delete_column(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
        column: Option<Value>,
    ) -> Result<()> {
        let key = key.into();
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Write);
        debug!(
            target: LOG_TARGET,
            event = "delete_column",
            keyspace,
            column_family,
            key = %key,
            column = ?column
        );

        let target = self.target(keyspace, column_family)?;
        let mut batch = MutationBatch::new(keyspace);
        let encoded_key = target.encode_key(&key)?;
        match &column {
            Some(column) => {
                batch.delete_column(target.cf_name(), encoded_key, target.encode_column(column)?)
            },
            None => batch.delete_row(target.cf_name(), encoded_key),
        }
        self.submit(&target, "delete_column", &batch)
    }

    /// Delete several rows, or one column per row.
    ///
    /// With `Some(columns)`, `keys[i]` is paired with `columns[i]` and the two
    /// lists must have the same length. `None` or an empty list deletes the
    /// whole rows.
    pub fn delete_rows<I, K>(
        &self,
        keyspace: &str,
        column_family: &str,
        keys: I,
        columns: Option<&[Value]>,
    ) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: Into<Value>,
    {
        let keys: Vec<Value> = keys.into_iter().map(Into::into).collect();
        let mut timer = OperationTimer::start(self.metrics(), OperationKind::Write);
        debug!(target: LOG_TARGET, event = "delete_rows", keyspace, column_family, rows = keys.len());

        let target = self.target(keyspace, column_family)?;
        let columns = columns.filter(|columns| !columns.is_empty());
        if let Some(columns) = columns {
            if columns.len() != keys.len() {
                return Err(Status::invalid_argument(format!(
                    "{} keys paired with {} columns",
                    keys.len(),
                    columns.len()
                )));
            }
        }

        let mut batch = MutationBatch::new(keyspace);
        for (i, key) in keys.iter().enumerate() {
            let encoded_key = target.encode_key(key)?;
            match columns {
                Some(columns) => batch.delete_column(
                    target.cf_name(),
                    encoded_key,
                    target.encode_column(&columns[i])?,
                ),
                None => batch.delete_row(target.cf_name(), encoded_key),
            }
        }
        if batch.is_empty() {
            return Ok(());
        }
        timer.set_units(batch.count());
        self.submit(&target, "delete_rows", &batch)
    }

    fn submit(&self, target: &Target<'_>, event: &'static str, batch: &MutationBatch) -> Result<()> {
        debug!(
            target: LOG_TARGET,
            event = "submit_batch",
            operation = event,
            keyspace = batch.keyspace(),
            ops = batch.count(),
            bytes = batch.data_size()
        );
        target.check(event, target.keyspace.session().execute_batch(batch))
    }
}

fn stage_row<C, N, V>(
    target: &Target<'_>,
    batch: &mut MutationBatch,
    key: &Value,
    columns: C,
    ttl: Option<u32>,
) -> Result<()>
where
    C: IntoIterator<Item = (N, V)>,
    N: Into<Value>,
    V: Into<Value>,
{
    let encoded_key = target.encode_key(key)?;
    for (name, value) in columns {
        batch.put_column(
            target.cf_name(),
            encoded_key.clone(),
            target.encode_column(&name.into())?,
            target.encode_value(&value.into())?,
            ttl,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::super::tests::open;
    use crate::{composite::Composite, serializer::Value, statistics::MetricName};

    #[test]
    fn test_put_row_counts_one_write_per_column() {
        let (_, stats, p) = open();
        p.put_row("ks", "orders", "o1", [("status", "new"), ("total", "12")], None)
            .unwrap();
        assert_eq!(stats.get(MetricName::WriteCount), 2);
        assert_eq!(p.count_columns("ks", "orders", "o1").unwrap(), 2);
    }

    #[test]
    fn test_put_rows_is_one_batch() {
        let (driver, _, p) = open();
        let calls = driver.call_count();

        let mut rows = BTreeMap::new();
        rows.insert("o1", vec![("status", "new")]);
        rows.insert("o2", vec![("status", "paid")]);
        p.put_rows("ks", "orders", rows, None).unwrap();

        assert_eq!(driver.call_count(), calls + 1);
    }

    #[test]
    fn test_empty_puts_skip_driver() {
        let (driver, stats, p) = open();
        let calls = driver.call_count();

        let no_columns: [(&str, &str); 0] = [];
        p.put_row("ks", "orders", "o1", no_columns, None).unwrap();
        let no_rows: [(&str, Vec<(&str, &str)>); 0] = [];
        p.put_rows("ks", "orders", no_rows, None).unwrap();
        p.put_rows("ks", "orders", [("o2", Vec::<(&str, &str)>::new())], None)
            .unwrap();

        assert_eq!(driver.call_count(), calls);
        assert_eq!(stats.get(MetricName::WriteCount), 3);
    }

    #[test]
    fn test_value_kind_must_match_registration() {
        let (driver, _, p) = open();
        let calls = driver.call_count();

        let err = p.put_column("ks", "stats", "s1", "hits", "ten", None).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(driver.call_count(), calls);

        p.put_column("ks", "stats", "s1", "hits", 10i64, None).unwrap();
    }

    #[test]
    fn test_composite_column_names() {
        let (_, _, p) = open();
        let name = Composite::new(["m1", "body"]).unwrap();
        p.put_column("ks", "queue_messages", "q", name.clone(), "hello", None)
            .unwrap();

        // an already-encoded composite is written under the same name
        p.put_column(
            "ks",
            "queue_messages",
            "q",
            Value::Bytes(name.encoded().to_bytes()),
            "again",
            None,
        )
        .unwrap();

        let column = p
            .read_column("ks", "queue_messages", "q", name)
            .unwrap()
            .unwrap();
        assert_eq!(column.value(), &Value::from("again"));
        assert_eq!(p.count_columns("ks", "queue_messages", "q").unwrap(), 1);
    }

    #[test]
    fn test_delete_rows_pairs_keys_and_columns() {
        let (_, _, p) = open();
        p.put_row("ks", "orders", "o1", [("a", "1"), ("b", "2")], None).unwrap();
        p.put_row("ks", "orders", "o2", [("a", "1"), ("b", "2")], None).unwrap();

        let columns = [Value::from("a"), Value::from("b")];
        p.delete_rows("ks", "orders", ["o1", "o2"], Some(&columns[..])).unwrap();

        let o1 = p.read_column_slice("ks", "orders", "o1", None, None, 10).unwrap();
        let o2 = p.read_column_slice("ks", "orders", "o2", None, None, 10).unwrap();
        assert_eq!(o1.columns().unwrap()[0].name(), &Value::from("b"));
        assert_eq!(o2.columns().unwrap()[0].name(), &Value::from("a"));

        let err = p
            .delete_rows("ks", "orders", ["o1"], Some(&columns[..]))
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let (_, _, p) = open();
        let err = p.put_column("ks", "orders", "o1", "a", "1", Some(0)).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
