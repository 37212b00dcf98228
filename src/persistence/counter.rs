use tracing::debug;

use super::{LOG_TARGET, Persistence};
use crate::{
    serializer::Value,
    statistics::{OperationKind, OperationTimer},
    util::{Result, Status},
};

// Counters go straight to the driver's counter path and never share a
// batch with plain column mutations.
impl Persistence {
    pub fn increment_counter(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
        column: impl Into<Value>,
        delta: i64,
    ) -> Result<()> {
        self.apply_counter_delta(
            "increment_counter",
            keyspace,
            column_family,
            key.into(),
            column.into(),
            Ok(delta),
        )
    }

    /// Increment by `-amount`.
    pub fn decrement_counter(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
        column: impl Into<Value>,
        amount: i64,
    ) -> Result<()> {
        let delta = amount.checked_neg().ok_or_else(|| {
            Status::invalid_argument(format!("cannot decrement by {amount}"))
        });
        self.apply_counter_delta(
            "decrement_counter",
            keyspace,
            column_family,
            key.into(),
            column.into(),
            delta,
        )
    }

    fn apply_counter_delta(
        &self,
        event: &'static str,
        keyspace: &str,
        column_family: &str,
        key: Value,
        column: Value,
        delta: Result<i64>,
    ) -> Result<()> {
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Write);
        let delta = delta?;
        debug!(target: LOG_TARGET, event, keyspace, column_family, key = %key, column = %column, delta);

        let target = self.target(keyspace, column_family)?;
        let (key, column) = (target.encode_key(&key)?, target.encode_column(&column)?);
        target.check(
            event,
            target
                .keyspace
                .session()
                .increment_counter(target.cf_name(), &key, &column, delta),
        )
    }

    /// Current value. A counter that was never written is `NotFound`.
    pub fn read_counter(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
        column: impl Into<Value>,
    ) -> Result<i64> {
        let (key, column) = (key.into(), column.into());
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Read);
        debug!(target: LOG_TARGET, event = "read_counter", keyspace, column_family, key = %key, column = %column);

        let target = self.target(keyspace, column_family)?;
        let (key, column) = (target.encode_key(&key)?, target.encode_column(&column)?);
        target.check(
            "read_counter",
            target
                .keyspace
                .session()
                .read_counter(target.cf_name(), &key, &column),
        )
    }

    pub fn delete_counter(
        &self,
        keyspace: &str,
        column_family: &str,
        key: impl Into<Value>,
        column: impl Into<Value>,
    ) -> Result<()> {
        let (key, column) = (key.into(), column.into());
        let _timer = OperationTimer::start(self.metrics(), OperationKind::Write);
        debug!(target: LOG_TARGET, event = "delete_counter", keyspace, column_family, key = %key, column = %column);

        let target = self.target(keyspace, column_family)?;
        let (key, column) = (target.encode_key(&key)?, target.encode_column(&column)?);
        target.check(
            "delete_counter",
            target
                .keyspace
                .session()
                .delete_counter(target.cf_name(), &key, &column),
        )
    }
}
