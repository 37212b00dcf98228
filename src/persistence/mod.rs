/// Keyspace/column-family operations over a store driver
///
/// Every operation follows the same path:
///
/// ```text
/// OperationTimer::start
///   → keyspace (KeyspaceRegistry::resolve)
///   → column family (ColumnFamilySet::get, codecs bound at registration)
///   → encode key / column / value
///   → one driver call
///   → decode into Row / ColumnSlice / Column
/// OperationTimer drop → latency + read/write count
/// ```
///
/// Failures of the driver are returned as `Status` with the driver error
/// kept as the source. Nothing is retried.
mod counter;
mod mutation;
mod query;

use std::sync::Arc;

use tracing::warn;

use crate::{
    column_family::{ColumnFamily, ColumnFamilySet},
    composite::{Component, Composite},
    config::PersistenceConfig,
    driver::{DriverResult, StoreDriver},
    keyspace::{KeyspaceHandle, KeyspaceRegistry},
    serializer::{SerializerRegistry, Value},
    statistics::MetricsSink,
    util::{Result, Slice, Status},
};

pub(crate) const LOG_TARGET: &str = "widecol::persistence";

pub struct Persistence {
    keyspaces: KeyspaceRegistry,
    column_families: ColumnFamilySet,
    serializers: SerializerRegistry,
    metrics: Arc<dyn MetricsSink>,
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence")
            .field("keyspaces", &self.keyspaces)
            .field("column_families", &self.column_families)
            .field("serializers", &self.serializers)
            .finish_non_exhaustive()
    }
}

impl Persistence {
    /// Connect every configured keyspace and register every column family
    /// with the default serializers.
    pub fn open(
        driver: &dyn StoreDriver,
        config: &PersistenceConfig,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self> {
        Self::open_with_serializers(driver, config, SerializerRegistry::default(), metrics)
    }

    pub fn open_with_serializers(
        driver: &dyn StoreDriver,
        config: &PersistenceConfig,
        serializers: SerializerRegistry,
        metrics: Arc<dyn MetricsSink>,
    ) -> Result<Self> {
        // Validate the registrations before any connection is made.
        let column_families = ColumnFamilySet::open(&config.descriptors()?, &serializers)?;
        let keyspaces = KeyspaceRegistry::init(driver, &config.keyspaces)?;
        Ok(Self::new(keyspaces, column_families, serializers, metrics))
    }

    pub fn new(
        keyspaces: KeyspaceRegistry,
        column_families: ColumnFamilySet,
        serializers: SerializerRegistry,
        metrics: Arc<dyn MetricsSink>,
    ) -> Self {
        Persistence {
            keyspaces,
            column_families,
            serializers,
            metrics,
        }
    }

    pub fn keyspaces(&self) -> &KeyspaceRegistry {
        &self.keyspaces
    }

    pub fn column_families(&self) -> &ColumnFamilySet {
        &self.column_families
    }

    pub fn serializers(&self) -> &SerializerRegistry {
        &self.serializers
    }

    /// Build a composite value for use as a key or column name.
    pub fn composite<I, C>(components: I) -> Result<Composite>
    where
        I: IntoIterator<Item = C>,
        C: Into<Component>,
    {
        Composite::new(components)
    }

    /// Ping every registered keyspace.
    pub fn is_alive(&self) -> bool {
        self.keyspaces.handles().all(|handle| match handle.session().ping() {
            Ok(()) => true,
            Err(e) => {
                warn!(target: LOG_TARGET, event = "ping_failed", keyspace = handle.name(), error = %e);
                false
            },
        })
    }

    fn metrics(&self) -> &dyn MetricsSink {
        self.metrics.as_ref()
    }

    fn target(&self, keyspace: &str, column_family: &str) -> Result<Target<'_>> {
        let keyspace = self.keyspaces.resolve(keyspace)?;
        let column_family = self.column_families.get(column_family)?;
        Ok(Target {
            keyspace,
            column_family,
        })
    }
}

/// A resolved keyspace and column family.
struct Target<'a> {
    keyspace: &'a KeyspaceHandle,
    column_family: &'a ColumnFamily,
}

impl Target<'_> {
    fn cf_name(&self) -> &str {
        self.column_family.name()
    }

    fn encode_key(&self, key: &Value) -> Result<Slice> {
        self.column_family.key_codec().encode(key)
    }

    fn encode_column(&self, column: &Value) -> Result<Slice> {
        self.column_family.column_codec().encode(column)
    }

    fn encode_value(&self, value: &Value) -> Result<Slice> {
        self.column_family.value_codec().encode(value)
    }

    /// Map a driver failure to a status, logging it first.
    fn check<T>(&self, event: &'static str, result: DriverResult<T>) -> Result<T> {
        result.map_err(|e| {
            warn!(
                target: LOG_TARGET,
                event,
                keyspace = self.keyspace.name(),
                column_family = self.cf_name(),
                error = %e,
                "driver call failed"
            );
            Status::from(e)
        })
    }
}

fn check_limit(what: &str, limit: usize) -> Result<()> {
    if limit == 0 {
        return Err(Status::invalid_argument(format!("{what} must be at least 1")));
    }
    Ok(())
}
