use std::{
    collections::{BTreeMap, HashMap, HashSet},
    ops::Bound,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
    },
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use crossbeam_skiplist::SkipMap;
use parking_lot::RwLock;

use super::{
    ColumnRange, DriverError, DriverResult, IndexQuery, RawColumn, RawRow, RowRange, Session,
    StoreDriver,
};
use crate::{
    batch::{ColumnOp, MutationBatch},
    util::Slice,
};

#[derive(Debug, Clone)]
struct Cell {
    value: Slice,
    timestamp: i64,
    /// Expiry in store-clock microseconds
    expires_at: Option<i64>,
}

impl Cell {
    fn is_live(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

type Columns = BTreeMap<Slice, Cell>;

#[derive(Default)]
struct FamilyData {
    /// Row key -> columns. Rows stay in the map after their columns are
    /// deleted and show up empty in range scans.
    rows: SkipMap<Slice, RwLock<Columns>>,
    counters: SkipMap<(Slice, Slice), AtomicI64>,
    indexed: RwLock<HashSet<Slice>>,
}

#[derive(Default)]
struct KeyspaceData {
    families: RwLock<HashMap<String, Arc<FamilyData>>>,
    /// Batches hold this exclusively so readers never observe half a batch
    apply_lock: RwLock<()>,
}

impl KeyspaceData {
    fn family(&self, name: &str) -> Arc<FamilyData> {
        if let Some(family) = self.families.read().get(name) {
            return Arc::clone(family);
        }
        let mut families = self.families.write();
        Arc::clone(families.entry(name.to_string()).or_default())
    }
}

struct MemoryStore {
    keyspaces: RwLock<HashMap<String, Arc<KeyspaceData>>>,
    available: AtomicBool,
    connects: AtomicUsize,
    calls: AtomicUsize,
    last_timestamp: AtomicI64,
    skew_micros: AtomicI64,
}

impl MemoryStore {
    fn keyspace(&self, name: &str) -> Arc<KeyspaceData> {
        if let Some(ks) = self.keyspaces.read().get(name) {
            return Arc::clone(ks);
        }
        let mut keyspaces = self.keyspaces.write();
        Arc::clone(keyspaces.entry(name.to_string()).or_default())
    }

    fn begin_call(&self) -> DriverResult<()> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if self.available.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(DriverError::Transport("memory store is unavailable".to_string()))
        }
    }

    fn now_micros(&self) -> i64 {
        let wall = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or_default();
        wall + self.skew_micros.load(Ordering::Relaxed)
    }

    /// Strictly increasing write timestamp.
    fn next_timestamp(&self) -> i64 {
        let now = self.now_micros();
        let prev = self
            .last_timestamp
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(prev + 1)
    }
}

/// In-process wide-column store.
///
/// Behaves like a single-node store with an order-preserving partitioner:
/// rows scan in key order, batches apply atomically, counters live in their
/// own table and secondary indexes must be declared with
/// [`MemoryDriver::create_index`] before they can be queried.
///
/// Handles are cheap to clone and share the same data. Fault injection
/// (`set_available`) and call counters exist so callers can observe what
/// reaches the driver.
#[derive(Clone)]
pub struct MemoryDriver {
    store: Arc<MemoryStore>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        MemoryDriver {
            store: Arc::new(MemoryStore {
                keyspaces: RwLock::new(HashMap::new()),
                available: AtomicBool::new(true),
                connects: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                last_timestamp: AtomicI64::new(0),
                skew_micros: AtomicI64::new(0),
            }),
        }
    }

    /// Declare a secondary index on `column`.
    pub fn create_index(&self, keyspace: &str, column_family: &str, column: impl Into<Slice>) {
        let family = self.store.keyspace(keyspace).family(column_family);
        family.indexed.write().insert(column.into());
    }

    /// Make every subsequent call fail with a transport error, or recover.
    pub fn set_available(&self, available: bool) {
        self.store.available.store(available, Ordering::Release);
    }

    /// Move the store clock forward, expiring ttl'd columns.
    pub fn advance_time(&self, by: Duration) {
        self.store
            .skew_micros
            .fetch_add(by.as_micros() as i64, Ordering::Relaxed);
    }

    /// Number of sessions established so far.
    pub fn connect_count(&self) -> usize {
        self.store.connects.load(Ordering::Relaxed)
    }

    /// Number of session calls attempted so far.
    pub fn call_count(&self) -> usize {
        self.store.calls.load(Ordering::Relaxed)
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreDriver for MemoryDriver {
    fn connect(&self, keyspace: &str) -> DriverResult<Arc<dyn Session>> {
        self.store.connects.fetch_add(1, Ordering::Relaxed);
        if !self.store.available.load(Ordering::Acquire) {
            return Err(DriverError::Transport(format!(
                "cannot reach store for keyspace '{keyspace}'"
            )));
        }
        Ok(Arc::new(MemorySession {
            name: keyspace.to_string(),
            keyspace: self.store.keyspace(keyspace),
            store: Arc::clone(&self.store),
        }))
    }
}

struct MemorySession {
    name: String,
    keyspace: Arc<KeyspaceData>,
    store: Arc<MemoryStore>,
}

fn live_columns(columns: &Columns, now: i64, limit: usize) -> Vec<RawColumn> {
    columns
        .iter()
        .filter(|(_, cell)| cell.is_live(now))
        .take(limit)
        .map(|(name, cell)| RawColumn {
            name: name.clone(),
            value: cell.value.clone(),
            timestamp: cell.timestamp,
        })
        .collect()
}

impl Session for MemorySession {
    fn keyspace(&self) -> &str {
        &self.name
    }

    fn execute_batch(&self, batch: &MutationBatch) -> DriverResult<()> {
        self.store.begin_call()?;
        if batch.keyspace() != self.name {
            return Err(DriverError::InvalidRequest(format!(
                "batch for keyspace '{}' sent to session of '{}'",
                batch.keyspace(),
                self.name
            )));
        }

        let _guard = self.keyspace.apply_lock.write();
        let timestamp = self.store.next_timestamp();
        let now = self.store.now_micros();

        for row in batch.rows() {
            let family = self.keyspace.family(row.column_family());
            let entry = family
                .rows
                .get_or_insert_with(row.key().clone(), || RwLock::new(BTreeMap::new()));
            let mut columns = entry.value().write();

            for op in row.ops() {
                match op {
                    ColumnOp::Put { name, value, ttl } => {
                        let expires_at =
                            ttl.map(|secs| now + Duration::from_secs(secs.into()).as_micros() as i64);
                        columns.insert(
                            name.clone(),
                            Cell {
                                value: value.clone(),
                                timestamp,
                                expires_at,
                            },
                        );
                    },
                    ColumnOp::Delete { name } => {
                        columns.remove(name);
                    },
                    ColumnOp::DeleteRow => columns.clear(),
                }
            }
        }
        Ok(())
    }

    fn scan_rows(&self, column_family: &str, range: &RowRange) -> DriverResult<Vec<RawRow>> {
        self.store.begin_call()?;
        let _guard = self.keyspace.apply_lock.read();
        let family = self.keyspace.family(column_family);
        let now = self.store.now_micros();

        let start = match &range.start_exclusive {
            Some(key) => Bound::Excluded(key.clone()),
            None => Bound::Unbounded,
        };

        Ok(family
            .rows
            .range((start, Bound::Unbounded))
            .take(range.row_limit)
            .map(|entry| RawRow {
                key: entry.key().clone(),
                columns: live_columns(&entry.value().read(), now, range.column_limit),
            })
            .collect())
    }

    fn scan_index(&self, column_family: &str, query: &IndexQuery) -> DriverResult<Vec<RawRow>> {
        self.store.begin_call()?;
        let _guard = self.keyspace.apply_lock.read();
        let family = self.keyspace.family(column_family);

        {
            let indexed = family.indexed.read();
            if query.expressions.is_empty() {
                return Err(DriverError::InvalidRequest(
                    "index query without expressions".to_string(),
                ));
            }
            if let Some(expr) = query
                .expressions
                .iter()
                .find(|expr| !indexed.contains(&expr.column))
            {
                return Err(DriverError::InvalidRequest(format!(
                    "no secondary index on column {} of '{column_family}'",
                    expr.column
                )));
            }
        }

        let now = self.store.now_micros();
        let mut rows = Vec::new();
        for entry in family.rows.iter() {
            if rows.len() >= query.row_limit {
                break;
            }
            let columns = entry.value().read();
            let matches = query.expressions.iter().all(|expr| {
                columns
                    .get(&expr.column)
                    .is_some_and(|cell| cell.is_live(now) && cell.value == expr.value)
            });
            if matches {
                rows.push(RawRow {
                    key: entry.key().clone(),
                    columns: live_columns(&columns, now, query.column_limit),
                });
            }
        }
        Ok(rows)
    }

    fn read_slice(
        &self,
        column_family: &str,
        key: &Slice,
        range: &ColumnRange,
    ) -> DriverResult<Vec<RawColumn>> {
        self.store.begin_call()?;
        let _guard = self.keyspace.apply_lock.read();
        let family = self.keyspace.family(column_family);
        let Some(entry) = family.rows.get(key) else {
            return Ok(Vec::new());
        };

        if let (Some(first), Some(last)) = (&range.first, &range.last) {
            if first > last {
                return Ok(Vec::new());
            }
        }
        let lower = range.first.clone().map_or(Bound::Unbounded, Bound::Included);
        let upper = range.last.clone().map_or(Bound::Unbounded, Bound::Included);

        let now = self.store.now_micros();
        let columns = entry.value().read();
        Ok(columns
            .range((lower, upper))
            .filter(|(_, cell)| cell.is_live(now))
            .take(range.limit)
            .map(|(name, cell)| RawColumn {
                name: name.clone(),
                value: cell.value.clone(),
                timestamp: cell.timestamp,
            })
            .collect())
    }

    fn read_column(
        &self,
        column_family: &str,
        key: &Slice,
        name: &Slice,
    ) -> DriverResult<Option<RawColumn>> {
        self.store.begin_call()?;
        let _guard = self.keyspace.apply_lock.read();
        let family = self.keyspace.family(column_family);
        let now = self.store.now_micros();

        Ok(family.rows.get(key).and_then(|entry| {
            let columns = entry.value().read();
            columns
                .get(name)
                .filter(|cell| cell.is_live(now))
                .map(|cell| RawColumn {
                    name: name.clone(),
                    value: cell.value.clone(),
                    timestamp: cell.timestamp,
                })
        }))
    }

    fn count_columns(&self, column_family: &str, key: &Slice) -> DriverResult<usize> {
        self.store.begin_call()?;
        let _guard = self.keyspace.apply_lock.read();
        let family = self.keyspace.family(column_family);
        let now = self.store.now_micros();

        Ok(family.rows.get(key).map_or(0, |entry| {
            entry
                .value()
                .read()
                .values()
                .filter(|cell| cell.is_live(now))
                .count()
        }))
    }

    fn increment_counter(
        &self,
        column_family: &str,
        key: &Slice,
        name: &Slice,
        delta: i64,
    ) -> DriverResult<()> {
        self.store.begin_call()?;
        let family = self.keyspace.family(column_family);
        family
            .counters
            .get_or_insert_with((key.clone(), name.clone()), || AtomicI64::new(0))
            .value()
            .fetch_add(delta, Ordering::AcqRel);
        Ok(())
    }

    fn read_counter(&self, column_family: &str, key: &Slice, name: &Slice) -> DriverResult<i64> {
        self.store.begin_call()?;
        let family = self.keyspace.family(column_family);
        family
            .counters
            .get(&(key.clone(), name.clone()))
            .map(|entry| entry.value().load(Ordering::Acquire))
            .ok_or_else(|| {
                DriverError::NotFound(format!("counter {name} of row {key} in '{column_family}'"))
            })
    }

    fn delete_counter(&self, column_family: &str, key: &Slice, name: &Slice) -> DriverResult<()> {
        self.store.begin_call()?;
        let family = self.keyspace.family(column_family);
        family.counters.remove(&(key.clone(), name.clone()));
        Ok(())
    }

    fn ping(&self) -> DriverResult<()> {
        self.store.begin_call()
    }
}
