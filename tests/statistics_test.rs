use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;
use widecol::{
    ColumnFamilyConfig, MemoryDriver, MetricName, MetricsSink, Persistence, PersistenceConfig,
    SerializerTag, Statistics, Value,
};

fn config() -> PersistenceConfig {
    PersistenceConfig::new().keyspace("ks").column_family(ColumnFamilyConfig::new(
        "orders",
        SerializerTag::String,
        SerializerTag::String,
    ))
}

fn open() -> (MemoryDriver, Arc<Statistics>, Persistence) {
    let driver = MemoryDriver::new();
    let stats = Arc::new(Statistics::new());
    let persistence = Persistence::open(&driver, &config(), stats.clone()).unwrap();
    (driver, stats, persistence)
}

/// Records every call in order.
#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<(MetricName, u64)>>,
}

impl MetricsSink for RecordingSink {
    fn add_to_counter(&self, name: MetricName, amount: u64) {
        self.calls.lock().push((name, amount));
    }
}

#[test]
fn test_reads_and_writes_counted() {
    let (_, stats, p) = open();

    p.put_column("ks", "orders", "o1", "status", "new", None).unwrap();
    p.put_row("ks", "orders", "o2", [("a", "1"), ("b", "2"), ("c", "3")], None)
        .unwrap();
    assert_eq!(stats.num_writes(), 4);

    p.read_column_slice("ks", "orders", "o1", None, None, 10).unwrap();
    p.scan_rows("ks", "orders", None, 10, 10).unwrap();
    p.read_column("ks", "orders", "o1", "status").unwrap();
    assert_eq!(stats.num_reads(), 3);
}

#[test]
fn test_failures_are_counted() {
    let (driver, stats, p) = open();
    driver.set_available(false);

    assert!(p.put_column("ks", "orders", "o1", "status", "new", None).is_err());
    assert!(p.scan_rows("ks", "orders", None, 10, 10).is_err());
    assert!(p.read_counter("ks", "orders", "o1", "hits").is_err());

    assert_eq!(stats.num_writes(), 1);
    assert_eq!(stats.num_reads(), 2);
}

#[test]
fn test_resolution_failures_are_counted() {
    let (driver, stats, p) = open();
    let calls = driver.call_count();

    assert!(p.put_column("nope", "orders", "o1", "a", "1", None).unwrap_err().is_unknown_keyspace());
    assert!(p.read_column("ks", "nope", "o1", "a").unwrap_err().is_unknown_column_family());
    assert!(
        p.delete_column("ks", "orders", "o1", Some(Value::Long(1)))
            .unwrap_err()
            .is_invalid_argument()
    );

    assert_eq!(driver.call_count(), calls);
    assert_eq!(stats.num_writes(), 2);
    assert_eq!(stats.num_reads(), 1);
}

#[test]
fn test_rejected_decrement_is_counted() {
    let (driver, stats, p) = open();
    let calls = driver.call_count();

    let err = p
        .decrement_counter("ks", "orders", "o1", "hits", i64::MIN)
        .unwrap_err();
    assert!(err.is_invalid_argument());

    assert_eq!(driver.call_count(), calls);
    assert_eq!(stats.num_writes(), 1);
    assert_eq!(stats.num_reads(), 0);
}

#[test]
fn test_latency_and_count_emitted_per_operation() {
    let driver = MemoryDriver::new();
    let sink = Arc::new(RecordingSink::default());
    let p = Persistence::open(&driver, &config(), sink.clone()).unwrap();

    p.put_column("ks", "orders", "o1", "status", "new", None).unwrap();
    driver.set_available(false);
    let _ = p.count_columns("ks", "orders", "o1");

    let calls = sink.calls.lock().clone();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0].0, MetricName::OperationLatency);
    assert_eq!(calls[1], (MetricName::WriteCount, 1));
    assert_eq!(calls[2].0, MetricName::OperationLatency);
    assert_eq!(calls[3], (MetricName::ReadCount, 1));
}

#[test]
fn test_shared_sink_across_threads() {
    let (_, stats, p) = open();
    let p = Arc::new(p);
    let done = Arc::new(AtomicU64::new(0));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let p = Arc::clone(&p);
            let done = Arc::clone(&done);
            std::thread::spawn(move || {
                for i in 0..25 {
                    p.put_column("ks", "orders", format!("o{t}-{i}"), "a", "1", None)
                        .unwrap();
                    p.count_columns("ks", "orders", format!("o{t}-{i}")).unwrap();
                    done.fetch_add(1, Ordering::Relaxed);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(done.load(Ordering::Relaxed), 100);
    assert_eq!(stats.num_writes(), 100);
    assert_eq!(stats.num_reads(), 100);
    assert!(stats.report().contains("Writes:        100"));
}
