use std::{collections::HashMap, error::Error, sync::Arc, time::Duration};

use widecol::{
    ColumnFamilyConfig, MemoryDriver, Persistence, PersistenceConfig, SerializerTag, Statistics,
    Value,
};

fn open() -> (MemoryDriver, Persistence) {
    let driver = MemoryDriver::new();
    let config = PersistenceConfig::new()
        .keyspace("ks")
        .column_family(ColumnFamilyConfig::new(
            "orders",
            SerializerTag::String,
            SerializerTag::String,
        ))
        .column_family(
            ColumnFamilyConfig::new("ledger", SerializerTag::Long, SerializerTag::String)
                .with_value_type(SerializerTag::Bytes),
        );
    let persistence = Persistence::open(&driver, &config, Arc::new(Statistics::new())).unwrap();
    driver.create_index("ks", "orders", "status");
    (driver, persistence)
}

#[test]
fn test_put_row_then_read_slice() {
    let (_, p) = open();

    p.put_row("ks", "orders", "o1", [("status", "new")], None).unwrap();

    let slice = p
        .read_column_slice("ks", "orders", "o1", None, None, 10)
        .unwrap();
    assert_eq!(slice.size(), 1);
    let column = &slice.columns().unwrap()[0];
    assert_eq!(column.name(), &Value::from("status"));
    assert_eq!(column.value(), &Value::from("new"));
}

#[test]
fn test_read_after_write_sees_every_column() {
    let (_, p) = open();

    let columns: HashMap<String, String> = (0..20)
        .map(|i| (format!("c{i:02}"), format!("v{i}")))
        .collect();
    p.put_row("ks", "orders", "o1", columns.clone(), None).unwrap();

    let slice = p
        .read_column_slice("ks", "orders", "o1", None, None, 100)
        .unwrap();
    let read = slice.columns().unwrap();
    assert_eq!(read.len(), columns.len());
    for column in read {
        let name = column.name().as_str().unwrap();
        assert_eq!(column.value().as_str(), Some(columns[name].as_str()));
    }
    // ascending by name
    assert!(read.windows(2).all(|w| w[0].name().as_str() < w[1].name().as_str()));
}

#[test]
fn test_overwrite_last_write_wins() {
    let (_, p) = open();
    p.put_column("ks", "orders", "o1", "status", "new", None).unwrap();
    p.put_column("ks", "orders", "o1", "status", "paid", None).unwrap();

    let column = p.read_column("ks", "orders", "o1", "status").unwrap().unwrap();
    assert_eq!(column.value(), &Value::from("paid"));
}

#[test]
fn test_delete_column_and_row() {
    let (_, p) = open();
    p.put_row("ks", "orders", "o1", [("status", "new"), ("total", "9")], None)
        .unwrap();

    p.delete_column("ks", "orders", "o1", Some(Value::from("total")))
        .unwrap();
    assert_eq!(p.count_columns("ks", "orders", "o1").unwrap(), 1);

    p.delete_column("ks", "orders", "o1", None).unwrap();
    let slice = p
        .read_column_slice("ks", "orders", "o1", None, None, 10)
        .unwrap();
    assert!(slice.is_empty());
}

#[test]
fn test_delete_rows_whole_rows() {
    let (_, p) = open();
    for key in ["o1", "o2", "o3"] {
        p.put_column("ks", "orders", key, "status", "new", None).unwrap();
    }

    p.delete_rows("ks", "orders", ["o1", "o3"], None).unwrap();

    assert_eq!(p.count_columns("ks", "orders", "o1").unwrap(), 0);
    assert_eq!(p.count_columns("ks", "orders", "o2").unwrap(), 1);
    assert_eq!(p.count_columns("ks", "orders", "o3").unwrap(), 0);
}

#[test]
fn test_ttl_expiry() {
    let (driver, p) = open();
    p.put_column("ks", "orders", "o1", "lock", "held", Some(30)).unwrap();
    p.put_column("ks", "orders", "o1", "status", "new", None).unwrap();

    assert_eq!(p.count_columns("ks", "orders", "o1").unwrap(), 2);

    driver.advance_time(Duration::from_secs(31));
    assert!(p.read_column("ks", "orders", "o1", "lock").unwrap().is_none());
    assert_eq!(p.count_columns("ks", "orders", "o1").unwrap(), 1);
}

#[test]
fn test_slice_bounds_are_inclusive() {
    let (_, p) = open();
    let columns: Vec<(String, String)> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|c| (c.to_string(), c.to_uppercase()))
        .collect();
    p.put_row("ks", "orders", "o1", columns, None).unwrap();

    let names = |first: Option<&str>, last: Option<&str>, limit: usize| -> Vec<String> {
        p.read_column_slice(
            "ks",
            "orders",
            "o1",
            first.map(Value::from),
            last.map(Value::from),
            limit,
        )
        .unwrap()
        .columns()
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect()
    };

    assert_eq!(names(Some("b"), Some("d"), 10), vec!["b", "c", "d"]);
    assert_eq!(names(Some("d"), None, 10), vec!["d", "e"]);
    assert_eq!(names(None, Some("b"), 10), vec!["a", "b"]);
    assert_eq!(names(None, None, 2), vec!["a", "b"]);
    assert!(names(Some("d"), Some("b"), 10).is_empty());
}

#[test]
fn test_long_keys_and_bytes_values() {
    let (_, p) = open();
    for id in [-5i64, 3, -1, 42] {
        p.put_column("ks", "ledger", id, "payload", vec![id as u8], None)
            .unwrap();
    }

    let rows = p.scan_rows("ks", "ledger", None, 10, 10).unwrap();
    let keys: Vec<i64> = rows.iter().map(|r| r.key().as_long().unwrap()).collect();
    assert_eq!(keys, vec![-5, -1, 3, 42]);

    let column = p.read_column("ks", "ledger", 3i64, "payload").unwrap().unwrap();
    assert_eq!(column.value().as_bytes(), Some(&[3u8][..]));
}

#[test]
fn test_transport_failure_is_storage_unavailable() {
    let (driver, p) = open();
    p.put_column("ks", "orders", "o1", "status", "new", None).unwrap();

    driver.set_available(false);

    let err = p
        .put_column("ks", "orders", "o2", "status", "new", None)
        .unwrap_err();
    assert!(err.is_storage_unavailable());
    assert!(err.source().is_some());

    // a failed read is never an empty result
    let err = p.scan_rows("ks", "orders", None, 10, 10).unwrap_err();
    assert!(err.is_storage_unavailable());
    let err = p
        .read_column_slice("ks", "orders", "o1", None, None, 10)
        .unwrap_err();
    assert!(err.is_storage_unavailable());

    let failures = [
        p.scan_rows_by_index("ks", "orders", "status", "new", 10, 10)
            .map(|_| ()),
        p.scan_rows_by_indexes("ks", "orders", [("status", "new")], 10, 10)
            .map(|_| ()),
        p.delete_column("ks", "orders", "o1", Some(Value::from("status"))),
        p.delete_column("ks", "orders", "o1", None),
        p.delete_rows("ks", "orders", ["o1"], None),
        p.delete_counter("ks", "orders", "o1", "hits"),
    ];
    for result in failures {
        let err = result.unwrap_err();
        assert!(err.is_storage_unavailable(), "{err}");
        assert!(err.source().is_some());
    }

    driver.set_available(true);
    let rows = p
        .scan_rows_by_index("ks", "orders", "status", "new", 10, 10)
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(p.count_columns("ks", "orders", "o2").unwrap(), 0);
    assert_eq!(p.count_columns("ks", "orders", "o1").unwrap(), 1);
}

#[test]
fn test_unknown_column_family() {
    let (driver, p) = open();
    let calls = driver.call_count();

    let err = p
        .put_column("ks", "users", "u1", "name", "x", None)
        .unwrap_err();
    assert!(err.is_unknown_column_family());
    assert_eq!(driver.call_count(), calls);
}

#[test]
fn test_concurrent_writers() {
    let (_, p) = open();
    let p = Arc::new(p);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let p = Arc::clone(&p);
            std::thread::spawn(move || {
                for i in 0..50 {
                    p.put_column("ks", "orders", format!("t{t}"), format!("c{i:02}"), "x", None)
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for t in 0..8 {
        assert_eq!(p.count_columns("ks", "orders", format!("t{t}")).unwrap(), 50);
    }
}
