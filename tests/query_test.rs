use std::sync::Arc;

use widecol::{
    ColumnFamilyConfig, Component, Composite, MemoryDriver, Persistence, PersistenceConfig, Row,
    SerializerTag, Statistics, Value,
};

fn open() -> (MemoryDriver, Persistence) {
    let driver = MemoryDriver::new();
    let config = PersistenceConfig::new()
        .keyspace("ks")
        .column_family(ColumnFamilyConfig::new(
            "users",
            SerializerTag::String,
            SerializerTag::String,
        ))
        .column_family(ColumnFamilyConfig::new(
            "queue_messages",
            SerializerTag::String,
            SerializerTag::Composite,
        ));
    let persistence = Persistence::open(&driver, &config, Arc::new(Statistics::new())).unwrap();
    driver.create_index("ks", "users", "city");
    driver.create_index("ks", "users", "plan");
    (driver, persistence)
}

fn keys(rows: &[Row]) -> Vec<String> {
    rows.iter().map(|row| row.key().to_string()).collect()
}

fn load_users(p: &Persistence) {
    let users = [
        ("u1", "paris", "free"),
        ("u2", "berlin", "pro"),
        ("u3", "paris", "pro"),
        ("u4", "rome", "free"),
        ("u5", "paris", "pro"),
    ];
    for (key, city, plan) in users {
        p.put_row(
            "ks",
            "users",
            key,
            [("city", city), ("plan", plan), ("name", key)],
            None,
        )
        .unwrap();
    }
}

#[test]
fn test_scan_rows_in_key_order() {
    let (_, p) = open();
    load_users(&p);

    let rows = p.scan_rows("ks", "users", None, 10, 10).unwrap();
    assert_eq!(keys(&rows), vec!["u1", "u2", "u3", "u4", "u5"]);

    let rows = p
        .scan_rows("ks", "users", Some(Value::from("u2")), 2, 10)
        .unwrap();
    assert_eq!(keys(&rows), vec!["u3", "u4"]);
}

#[test]
fn test_scan_rows_truncates_columns() {
    let (_, p) = open();
    load_users(&p);

    let rows = p.scan_rows("ks", "users", None, 1, 2).unwrap();
    assert_eq!(rows.len(), 1);
    let names: Vec<String> = rows[0]
        .columns()
        .columns()
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names, vec!["city", "name"]);
}

#[test]
fn test_pagination_walks_every_row_once() {
    let (_, p) = open();
    for i in 0..23 {
        p.put_column("ks", "users", format!("user{i:03}"), "name", "x", None)
            .unwrap();
    }

    let mut seen = Vec::new();
    let mut start = None;
    loop {
        let page = p.scan_rows("ks", "users", start.clone(), 5, 10).unwrap();
        if page.is_empty() {
            break;
        }
        start = page.last().map(|row| row.key().clone());
        seen.extend(keys(&page));
    }

    let expected: Vec<String> = (0..23).map(|i| format!("user{i:03}")).collect();
    assert_eq!(seen, expected);
}

#[test]
fn test_scan_rows_by_index() {
    let (_, p) = open();
    load_users(&p);

    let rows = p
        .scan_rows_by_index("ks", "users", "city", "paris", 10, 10)
        .unwrap();
    assert_eq!(keys(&rows), vec!["u1", "u3", "u5"]);

    let rows = p
        .scan_rows_by_index("ks", "users", "city", "paris", 2, 10)
        .unwrap();
    assert_eq!(rows.len(), 2);

    let rows = p
        .scan_rows_by_index("ks", "users", "city", "oslo", 10, 10)
        .unwrap();
    assert!(rows.is_empty());
}

#[test]
fn test_scan_rows_by_indexes_is_conjunction() {
    let (_, p) = open();
    load_users(&p);

    let rows = p
        .scan_rows_by_indexes("ks", "users", [("city", "paris"), ("plan", "pro")], 10, 10)
        .unwrap();
    assert_eq!(keys(&rows), vec!["u3", "u5"]);
}

#[test]
fn test_index_scan_requires_index() {
    let (_, p) = open();
    load_users(&p);

    let err = p
        .scan_rows_by_index("ks", "users", "name", "u1", 10, 10)
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let none: [(&str, &str); 0] = [];
    let err = p
        .scan_rows_by_indexes("ks", "users", none, 10, 10)
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn test_composite_slice_bounds() {
    let (_, p) = open();
    for (message, seq) in [("m1", 1i64), ("m1", 2), ("m2", 1), ("m3", 7)] {
        let name = Composite::new([Component::from(message), Component::from(seq)]).unwrap();
        p.put_column("ks", "queue_messages", "q1", name, "payload", None)
            .unwrap();
    }

    let first = Composite::new(["m1"]).unwrap();
    let last = Composite::new(["m2"]).unwrap();
    let slice = p
        .read_column_slice(
            "ks",
            "queue_messages",
            "q1",
            Some(Value::from(first)),
            Some(Value::from(last)),
            10,
        )
        .unwrap();

    // ("m1") sorts before ("m1", n) and ("m2") before ("m2", n)
    let names: Vec<String> = slice
        .columns()
        .unwrap()
        .iter()
        .map(|c| c.name().to_string())
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.iter().all(|n| n.starts_with("(m1:")));
}
