#![no_main]

use libfuzzer_sys::fuzz_target;
use widecol::batch::MutationBatch;
use widecol::driver::{ColumnRange, Session, StoreDriver};
use widecol::{MemoryDriver, Slice};

// Fuzz target for applying arbitrary batches to the in-memory driver.
// Every column written last in the batch must be readable afterwards.
fuzz_target!(|data: &[u8]| {
    if data.len() < 2 || data.len() > 4096 {
        return;
    }

    let driver = MemoryDriver::new();
    let session = driver.connect("fuzz").unwrap();
    let mut batch = MutationBatch::new("fuzz");
    let mut expected = std::collections::BTreeMap::new();

    for chunk in data.chunks(4) {
        let key = Slice::from(&chunk[..1]);
        let name = Slice::from(&chunk[..chunk.len().min(2)]);
        match chunk[0] % 3 {
            0 => {
                batch.delete_column("cf", key.clone(), name.clone());
                expected.remove(&(key, name));
            },
            1 => {
                batch.delete_row("cf", key.clone());
                expected.retain(|(k, _), _| *k != key);
            },
            _ => {
                let value = Slice::from(chunk);
                batch
                    .put_column("cf", key.clone(), name.clone(), value.clone(), None)
                    .unwrap();
                expected.insert((key, name), value);
            },
        }
    }

    session.execute_batch(&batch).unwrap();

    let everything = ColumnRange {
        first: None,
        last: None,
        limit: usize::MAX,
    };
    for ((key, name), value) in &expected {
        let columns = session.read_slice("cf", key, &everything).unwrap();
        let column = columns.iter().find(|c| &c.name == name).unwrap();
        assert_eq!(&column.value, value);
    }
});
