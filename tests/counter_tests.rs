use std::fs;
use std::sync::Arc;

use phishguard::counter::{CounterStore, FileCounterStore, ScanCounter};

#[test]
fn file_store_round_trips_counter_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scan_count");
    let counter = ScanCounter::new(Arc::new(FileCounterStore::new(&path)));

    for n in [0u64, 1, 99, 12_345, u64::MAX] {
        counter.save(n).expect("save");
        assert_eq!(counter.load(), n);
    }
}

#[test]
fn counter_survives_adapter_recreation() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scan_count");

    ScanCounter::new(Arc::new(FileCounterStore::new(&path)))
        .save(7)
        .expect("save");

    let reopened = ScanCounter::new(Arc::new(FileCounterStore::new(&path)));
    assert_eq!(reopened.load(), 7);
}

#[test]
fn missing_file_loads_as_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let counter = ScanCounter::new(Arc::new(FileCounterStore::new(dir.path().join("absent"))));
    assert_eq!(counter.load(), 0);
}

#[test]
fn corrupt_file_loads_as_zero() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scan_count");
    fs::write(&path, "forty-two").expect("write");
    assert_eq!(ScanCounter::new(Arc::new(FileCounterStore::new(&path))).load(), 0);

    fs::write(&path, "-3").expect("write");
    assert_eq!(ScanCounter::new(Arc::new(FileCounterStore::new(&path))).load(), 0);
}

#[test]
fn trailing_newline_is_tolerated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("scan_count");
    fs::write(&path, "42\n").expect("write");

    let store = FileCounterStore::new(&path);
    assert!(store.get().is_some());
    assert_eq!(ScanCounter::new(Arc::new(store)).load(), 42);
}
