use crate::types::ScanError;
use std::path::PathBuf;
use std::sync::Mutex;
use std::{fs, io::Write};

/// Key-value string store seam behind the scan counter.
///
/// `set` is best-effort: a `false` return means the value was not persisted,
/// which callers treat as non-fatal.
pub trait CounterStore: Send + Sync {
    fn get(&self) -> Option<String>;
    fn set(&self, value: &str) -> bool;
}

/// Counter store backed by a single small file holding the decimal value.
pub struct FileCounterStore {
    path: PathBuf,
}

impl FileCounterStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CounterStore for FileCounterStore {
    fn get(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }

    fn set(&self, value: &str) -> bool {
        let written = fs::File::create(&self.path)
            .and_then(|mut f| f.write_all(value.as_bytes()));
        written.is_ok()
    }
}

/// In-memory store for tests and counter-less runs.
#[derive(Default)]
pub struct MemoryCounterStore {
    value: Mutex<Option<String>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CounterStore for MemoryCounterStore {
    fn get(&self) -> Option<String> {
        // A poisoned lock still holds a usable value; the store stays
        // infallible either way.
        self.value
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set(&self, value: &str) -> bool {
        *self.value.lock().unwrap_or_else(|e| e.into_inner()) = Some(value.to_string());
        true
    }
}

/// Adapter from the string store to the running scan counter.
pub struct ScanCounter {
    store: std::sync::Arc<dyn CounterStore>,
}

impl ScanCounter {
    pub fn new(store: std::sync::Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Read the persisted counter. Absence or corruption loads as 0; this
    /// never fails.
    pub fn load(&self) -> u64 {
        self.store
            .get()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0)
    }

    /// Write the counter back as a decimal string. Failure is reported but
    /// must not interrupt the scan flow.
    pub fn save(&self, n: u64) -> Result<(), ScanError> {
        if self.store.set(&n.to_string()) {
            Ok(())
        } else {
            Err(ScanError::Persistence(format!(
                "failed to store scan count {n}"
            )))
        }
    }
}
