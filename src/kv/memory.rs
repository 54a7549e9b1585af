// In-process key-value backend
// Used for ephemeral stores and for exercising persistence failure paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::KeyValueStore;
use crate::error::{LeafeonError, Result};

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    data: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value without counting it as a write.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut data) = store.data.lock() {
            data.insert(key.to_string(), value.to_string());
        }
        store
    }

    /// Make every subsequent `get` fail.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `set` fail.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `set` calls.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Raw stored value, bypassing failure injection.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().ok().and_then(|data| data.get(key).cloned())
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LeafeonError::Persistence(format!("Read of '{}' failed", key)));
        }
        let data = self
            .data
            .lock()
            .map_err(|e| LeafeonError::Persistence(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LeafeonError::Persistence(format!("Write of '{}' failed", key)));
        }
        let mut data = self
            .data
            .lock()
            .map_err(|e| LeafeonError::Persistence(e.to_string()))?;
        data.insert(key.to_string(), value.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
