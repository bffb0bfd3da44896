//! In-process key-value store.
//!
//! Used by tests and by callers that do not need durability. Failures can be
//! injected to exercise the engine's degraded paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{KvStore, KvWrite};
use crate::error::StorageError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    /// Remaining write operations before writes start failing.
    write_budget: Mutex<Option<usize>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose reads and writes all fail.
    pub fn failing() -> Self {
        let store = Self::default();
        store.set_fail_reads(true);
        store.set_fail_writes(true);
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Let `n` more write operations succeed, then fail every write.
    /// A batch counts as one operation.
    pub fn fail_writes_after(&self, n: usize) {
        *self.budget() = Some(n);
    }

    /// Number of successful write operations so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values().contains_key(key)
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn budget(&self) -> MutexGuard<'_, Option<usize>> {
        self.write_budget
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_read(&self) -> Result<(), StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("reads disabled".into()));
        }
        Ok(())
    }

    fn begin_write(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        let mut budget = self.budget();
        if let Some(left) = budget.as_mut() {
            if *left == 0 {
                return Err(StorageError::Unavailable("write budget exhausted".into()));
            }
            *left -= 1;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_read()?;
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.begin_write()?;
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.begin_write()?;
        self.values().remove(key);
        Ok(())
    }

    fn apply(&self, writes: &[KvWrite]) -> Result<(), StorageError> {
        self.begin_write()?;
        let mut values = self.values();
        for write in writes {
            match write {
                KvWrite::Set(key, value) => {
                    values.insert((*key).to_string(), value.clone());
                }
                KvWrite::Remove(key) => {
                    values.remove(*key);
                }
            }
        }
        Ok(())
    }
}
