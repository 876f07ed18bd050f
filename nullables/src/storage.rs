//! Nullable storage — an in-memory `localStorage` for testing.

use ridepay_store::{LocalStorage, StoreError};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory key/value storage that records writes and can be told to fail.
#[derive(Default)]
pub struct NullStorage {
    entries: Mutex<BTreeMap<String, String>>,
    writes: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
}

impl NullStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail with a backend error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Keys written so far, in write order (for assertions).
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("storage is read-only".into()));
        }
        Ok(())
    }
}

impl LocalStorage for NullStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self.writes.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        self.check_writable()?;
        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_writes() {
        let storage = NullStorage::new();
        storage.set_item("a", "1").unwrap();
        storage.set_item("a", "2").unwrap();
        assert_eq!(storage.writes(), vec!["a", "a"]);
        assert_eq!(storage.get_item("a").unwrap(), Some("2".into()));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn failing_writes_leave_state_alone() {
        let storage = NullStorage::new();
        storage.set_item("a", "1").unwrap();
        storage.fail_writes(true);
        assert!(matches!(storage.set_item("a", "2"), Err(StoreError::Backend(_))));
        assert!(storage.remove_item("a").is_err());
        assert_eq!(storage.get_item("a").unwrap(), Some("1".into()));
    }
}
