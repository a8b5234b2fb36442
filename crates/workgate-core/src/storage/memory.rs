//! In-memory clock store.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::ClockStore;
use crate::error::StoreError;

/// Volatile store for tests and for hosts that persist elsewhere.
///
/// Uses interior mutability; the session model is single-threaded.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `(key, value)` pairs.
    pub fn with_slots<'a, I>(slots: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let store = Self::new();
        {
            let mut map = store.slots.borrow_mut();
            for (k, v) in slots {
                map.insert(k.to_string(), v.to_string());
            }
        }
        store
    }

    /// Make every subsequent write fail, simulating a full or read-only medium.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.slots.borrow().get(key).cloned()
    }
}

impl ClockStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.get() {
            return Err(StoreError::Unavailable("quota exceeded".into()));
        }
        self.slots
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
