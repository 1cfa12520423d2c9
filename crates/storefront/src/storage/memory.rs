//! In-memory storage backend.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{KeyValueStorage, StorageError};

/// `localStorage` stand-in backed by a map.
///
/// Clones share the same map, so a test can keep a handle to inspect what
/// the store wrote. Failures can be injected to exercise the degraded paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    items: RefCell<BTreeMap<String, String>>,
    disabled: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that refuses every operation, like a locked-down private
    /// browsing window.
    #[must_use]
    pub fn unavailable() -> Self {
        let storage = Self::default();
        storage.inner.disabled.set(true);
        storage
    }

    /// Make subsequent writes fail as if the quota were exhausted.
    pub fn fail_writes(&self, fail: bool) {
        self.inner.fail_writes.set(fail);
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.items.borrow().is_empty()
    }

    fn check(&self, key: &str) -> Result<(), StorageError> {
        if self.inner.disabled.get() {
            return Err(StorageError::Access {
                key: key.to_string(),
                message: "SecurityError: storage is disabled".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check(key)?;
        Ok(self.inner.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check(key)?;
        if self.inner.fail_writes.get() {
            return Err(StorageError::Access {
                key: key.to_string(),
                message: "QuotaExceededError".to_string(),
            });
        }
        self.inner
            .items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.check(key)?;
        self.inner.items.borrow_mut().remove(key);
        Ok(())
    }
}
