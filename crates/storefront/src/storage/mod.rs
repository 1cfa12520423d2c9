//! Persistent key-value storage.
//!
//! The cart and order records live in the browser's `localStorage`. Access is
//! abstracted behind [`KeyValueStorage`] so the same store logic runs against
//! [`MemoryStorage`] in tests and on native hosts.
//!
//! [`JsonStore`] layers JSON encoding on top and owns the failure policy:
//! - availability is checked once, at construction, with a throwaway
//!   write/delete cycle
//! - when unavailable, every read returns the caller's fallback and every
//!   write is refused with [`StorageError::Unavailable`]
//! - a missing key or malformed stored JSON reads as the fallback

#[cfg(target_arch = "wasm32")]
mod browser;
mod memory;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(target_arch = "wasm32")]
pub use browser::LocalStorage;
pub use memory::MemoryStorage;

/// Key written and removed once to detect whether storage works.
pub const TEST_KEY: &str = "__storage_test__";

/// Errors from the storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage is disabled or was unusable when checked.
    #[error("Storage unavailable")]
    Unavailable,

    /// The backend rejected the operation (quota, security policy).
    #[error("Storage access failed for {key}: {message}")]
    Access { key: String, message: String },

    /// The value could not be encoded.
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// String key-value storage with `localStorage` semantics.
///
/// Methods take `&self`; implementations use interior mutability the way the
/// browser object does.
pub trait KeyValueStorage {
    /// Read a value, `Ok(None)` if the key is absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Access`] if the backend refuses the read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Access`] if the backend refuses the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Access`] if the backend refuses the delete.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for std::rc::Rc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// JSON records over a [`KeyValueStorage`], with the availability check.
pub struct JsonStore<S> {
    backend: S,
    available: bool,
}

impl<S> JsonStore<S> {
    /// Whether the check at construction succeeded.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }

    /// The wrapped backend.
    pub const fn backend(&self) -> &S {
        &self.backend
    }
}

impl<S: KeyValueStorage> JsonStore<S> {
    /// Wrap a backend, checking it once.
    pub fn new(backend: S) -> Self {
        let available = is_writable(&backend);
        if !available {
            warn!("Storage unavailable, cart will not persist");
        }
        Self { backend, available }
    }

    /// Read and decode `key`, or return `fallback`.
    ///
    /// Never fails: absent keys, backend errors and malformed JSON all yield
    /// the fallback.
    pub fn read<T: DeserializeOwned>(&self, key: &str, fallback: T) -> T {
        if !self.available {
            return fallback;
        }

        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return fallback,
            Err(e) => {
                warn!(key, error = %e, "Storage read failed");
                return fallback;
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "Malformed stored JSON, using default");
            fallback
        })
    }

    /// Encode and write `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if the availability check failed, and the
    /// encoding or backend error otherwise.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        let raw = serde_json::to_string(value)?;
        self.backend.set_item(key, &raw)?;
        debug!(key, bytes = raw.len(), "Stored record");
        Ok(())
    }
}

fn is_writable<S: KeyValueStorage>(backend: &S) -> bool {
    let result = backend
        .set_item(TEST_KEY, TEST_KEY)
        .and_then(|()| backend.remove_item(TEST_KEY));

    match result {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "Storage availability check failed");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_check_leaves_no_key() {
        let store = JsonStore::new(MemoryStorage::new());
        assert!(store.is_available());
        assert_eq!(store.backend().get_item(TEST_KEY).unwrap(), None);
    }

    #[test]
    fn test_read_missing_key_returns_fallback() {
        let store = JsonStore::new(MemoryStorage::new());
        let value: Vec<u32> = store.read("nope", vec![7]);
        assert_eq!(value, vec![7]);
    }

    #[test]
    fn test_write_then_read() {
        let store = JsonStore::new(MemoryStorage::new());
        store.write("nums", &[1, 2, 3]).unwrap();
        assert_eq!(store.read::<Vec<u32>>("nums", Vec::new()), vec![1, 2, 3]);
        assert_eq!(
            store.backend().get_item("nums").unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[test]
    fn test_malformed_json_returns_fallback() {
        let backend = MemoryStorage::new();
        backend.set_item("cart", "{not json").unwrap();
        let store = JsonStore::new(backend);
        assert_eq!(store.read::<Vec<u32>>("cart", Vec::new()), Vec::<u32>::new());
    }

    #[test]
    fn test_unavailable_storage_degrades() {
        let store = JsonStore::new(MemoryStorage::unavailable());
        assert!(!store.is_available());
        assert_eq!(store.read::<Vec<u32>>("cart", vec![1]), vec![1]);
        assert!(matches!(
            store.write("cart", &[1]),
            Err(StorageError::Unavailable)
        ));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let backend = MemoryStorage::new();
        let store = JsonStore::new(backend.clone());
        backend.fail_writes(true);
        assert!(matches!(
            store.write("cart", &[1]),
            Err(StorageError::Access { .. })
        ));
    }
}
