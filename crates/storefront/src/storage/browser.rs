//! `window.localStorage` backend.

use tracing::warn;
use wasm_bindgen::JsValue;

use super::{KeyValueStorage, StorageError};

/// The page's `localStorage`.
///
/// Holds no handle when storage could not be opened; every operation then
/// fails with [`StorageError::Unavailable`] and the [`super::JsonStore`]
/// availability check marks the store non-persistent.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

impl LocalStorage {
    /// Open the window's `localStorage`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] when there is no window, storage
    /// is disabled, or the access throws (sandboxed iframes, some private
    /// browsing modes).
    pub fn open() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = window
            .local_storage()
            .ok()
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self {
            storage: Some(storage),
        })
    }

    /// Open `localStorage`, or a handle that refuses everything.
    #[must_use]
    pub fn open_or_disabled() -> Self {
        Self::open().unwrap_or_else(|e| {
            warn!(error = %e, "localStorage unavailable, cart will not persist");
            Self { storage: None }
        })
    }

    fn handle(&self) -> Result<&web_sys::Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

fn access_error(key: &str, err: &JsValue) -> StorageError {
    let message = js_sys::Reflect::get(err, &JsValue::from_str("name"))
        .ok()
        .and_then(|name| name.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    StorageError::Access {
        key: key.to_string(),
        message,
    }
}

impl KeyValueStorage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.handle()?
            .get_item(key)
            .map_err(|e| access_error(key, &e))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.handle()?
            .set_item(key, value)
            .map_err(|e| access_error(key, &e))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.handle()?
            .remove_item(key)
            .map_err(|e| access_error(key, &e))
    }
}
