//! `localStorage` backed token storage

use okshouse_admin_core::{KeyValueStore, StorageError};
use web_sys::Storage;

use crate::error::js_message;

/// The window's `localStorage`.
///
/// Private browsing modes may deny access; every call then fails with
/// [`StorageError::Unavailable`] and the session keeps working in memory.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn storage() -> Result<Storage, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(|err| StorageError::Unavailable(js_message(&err)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|err| StorageError::Unavailable(js_message(&err)))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Throws QuotaExceededError when full
        Self::storage()?
            .set_item(key, value)
            .map_err(|err| StorageError::WriteRejected(js_message(&err)))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()?
            .remove_item(key)
            .map_err(|err| StorageError::WriteRejected(js_message(&err)))
    }
}
