//! File-backed storage for the token and cookies
//!
//! The browser keeps these in `localStorage` and `document.cookie`; the CLI
//! keeps them as JSON files in its data directory so a session survives
//! between invocations.

use okshouse_admin_core::{CookieJar, KeyValueStore, MemoryCookieJar, StorageError, StoredCookie};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

/// JSON object of string items
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text)
                .map_err(|err| StorageError::Unavailable(format!("{}: {err}", self.path.display()))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(StorageError::Unavailable(format!(
                "{}: {err}",
                self.path.display()
            ))),
        }
    }

    fn save(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        write_json(&self.path, items).map_err(StorageError::WriteRejected)
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.load()?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.load()?;
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }
}

/// Cookie jar persisted after every write
pub struct FileCookieJar {
    path: PathBuf,
    jar: MemoryCookieJar,
}

impl FileCookieJar {
    /// Load the jar at `path`; a missing or unreadable file starts empty
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str::<Vec<StoredCookie>>(&text).unwrap_or_else(|err| {
                warn!("Ignoring corrupt cookie file {}: {err}", path.display());
                Vec::new()
            }),
            Err(_) => Vec::new(),
        };
        Self {
            path,
            jar: MemoryCookieJar::from_entries(entries),
        }
    }
}

impl CookieJar for FileCookieJar {
    fn read(&self) -> String {
        self.jar.read()
    }

    fn write(&self, assignment: &str) {
        self.jar.write(assignment);
        if let Err(err) = write_json(&self.path, &self.jar.entries()) {
            warn!("Cookie file not saved: {err}");
        }
    }
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| format!("{}: {err}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    std::fs::write(path, text).map_err(|err| format!("{}: {err}", path.display()))
}
