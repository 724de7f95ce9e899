//! Observable session values

use crate::storage::KeyValueStore;
use crate::types::{Admin, SessionSnapshot};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::watch;
use tracing::{debug, error};

/// Authentication flag, admin identity, access token and loading flag.
///
/// Each value is a `watch` channel so a UI can subscribe to them
/// independently. The access token is mirrored into durable storage.
pub struct SessionState {
    is_authenticated: watch::Sender<bool>,
    admin: watch::Sender<Option<Admin>>,
    access_token: watch::Sender<Option<String>>,
    is_loading: watch::Sender<bool>,
    loading_depth: Cell<u32>,
    cached_token: RefCell<Option<String>>,
    hydrated: Cell<bool>,
    storage: Rc<dyn KeyValueStore>,
    storage_key: String,
}

impl SessionState {
    pub fn new(storage: Rc<dyn KeyValueStore>, storage_key: impl Into<String>) -> Self {
        Self {
            is_authenticated: watch::channel(false).0,
            admin: watch::channel(None).0,
            access_token: watch::channel(None).0,
            is_loading: watch::channel(false).0,
            loading_depth: Cell::new(0),
            cached_token: RefCell::new(None),
            hydrated: Cell::new(false),
            storage,
            storage_key: storage_key.into(),
        }
    }

    /// Replace the access token in memory, in the observable and in storage
    pub fn set_access_token(&self, token: Option<String>) {
        *self.cached_token.borrow_mut() = token.clone();
        self.hydrated.set(true);
        self.access_token.send_replace(token.clone());

        let result = match &token {
            Some(token) => self.storage.set_item(&self.storage_key, token),
            None => self.storage.remove_item(&self.storage_key),
        };
        if let Err(err) = result {
            error!(key = %self.storage_key, "Failed to persist access token: {err}");
        }
    }

    /// Current access token, read from storage the first time if empty
    pub fn access_token(&self) -> Option<String> {
        if self.cached_token.borrow().is_none() && !self.hydrated.replace(true) {
            match self.storage.get_item(&self.storage_key) {
                Ok(Some(stored)) => {
                    debug!("Restored access token from storage");
                    *self.cached_token.borrow_mut() = Some(stored.clone());
                    self.access_token.send_replace(Some(stored));
                }
                Ok(None) => {}
                Err(err) => error!(key = %self.storage_key, "Failed to read access token: {err}"),
            }
        }
        self.cached_token.borrow().clone()
    }

    /// Mark `admin` as signed in
    pub fn authenticate(&self, admin: Admin) {
        self.admin.send_replace(Some(admin));
        self.is_authenticated.send_replace(true);
    }

    pub fn clear_identity(&self) {
        self.is_authenticated.send_replace(false);
        self.admin.send_replace(None);
    }

    pub fn is_authenticated(&self) -> bool {
        *self.is_authenticated.borrow()
    }

    pub fn admin(&self) -> Option<Admin> {
        self.admin.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.is_loading.borrow()
    }

    /// Raise the loading flag until the guard drops.
    ///
    /// Guards nest; the flag falls only when the outermost one is released.
    pub fn begin_loading(&self) -> LoadingGuard<'_> {
        let depth = self.loading_depth.get() + 1;
        self.loading_depth.set(depth);
        if depth == 1 {
            self.is_loading.send_replace(true);
        }
        LoadingGuard { state: self }
    }

    pub fn subscribe_authenticated(&self) -> watch::Receiver<bool> {
        self.is_authenticated.subscribe()
    }

    pub fn subscribe_admin(&self) -> watch::Receiver<Option<Admin>> {
        self.admin.subscribe()
    }

    pub fn subscribe_access_token(&self) -> watch::Receiver<Option<String>> {
        self.access_token.subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.is_loading.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            is_authenticated: self.is_authenticated(),
            admin: self.admin(),
            access_token: self.cached_token.borrow().clone(),
            is_loading: self.is_loading(),
        }
    }
}

pub struct LoadingGuard<'a> {
    state: &'a SessionState,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let depth = self.state.loading_depth.get().saturating_sub(1);
        self.state.loading_depth.set(depth);
        if depth == 0 {
            self.state.is_loading.send_replace(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::storage::MemoryStore;

    const KEY: &str = "admin_access_token";

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("private mode".into()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteRejected("quota exceeded".into()))
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("private mode".into()))
        }
    }

    #[test]
    fn set_then_get_returns_token_and_mirrors_storage() {
        let store = Rc::new(MemoryStore::new());
        let state = SessionState::new(store.clone(), KEY);

        for token in ["abc", "def.ghi.jkl", ""] {
            state.set_access_token(Some(token.to_string()));
            assert_eq!(state.access_token().as_deref(), Some(token));
            assert_eq!(store.get_item(KEY).unwrap().as_deref(), Some(token));
        }

        state.set_access_token(None);
        assert_eq!(state.access_token(), None);
        assert!(!store.contains(KEY));
    }

    #[test]
    fn stored_token_is_hydrated_lazily() {
        let store = Rc::new(MemoryStore::with_item(KEY, "persisted"));
        let state = SessionState::new(store.clone(), KEY);
        let rx = state.subscribe_access_token();
        assert_eq!(*rx.borrow(), None);

        assert_eq!(state.access_token().as_deref(), Some("persisted"));
        assert_eq!(rx.borrow().as_deref(), Some("persisted"));

        // Later writes behind our back are not picked up
        store.set_item(KEY, "other-tab").unwrap();
        assert_eq!(state.access_token().as_deref(), Some("persisted"));
    }

    #[test]
    fn storage_failures_do_not_break_the_session() {
        let state = SessionState::new(Rc::new(BrokenStore), KEY);
        assert_eq!(state.access_token(), None);

        state.set_access_token(Some("in-memory".into()));
        assert_eq!(state.access_token().as_deref(), Some("in-memory"));
        state.set_access_token(None);
        assert_eq!(state.access_token(), None);
    }

    #[test]
    fn identity_and_flag_move_together() {
        let state = SessionState::new(Rc::new(MemoryStore::new()), KEY);
        let admin = Admin {
            admin_id: 7,
            name: "Oksana".into(),
            phone: None,
        };

        state.authenticate(admin.clone());
        assert!(state.is_authenticated());
        assert_eq!(state.admin(), Some(admin));

        state.clear_identity();
        assert!(!state.is_authenticated());
        assert_eq!(state.admin(), None);
    }

    #[test]
    fn loading_flag_follows_outermost_guard() {
        let state = SessionState::new(Rc::new(MemoryStore::new()), KEY);
        let loading = state.subscribe_loading();
        {
            let _outer = state.begin_loading();
            {
                let _inner = state.begin_loading();
                assert!(state.is_loading());
            }
            assert!(state.is_loading());
        }
        assert!(!state.is_loading());
        assert!(!*loading.borrow());
    }
}
