//! Authentication lifecycle controller
//!
//! [`SessionManager`] owns every piece of mutable session state: the
//! observable values, the token monitor and the logout flag. All operations
//! run on one thread and interleave only at `.await` points, so the logout
//! flag is checked again after every call to the backend.

use crate::api::AdminApi;
use crate::config::SessionConfig;
use crate::cookie::{CookieJar, CookieStore, MemoryCookieJar};
use crate::error::{SessionError, SessionResult};
use crate::navigation::Navigator;
use crate::session::monitor::{MonitorRuntime, TokenMonitor};
use crate::session::state::SessionState;
use crate::storage::{KeyValueStore, MemoryStore};
use crate::token::{JwtInspector, TokenInspector};
use crate::types::Admin;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::FutureExt;
use std::any::Any;
use std::cell::Cell;
use std::panic::AssertUnwindSafe;
use std::rc::Rc;
use tracing::{debug, error, info, trace, warn};

/// Session lifecycle over an injected backend and platform
#[derive(Clone)]
pub struct SessionManager {
    inner: Rc<Inner>,
}

struct Inner {
    config: SessionConfig,
    state: SessionState,
    api: Rc<dyn AdminApi>,
    cookies: CookieStore,
    inspector: Rc<dyn TokenInspector>,
    navigator: Option<Rc<dyn Navigator>>,
    monitor: TokenMonitor,
    logging_out: Cell<bool>,
    relogin_attempts: Cell<u32>,
}

impl PartialEq for SessionManager {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl SessionManager {
    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::default()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// Observable values for UI binding
    pub fn state(&self) -> &SessionState {
        &self.inner.state
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.state.access_token()
    }

    pub fn set_access_token(&self, token: Option<String>) {
        self.inner.state.set_access_token(token);
    }

    pub fn is_logging_out(&self) -> bool {
        self.inner.logging_out.get()
    }

    pub fn is_monitoring(&self) -> bool {
        self.inner.monitor.is_running()
    }

    /// Sign in with a registered phone number.
    ///
    /// A fresh login supersedes any logout still marked in progress.
    pub async fn verify_phone_and_login(&self, phone: &str) -> SessionResult<Admin> {
        self.inner.logging_out.set(false);
        self.inner.relogin_attempts.set(0);
        self.login_with_phone(phone).await
    }

    /// Obtain a new access token, falling back to a silent re-login with the
    /// stored phone, and finally to logout.
    pub async fn refresh_access_token(&self) -> SessionResult<Admin> {
        if self.is_logging_out() {
            return Err(SessionError::LogoutInProgress);
        }

        let err = match self.inner.api.refresh_token().await {
            Ok(grant) => {
                if self.is_logging_out() {
                    return Err(SessionError::LogoutInProgress);
                }
                let phone = self
                    .inner
                    .state
                    .admin()
                    .filter(|admin| admin.admin_id == grant.admin_id)
                    .and_then(|admin| admin.phone);
                self.inner
                    .state
                    .set_access_token(Some(grant.access_token.clone()));
                let admin = grant.admin(phone.as_deref());
                self.inner.state.authenticate(admin.clone());
                self.inner.relogin_attempts.set(0);
                debug!(admin_id = admin.admin_id, "Access token refreshed");
                return Ok(admin);
            }
            Err(err) => err,
        };

        if self.is_logging_out() {
            return Err(SessionError::LogoutInProgress);
        }
        warn!("Token refresh failed: {err}");

        let attempts = self.inner.relogin_attempts.get();
        match self.stored_phone() {
            Some(phone) if attempts < self.inner.config.max_relogin_attempts => {
                self.inner.relogin_attempts.set(attempts + 1);
                info!(attempt = attempts + 1, "Re-authenticating with stored phone");
                self.inner.state.set_access_token(None);
                self.login_with_phone(&phone).await
            }
            Some(_) => {
                warn!(attempts, "Silent re-login limit reached, signing out");
                self.logout().await;
                Err(err.into())
            }
            None => {
                self.logout().await;
                Err(err.into())
            }
        }
    }

    /// Look up the signed-in admin; any failure is treated as an expired token
    pub async fn get_current_admin_info(&self) -> SessionResult<Admin> {
        let Some(token) = self.access_token() else {
            return Err(SessionError::NoAccessToken);
        };

        match self.inner.api.current_admin(&token).await {
            Ok(admin) => {
                if self.is_logging_out() {
                    return Err(SessionError::LogoutInProgress);
                }
                self.inner.state.authenticate(admin.clone());
                self.inner.relogin_attempts.set(0);
                Ok(admin)
            }
            Err(err) => {
                warn!("Admin lookup failed, refreshing token: {err}");
                self.refresh_access_token().await
            }
        }
    }

    /// Restore the session at startup from a stored token or refresh credential
    pub async fn check_auth_status(&self) -> SessionResult<Admin> {
        let outcome = {
            let _loading = self.inner.state.begin_loading();
            AssertUnwindSafe(self.resolve_session()).catch_unwind().await
        };

        let result = match outcome {
            Ok(result) => result,
            Err(panic) => {
                let message = panic_message(&*panic);
                error!("Auth status check failed: {message}");
                self.logout().await;
                Err(SessionError::Unexpected(message))
            }
        };

        if result.is_ok() {
            self.start_monitoring();
        }
        result
    }

    /// Sign out locally and remotely, then return to the application root.
    ///
    /// The logout flag stays raised afterwards; only the next explicit login
    /// lowers it.
    pub async fn logout(&self) {
        if self.inner.logging_out.replace(true) {
            debug!("Logout already in progress");
            return;
        }
        self.inner.monitor.stop();

        let token = self.access_token();
        if let Err(err) = self.inner.api.logout(token.as_deref()).await {
            warn!("Logout request failed: {err}");
        }

        self.inner.state.set_access_token(None);
        self.inner.state.clear_identity();
        self.inner
            .cookies
            .erase_cookie(&self.inner.config.relogin_cookie);
        self.inner.relogin_attempts.set(0);

        if let Some(navigator) = &self.inner.navigator {
            navigator.navigate(&self.inner.config.root_path());
        }
        info!("Admin signed out");
    }

    /// Start the token monitor if a stored token is still valid
    pub fn resume_monitoring(&self) -> bool {
        match self.access_token() {
            Some(token) if self.inner.inspector.inspect(&token).is_valid => {
                self.start_monitoring()
            }
            _ => false,
        }
    }

    pub fn start_monitoring(&self) -> bool {
        if self.is_logging_out() {
            return false;
        }

        let session = Rc::downgrade(&self.inner);
        self.inner.monitor.start(move || {
            let session = session.clone();
            Box::pin(async move {
                if let Some(inner) = session.upgrade() {
                    SessionManager { inner }.check_token().await;
                }
            })
        })
    }

    pub fn stop_monitoring(&self) {
        self.inner.monitor.stop();
    }

    /// Release background work owned by this session
    pub fn dispose(&self) {
        self.inner.monitor.stop();
    }

    /// One monitor tick: refresh ahead of expiry
    pub async fn check_token(&self) {
        let Some(token) = self.access_token() else {
            return;
        };
        if self.is_logging_out() {
            return;
        }

        if !self.inner.inspector.inspect(&token).needs_refresh {
            trace!("Access token still fresh");
            return;
        }

        debug!("Access token expiring, refreshing in background");
        if let Err(err) = self.refresh_access_token().await {
            warn!("Background token refresh failed: {err}");
            self.inner.monitor.stop();
        }
    }

    /// Token to attach to an outgoing request, refreshed first when close
    /// to expiry
    pub async fn ensure_fresh_token(&self) -> Option<String> {
        let token = self.access_token()?;
        if self.is_logging_out() {
            return None;
        }
        if self.inner.inspector.inspect(&token).needs_refresh {
            if let Err(err) = self.refresh_access_token().await {
                warn!("Token refresh before request failed: {err}");
                return None;
            }
        }
        self.access_token()
    }

    /// Called after the backend rejected the token; true if a retry can
    /// use a new one
    pub async fn recover_from_unauthorized(&self) -> bool {
        match self.refresh_access_token().await {
            Ok(_) => self.access_token().is_some(),
            Err(err) => {
                warn!("Could not recover from rejected token: {err}");
                false
            }
        }
    }

    async fn resolve_session(&self) -> SessionResult<Admin> {
        if self.access_token().is_some() {
            if let Ok(admin) = self.get_current_admin_info().await {
                return Ok(admin);
            }
        }
        self.refresh_access_token().await
    }

    async fn login_with_phone(&self, phone: &str) -> SessionResult<Admin> {
        let result = {
            let _loading = self.inner.state.begin_loading();
            self.exchange_phone(phone).await
        };

        if result.is_ok() {
            self.start_monitoring();
        }
        result
    }

    async fn exchange_phone(&self, phone: &str) -> SessionResult<Admin> {
        let grant = self.inner.api.verify_phone(phone).await.map_err(|err| {
            warn!("Phone verification failed: {err}");
            SessionError::Api(err)
        })?;

        if self.is_logging_out() {
            return Err(SessionError::LogoutInProgress);
        }

        self.inner
            .state
            .set_access_token(Some(grant.access_token.clone()));
        self.remember_phone(phone);

        let admin = grant.admin(Some(phone));
        self.inner.state.authenticate(admin.clone());
        // The re-login bound counts consecutive failures only
        self.inner.relogin_attempts.set(0);
        info!(admin_id = admin.admin_id, "Admin signed in");
        Ok(admin)
    }

    /// Write the re-login cookie unless one already exists
    fn remember_phone(&self, phone: &str) {
        let name = &self.inner.config.relogin_cookie;
        let existing = self
            .inner
            .cookies
            .get_cookie(name)
            .filter(|value| !value.is_empty());
        if existing.is_none() {
            self.inner.cookies.set_cookie(
                name,
                &STANDARD.encode(phone),
                Some(self.inner.config.relogin_cookie_days),
            );
        }
    }

    /// Phone from the re-login cookie; an unreadable cookie is discarded
    fn stored_phone(&self) -> Option<String> {
        let name = &self.inner.config.relogin_cookie;
        let encoded = self
            .inner
            .cookies
            .get_cookie(name)
            .filter(|value| !value.is_empty())?;

        let decoded = STANDARD
            .decode(encoded.as_bytes())
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok());
        if decoded.is_none() {
            warn!("Discarding unreadable re-login cookie");
            self.inner.cookies.erase_cookie(name);
        }
        decoded
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Builder for [`SessionManager`]
#[derive(Default)]
pub struct SessionManagerBuilder {
    config: Option<SessionConfig>,
    api: Option<Rc<dyn AdminApi>>,
    storage: Option<Rc<dyn KeyValueStore>>,
    cookies: Option<Rc<dyn CookieJar>>,
    inspector: Option<Rc<dyn TokenInspector>>,
    navigator: Option<Rc<dyn Navigator>>,
    runtime: Option<Rc<dyn MonitorRuntime>>,
}

impl SessionManagerBuilder {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Backend client (required)
    pub fn api(mut self, api: Rc<dyn AdminApi>) -> Self {
        self.api = Some(api);
        self
    }

    /// Durable token storage; in-memory when unset
    pub fn storage(mut self, storage: Rc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Cookie jar for the re-login credential; in-memory when unset
    pub fn cookies(mut self, cookies: Rc<dyn CookieJar>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    /// Token freshness check; JWT `exp` inspection when unset
    pub fn inspector(mut self, inspector: Rc<dyn TokenInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    pub fn navigator(mut self, navigator: Rc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Runtime for the token monitor; without one the monitor never starts
    pub fn runtime(mut self, runtime: Rc<dyn MonitorRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the session manager
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` if no API client was provided
    pub fn build(self) -> SessionResult<SessionManager> {
        let api = self
            .api
            .ok_or_else(|| SessionError::Configuration("api is required".into()))?;
        let config = self.config.unwrap_or_default();

        let storage = self
            .storage
            .unwrap_or_else(|| Rc::new(MemoryStore::new()));
        let cookies = self
            .cookies
            .unwrap_or_else(|| Rc::new(MemoryCookieJar::new()));
        let inspector = self
            .inspector
            .unwrap_or_else(|| Rc::new(JwtInspector::new(config.refresh_leeway_secs)));

        let inner = Inner {
            state: SessionState::new(storage, config.token_storage_key.clone()),
            monitor: TokenMonitor::new(self.runtime, config.monitor_interval()),
            api,
            cookies: CookieStore::new(cookies),
            inspector,
            navigator: self.navigator,
            logging_out: Cell::new(false),
            relogin_attempts: Cell::new(0),
            config,
        };

        Ok(SessionManager {
            inner: Rc::new(inner),
        })
    }
}
