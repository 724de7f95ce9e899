//! Session startup for the admin app

use crate::config::WebConfig;
use crate::cookie::DocumentCookieJar;
use crate::error::WebError;
use crate::navigation::BrowserNavigator;
use crate::runtime::BrowserRuntime;
use crate::storage::LocalStorage;
use okshouse_admin_core::SessionManager;
use okshouse_admin_http::{AdminClient, AuthorizedClient};
use std::rc::Rc;
use tracing::info;

/// Session plus a client for the rest of the admin API
#[derive(Clone)]
pub struct AdminSession {
    pub manager: SessionManager,
    pub api: AuthorizedClient,
}

/// Build the browser session and resume monitoring a stored token.
///
/// Call once at startup; [`SessionManager::dispose`] stops the monitor on
/// teardown.
pub fn start_session() -> Result<AdminSession, WebError> {
    let window = web_sys::window().ok_or(WebError::NoWindow)?;
    let origin = window.location().origin()?;

    let client = AdminClient::builder()
        .base_url(WebConfig::api_base_url(&origin))
        .build()?;

    let manager = SessionManager::builder()
        .config(WebConfig::session())
        .api(Rc::new(client.clone()))
        .storage(Rc::new(LocalStorage::new()))
        .cookies(Rc::new(DocumentCookieJar::new()))
        .navigator(Rc::new(BrowserNavigator))
        .runtime(Rc::new(BrowserRuntime))
        .build()?;

    if manager.resume_monitoring() {
        info!("Resumed session from stored token");
    }

    let api = AuthorizedClient::new(client, Rc::new(manager.clone()));
    Ok(AdminSession { manager, api })
}
