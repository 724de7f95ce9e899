//! Browser bindings for the OksHouse admin session
//!
//! Wires the platform-neutral [`okshouse_admin_core::SessionManager`] to
//! `localStorage`, `document.cookie`, `location` and browser timers, exposes
//! the session to Yew components, and hosts the push service worker.

pub mod bootstrap;
pub mod config;
pub mod cookie;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod runtime;
pub mod service_worker;
pub mod session;
pub mod storage;

pub use bootstrap::{AdminSession, start_session};
pub use config::WebConfig;
pub use cookie::DocumentCookieJar;
pub use error::WebError;
pub use navigation::BrowserNavigator;
pub use runtime::BrowserRuntime;
pub use session::{
    SessionContext, SessionProvider, use_current_admin, use_is_authenticated, use_session,
};
pub use storage::LocalStorage;
