//! OksHouse admin session core
//!
//! Platform-neutral pieces of the admin front-end: the session lifecycle
//! ([`SessionManager`]), the cookie store holding the re-login credential,
//! token inspection and the push notification model. Browser and native
//! bindings live in the `web` and `cli` crates.

pub mod api;
pub mod config;
pub mod cookie;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod navigation;
pub mod push;
pub mod session;
pub mod storage;
#[cfg(any(test, feature = "tests"))]
pub mod testing;
pub mod token;
pub mod types;

pub use api::AdminApi;
pub use config::SessionConfig;
pub use cookie::{CookieJar, CookieStore, MemoryCookieJar, StoredCookie};
pub use error::{ApiError, SessionError, SessionResult, StorageError};
pub use navigation::Navigator;
pub use session::{MonitorRuntime, SessionManager, SessionManagerBuilder, SessionState};
pub use storage::{KeyValueStore, MemoryStore};
pub use token::{JwtInspector, TokenInspector, TokenStatus};
pub use types::{Admin, SessionSnapshot, TokenGrant};
