//! Session configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
pub use ::config::ConfigError;

/// Settings shared by the session manager, token monitor and push handlers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Durable storage key holding the access token
    pub token_storage_key: String,
    /// Cookie holding the encoded phone used for silent re-login
    pub relogin_cookie: String,
    /// Lifetime of the re-login cookie in days
    pub relogin_cookie_days: u32,
    /// Period between token monitor checks
    pub monitor_interval_secs: u64,
    /// Tokens expiring within this window are refreshed ahead of time
    pub refresh_leeway_secs: i64,
    /// Application base path; logout navigates to `{base_path}/`
    pub base_path: String,
    /// Consecutive silent re-logins allowed before giving up
    pub max_relogin_attempts: u32,
}

impl SessionConfig {
    pub const DEFAULT_TOKEN_STORAGE_KEY: &'static str = "admin_access_token";
    pub const DEFAULT_RELOGIN_COOKIE: &'static str = "admin_phone";
    pub const PRODUCTION_BASE_PATH: &'static str = "/OksHouse-Admin";

    /// Configuration used by the deployed admin site
    pub fn production() -> Self {
        Self {
            base_path: Self::PRODUCTION_BASE_PATH.to_string(),
            ..Self::default()
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into().trim_end_matches('/').to_string();
        self
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_secs(self.monitor_interval_secs)
    }

    /// Path the application returns to after logout
    pub fn root_path(&self) -> String {
        format!("{}/", self.base_path.trim_end_matches('/'))
    }

    /// Load configuration from an optional file plus `OKS_ADMIN__*` variables
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        let settings = builder
            .add_source(::config::Environment::with_prefix("OKS_ADMIN").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_storage_key: Self::DEFAULT_TOKEN_STORAGE_KEY.to_string(),
            relogin_cookie: Self::DEFAULT_RELOGIN_COOKIE.to_string(),
            relogin_cookie_days: 365,
            monitor_interval_secs: 30,
            refresh_leeway_secs: 60,
            base_path: String::new(),
            max_relogin_attempts: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_path_handles_empty_and_prefixed_base() {
        assert_eq!(SessionConfig::default().root_path(), "/");
        assert_eq!(SessionConfig::production().root_path(), "/OksHouse-Admin/");
        assert_eq!(
            SessionConfig::default().with_base_path("/admin/").root_path(),
            "/admin/"
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"monitor_interval_secs": 10}"#).unwrap();
        assert_eq!(config.monitor_interval(), Duration::from_secs(10));
        assert_eq!(config.relogin_cookie, "admin_phone");
        assert_eq!(config.relogin_cookie_days, 365);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn load_without_file_uses_defaults() {
        let config = SessionConfig::load(None).unwrap();
        assert_eq!(config.token_storage_key, "admin_access_token");
    }
}
