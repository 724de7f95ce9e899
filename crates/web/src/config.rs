//! Frontend configuration

use okshouse_admin_core::{SessionConfig, push::PushConfig};

/// Deployment settings baked into the bundle
pub struct WebConfig;

impl WebConfig {
    /// Path prefix the app is served under
    pub const BASE_PATH: &'static str = "/OksHouse-Admin";

    /// Backend origin; empty means same origin as the page
    pub const API_BASE_URL: &'static str = match option_env!("OKS_ADMIN_API_URL") {
        Some(url) => url,
        None => "",
    };

    pub fn session() -> SessionConfig {
        SessionConfig::production().with_base_path(Self::BASE_PATH)
    }

    pub fn push() -> PushConfig {
        PushConfig::default().with_base_path(Self::BASE_PATH)
    }

    /// Absolute backend URL, falling back to `origin` when none was configured
    pub fn api_base_url(origin: &str) -> String {
        if Self::API_BASE_URL.is_empty() {
            origin.trim_end_matches('/').to_string()
        } else {
            Self::API_BASE_URL.trim_end_matches('/').to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_lives_under_base_path() {
        assert_eq!(WebConfig::session().root_path(), "/OksHouse-Admin/");
    }

    #[test]
    fn push_defaults_use_base_path() {
        assert_eq!(WebConfig::push().base_path, "/OksHouse-Admin");
    }

    #[test]
    fn api_url_defaults_to_origin() {
        if WebConfig::API_BASE_URL.is_empty() {
            assert_eq!(
                WebConfig::api_base_url("https://admin.okshouse.kr/"),
                "https://admin.okshouse.kr"
            );
        }
    }
}
