use okshouse_admin_core::Navigator;
use tracing::warn;

/// Full-page navigation through `window.location`
#[derive(Debug, Clone, Default)]
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn navigate(&self, path: &str) {
        let Some(window) = web_sys::window() else {
            return;
        };
        if let Err(err) = window.location().assign(path) {
            warn!("Navigation to {path} failed: {err:?}");
        }
    }
}
