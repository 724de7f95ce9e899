use okshouse_admin_core::CookieJar;
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// `document.cookie`
#[derive(Debug, Clone, Default)]
pub struct DocumentCookieJar;

impl DocumentCookieJar {
    pub fn new() -> Self {
        Self
    }

    fn document() -> Option<HtmlDocument> {
        web_sys::window()?
            .document()?
            .dyn_into::<HtmlDocument>()
            .ok()
    }
}

impl CookieJar for DocumentCookieJar {
    fn read(&self) -> String {
        Self::document()
            .and_then(|document| document.cookie().ok())
            .unwrap_or_default()
    }

    fn write(&self, assignment: &str) {
        let Some(document) = Self::document() else {
            tracing::warn!("No document, cookie not written");
            return;
        };
        if let Err(err) = document.set_cookie(assignment) {
            tracing::warn!("Cookie write rejected: {err:?}");
        }
    }
}
