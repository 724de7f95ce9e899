use okshouse_admin_core::SessionError;
use okshouse_admin_http::ClientError;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Browser setup failures
#[derive(Debug, Error)]
pub enum WebError {
    #[error("No browser window available")]
    NoWindow,

    #[error("JavaScript error: {0}")]
    Js(String),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<JsValue> for WebError {
    fn from(value: JsValue) -> Self {
        Self::Js(js_message(&value))
    }
}

impl From<WebError> for JsValue {
    fn from(err: WebError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Best readable form of a thrown JavaScript value
pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}
