//! Reservation push notifications
//!
//! The service worker receives two payload shapes: FCM data messages
//! (`{"data": {"title": ..., "body": ...}}`) and plain web push messages
//! (`{"title": ..., "body": ..., "data": {...}}`). Both resolve to one
//! [`NotificationSpec`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const VIEW_ACTION: &str = "view";
pub const CLOSE_ACTION: &str = "close";

/// Incoming push message
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PushPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl PushPayload {
    /// Parse a push message body
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a JSON object
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    fn field(&self, key: &str) -> Option<String> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Everything needed to show a system notification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationSpec {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub tag: String,
    pub renotify: bool,
    pub vibrate: Vec<u32>,
    pub data: Map<String, Value>,
    pub actions: Vec<NotificationAction>,
}

/// What a notification click should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Close the notification only
    Dismiss,
    /// Close it and open a window at this URL
    Open(String),
}

/// Defaults applied to every push notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    pub base_path: String,
    pub default_title: String,
    pub default_body: String,
    /// Button label for [`VIEW_ACTION`]
    pub view_title: String,
    /// Button label for [`CLOSE_ACTION`]
    pub close_title: String,
    pub tag_prefix: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            default_title: "새로운 알림".to_string(),
            default_body: "새로운 예약 알림이 있습니다.".to_string(),
            view_title: "확인하기".to_string(),
            close_title: "닫기".to_string(),
            tag_prefix: "okshouse-reservation-".to_string(),
        }
    }
}

impl PushConfig {
    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = base_path.into().trim_end_matches('/').to_string();
        self
    }

    fn root(&self) -> String {
        format!("{}/", self.base_path)
    }

    /// Build the notification for `payload`; `now_ms` keeps tags unique so
    /// every reservation alert is shown
    pub fn notification(&self, payload: &PushPayload, now_ms: i64) -> NotificationSpec {
        let title = payload
            .field("title")
            .or_else(|| payload.title.clone())
            .unwrap_or_else(|| self.default_title.clone());
        let body = payload
            .field("body")
            .or_else(|| payload.body.clone())
            .unwrap_or_else(|| self.default_body.clone());

        NotificationSpec {
            title,
            body,
            icon: payload
                .field("icon")
                .unwrap_or_else(|| format!("{}/icons/icon-192x192.png", self.base_path)),
            badge: payload
                .field("badge")
                .unwrap_or_else(|| format!("{}/icons/badge-72x72.png", self.base_path)),
            tag: format!("{}{now_ms}", self.tag_prefix),
            renotify: true,
            vibrate: vec![100, 50, 100],
            data: payload.data.clone(),
            actions: vec![
                NotificationAction {
                    action: VIEW_ACTION.to_string(),
                    title: self.view_title.clone(),
                },
                NotificationAction {
                    action: CLOSE_ACTION.to_string(),
                    title: self.close_title.clone(),
                },
            ],
        }
    }

    /// Resolve a click on a notification carrying `data`
    pub fn click(&self, action: &str, data: &Value) -> ClickOutcome {
        if action == CLOSE_ACTION {
            return ClickOutcome::Dismiss;
        }

        let target = data
            .get("click_action")
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.root());
        ClickOutcome::Open(target)
    }
}
