//! Push notification service worker
//!
//! Loaded by a small JS shim in the worker scope, which calls
//! [`install_push_handlers`] once. Only push display is handled; nothing is
//! cached.

use crate::config::WebConfig;
use crate::error::js_message;
use js_sys::{Array, JSON, Object, Reflect};
use okshouse_admin_core::push::{ClickOutcome, NotificationSpec, PushPayload};
use serde_json::Value;
use tracing::{debug, error, info};
use wasm_bindgen::prelude::*;
use web_sys::{
    ExtendableEvent, NotificationEvent, NotificationOptions, PushEvent, ServiceWorkerGlobalScope,
};

/// Register the `install`, `push` and `notificationclick` listeners
#[wasm_bindgen(js_name = installPushHandlers)]
pub fn install_push_handlers() -> Result<(), JsValue> {
    let scope: ServiceWorkerGlobalScope = js_sys::global().dyn_into()?;

    let on_install = {
        let scope = scope.clone();
        Closure::<dyn FnMut(ExtendableEvent)>::new(move |event: ExtendableEvent| {
            info!("Service worker installed");
            if let Err(err) = scope
                .skip_waiting()
                .and_then(|promise| event.wait_until(&promise))
            {
                error!("skipWaiting failed: {}", js_message(&err));
            }
        })
    };

    let on_push = {
        let scope = scope.clone();
        Closure::<dyn FnMut(PushEvent)>::new(move |event: PushEvent| {
            if let Err(err) = show_push(&scope, &event) {
                error!("Could not show push notification: {}", js_message(&err));
            }
        })
    };

    let on_click = {
        let scope = scope.clone();
        Closure::<dyn FnMut(NotificationEvent)>::new(move |event: NotificationEvent| {
            if let Err(err) = handle_click(&scope, &event) {
                error!("Notification click failed: {}", js_message(&err));
            }
        })
    };

    scope.add_event_listener_with_callback("install", on_install.as_ref().unchecked_ref())?;
    scope.add_event_listener_with_callback("push", on_push.as_ref().unchecked_ref())?;
    scope.add_event_listener_with_callback(
        "notificationclick",
        on_click.as_ref().unchecked_ref(),
    )?;

    // Listeners live as long as the worker
    on_install.forget();
    on_push.forget();
    on_click.forget();
    Ok(())
}

fn show_push(scope: &ServiceWorkerGlobalScope, event: &PushEvent) -> Result<(), JsValue> {
    let Some(data) = event.data() else {
        debug!("Push without payload ignored");
        return Ok(());
    };

    let payload = PushPayload::from_json(&data.text())
        .map_err(|err| JsValue::from_str(&format!("invalid push payload: {err}")))?;
    let shown = WebConfig::push().notification(&payload, js_sys::Date::now() as i64);
    debug!("Showing notification {}", shown.tag);

    let promise = scope
        .registration()
        .show_notification_with_options(&shown.title, &notification_options(&shown)?)?;
    event.wait_until(&promise)
}

fn notification_options(shown: &NotificationSpec) -> Result<NotificationOptions, JsValue> {
    let options = NotificationOptions::new();
    options.set_body(&shown.body);
    options.set_icon(&shown.icon);
    options.set_badge(&shown.badge);
    options.set_tag(&shown.tag);
    options.set_renotify(shown.renotify);
    options.set_data(&to_js(&Value::Object(shown.data.clone()))?);

    let vibrate: Array = shown.vibrate.iter().map(|ms| JsValue::from(*ms)).collect();
    Reflect::set(&options, &"vibrate".into(), &vibrate)?;

    let actions = Array::new();
    for action in &shown.actions {
        let entry = Object::new();
        Reflect::set(&entry, &"action".into(), &action.action.as_str().into())?;
        Reflect::set(&entry, &"title".into(), &action.title.as_str().into())?;
        actions.push(&entry);
    }
    Reflect::set(&options, &"actions".into(), &actions)?;

    Ok(options)
}

fn handle_click(scope: &ServiceWorkerGlobalScope, event: &NotificationEvent) -> Result<(), JsValue> {
    let notification = event.notification();
    notification.close();

    let data = from_js(&notification.data());
    match WebConfig::push().click(&event.action(), &data) {
        ClickOutcome::Dismiss => Ok(()),
        ClickOutcome::Open(url) => {
            info!("Opening {url} from notification");
            event.wait_until(&scope.clients().open_window(&url))
        }
    }
}

fn to_js(value: &Value) -> Result<JsValue, JsValue> {
    JSON::parse(&value.to_string())
}

fn from_js(value: &JsValue) -> Value {
    if value.is_undefined() || value.is_null() {
        return Value::Null;
    }
    JSON::stringify(value)
        .ok()
        .and_then(|text| text.as_string())
        .and_then(|text| serde_json::from_str(&text).ok())
        .unwrap_or(Value::Null)
}
