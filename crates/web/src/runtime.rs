use futures::future::LocalBoxFuture;
use okshouse_admin_core::MonitorRuntime;
use std::time::Duration;

/// Browser event loop: tasks are promises, sleeps are `setTimeout`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserRuntime;

impl MonitorRuntime for BrowserRuntime {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(gloo_timers::future::sleep(duration))
    }
}
