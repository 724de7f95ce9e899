//! Recurring access token check

use futures::future::{AbortHandle, Abortable, LocalBoxFuture};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// Timer and task primitives the monitor runs on
pub trait MonitorRuntime {
    /// Run `task` to completion on the current thread
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()>;
}

/// Native runtime; tasks go through `tokio::task::spawn_local`, so the
/// session must live inside a `LocalSet`.
#[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioRuntime;

#[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
impl MonitorRuntime for TokioRuntime {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        tokio::task::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// At most one recurring timer.
///
/// Each period spawns the tick as its own task: stopping the monitor cancels
/// future ticks but never one that is already running.
pub struct TokenMonitor {
    runtime: Option<Rc<dyn MonitorRuntime>>,
    period: Duration,
    handle: RefCell<Option<AbortHandle>>,
}

impl TokenMonitor {
    pub fn new(runtime: Option<Rc<dyn MonitorRuntime>>, period: Duration) -> Self {
        Self {
            runtime,
            period,
            handle: RefCell::new(None),
        }
    }

    /// Install the timer, replacing any running one.
    ///
    /// Returns `false` when there is no runtime to schedule on.
    pub fn start<F>(&self, tick: F) -> bool
    where
        F: Fn() -> LocalBoxFuture<'static, ()> + 'static,
    {
        let Some(runtime) = self.runtime.clone() else {
            debug!("No runtime available, token monitor not started");
            return false;
        };

        self.stop();

        let (abort, registration) = AbortHandle::new_pair();
        let period = self.period;
        let scheduler = runtime.clone();
        let schedule = Abortable::new(
            async move {
                loop {
                    scheduler.sleep(period).await;
                    scheduler.spawn(tick());
                }
            },
            registration,
        );
        runtime.spawn(Box::pin(async move {
            let _ = schedule.await;
        }));

        *self.handle.borrow_mut() = Some(abort);
        debug!(period_secs = period.as_secs(), "Token monitor started");
        true
    }

    pub fn stop(&self) {
        if let Some(handle) = self.handle.borrow_mut().take() {
            handle.abort();
            debug!("Token monitor stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.borrow().is_some()
    }
}

impl Drop for TokenMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}
