//! Admin session lifecycle

pub mod manager;
pub mod monitor;
pub mod state;

pub use manager::{SessionManager, SessionManagerBuilder};
#[cfg(all(feature = "tokio-runtime", not(target_arch = "wasm32")))]
pub use monitor::TokioRuntime;
pub use monitor::{MonitorRuntime, TokenMonitor};
pub use state::{LoadingGuard, SessionState};

#[cfg(test)]
mod tests;
