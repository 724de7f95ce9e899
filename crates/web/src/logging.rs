//! Console logging for the browser

use tracing::Level;
use tracing_subscriber::{
    filter::LevelFilter, fmt::format::Pretty, layer::SubscriberExt, util::SubscriberInitExt,
};
use tracing_web::{MakeWebConsoleWriter, performance_layer};

/// Route `tracing` output to the browser console and install the panic hook.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging(level: Level) {
    console_error_panic_hook::set_once();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .without_time()
        .with_writer(MakeWebConsoleWriter::new());
    let perf_layer = performance_layer().with_details_from_fields(Pretty::default());

    let _ = tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(fmt_layer)
        .with(perf_layer)
        .try_init();
}
