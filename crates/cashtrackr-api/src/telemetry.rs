// Logging setup
// Decision: Console output only; RUST_LOG overrides the default filter

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when RUST_LOG is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "cashtrackr_api=debug,cashtrackr_storage=info,tower_http=debug";

/// Install the global tracing subscriber
pub fn init_tracing() {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|f| EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}
