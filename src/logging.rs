// Tracing setup for the relay daemon

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when RUST_LOG is unset; keeps HTTP client internals quiet
pub const DEFAULT_FILTER: &str = "info,hyper=warn,reqwest=warn";

pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .init();

    // Bridge log crate → tracing (discord-sdk and friends log through `log`)
    tracing_log::LogTracer::init().ok();

    tracing::info!("NPRPC version: {}", env!("CARGO_PKG_VERSION"));
}
