// src/logging.rs

use std::env;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Call once, from the binary entry point.
///
/// `RUST_LOG` wins; otherwise `LOG_LEVEL` (or `fallback`) is used as the
/// default directive.
pub fn init(fallback: &str) {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| fallback.to_string());
        EnvFilter::new(level)
    });
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,crashscraper=debug")),
        )
        .with_test_writer()
        .try_init();
}
