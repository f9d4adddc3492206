use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::types::LogLevel;

const CRATES: [&str; 4] = [
    "insightdesk",
    "insightdesk_sdk",
    "insightdesk_runtime",
    "insightdesk_engine",
];

/// `RUST_LOG` wins; otherwise `--log-level` applies to our crates and
/// everything else stays at `warn`.
fn build_env_filter(level: LogLevel) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let directive = std::iter::once("warn".to_string())
        .chain(CRATES.iter().map(|name| format!("{}={}", name, level)))
        .collect::<Vec<_>>()
        .join(",");
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

/// Logs go to stderr so stdout stays clean for tables, JSON and CSV.
pub fn init(level: LogLevel) {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact();

    // A second init (tests calling `run` twice) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(build_env_filter(level))
        .with(fmt_layer)
        .try_init();
}
