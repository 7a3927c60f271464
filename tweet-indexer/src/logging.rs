//! Tracing subscriber setup.

use std::env;
use tracing_subscriber::EnvFilter;

/// Output format selector.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose`. `LOG_FORMAT=json` switches to JSON lines.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json = env::var(LOG_FORMAT_ENV).map_or(false, |format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
