//! Logging initialization for the `sextant` binary
//!
//! Logs go to stderr so they never mix with documents written to stdout.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding a filter directive, checked before `RUST_LOG`
pub const LOG_ENV: &str = "SEXTANT_LOG";

/// Level used when no environment filter is set
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity)))
}

pub fn init_logging(verbosity: u8, json: bool) {
    let subscriber = tracing_subscriber::registry().with(build_env_filter(verbosity));

    if json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    tracing::debug!(verbosity, json, "logging initialized");
}
