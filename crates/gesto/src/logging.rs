//! Logging setup for the CLI.
//!
//! Logs go to stderr; stdout carries command output (paths, hashes, JSON).
//! `RUST_LOG` wins over both the config file and `--verbose`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gesto_core::Config;

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl LogSettings {
    /// Merge config file values with command-line overrides.
    pub fn resolve(config: &Config, verbose: bool, json_logs: bool) -> Self {
        let level = if verbose {
            "debug".to_string()
        } else {
            config.logging.level.to_lowercase()
        };
        Self {
            level,
            json: json_logs || config.logging.format.eq_ignore_ascii_case("json"),
        }
    }
}

/// Install the global subscriber.
pub fn init(settings: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}
