//! Structured logging for the particle background host.
//!
//! Console output with uptime, target and level, plus JSON file logging in
//! debug builds. Records emitted through the `log` facade by the library
//! crates are captured by the same subscriber.

use std::fs::File;
use std::path::Path;

use cosmos_config::Config;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config names a level.
pub const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "cosmos.log";

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.debug.log_level`, which wins over
/// [`DEFAULT_FILTER`]. When `debug_build` is set and `log_dir` is writable a
/// JSON layer is added that writes to [`LOG_FILE_NAME`].
pub fn init_logging(log_dir: Option<&Path>, debug_build: bool, config: Option<&Config>) {
    let filter_str = filter_for(config);
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    match log_file(log_dir, debug_build) {
        Some(log_file) => {
            let file_layer = fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true)
                .with_timer(fmt::time::uptime())
                .json();
            subscriber.with(file_layer).init();
        }
        None => subscriber.init(),
    }
}

/// Filter string taken from the config, or [`DEFAULT_FILTER`].
fn filter_for(config: Option<&Config>) -> &str {
    match config {
        Some(config) if !config.debug.log_level.is_empty() => config.debug.log_level.as_str(),
        _ => DEFAULT_FILTER,
    }
}

fn log_file(log_dir: Option<&Path>, debug_build: bool) -> Option<File> {
    if !debug_build {
        return None;
    }
    let log_dir = log_dir?;
    std::fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE_NAME)).ok()
}

/// An `EnvFilter` with the default filter string.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(DEFAULT_FILTER)
}
