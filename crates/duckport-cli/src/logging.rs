//! Logging setup for the duckport binary
//!
//! Console output goes to stderr so table output on stdout stays clean.
//! JSON logs to a daily rotated file are optional. `RUST_LOG` takes
//! precedence over the configured filter.

use crate::settings::LoggingSettings;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Directory where JSON log files are written
    pub log_dir: PathBuf,

    pub enable_json_logs: bool,

    /// Whether to include file/line information in console logs
    pub include_location: bool,

    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl LoggingConfig {
    /// Build from the settings file, with `filter_override` (from the
    /// command line) replacing the configured filter
    pub fn from_settings(settings: &LoggingSettings, filter_override: Option<&str>) -> Self {
        Self {
            log_dir: settings.log_dir(),
            enable_json_logs: settings.json_logs,
            include_location: cfg!(debug_assertions),
            default_filter: filter_override
                .map(str::to_string)
                .unwrap_or_else(|| settings.filter.clone()),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_filter))
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the JSON file writer on drop and must be held
/// until the program exits.
pub fn init(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let mut layers = Vec::new();

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .with_filter(config.env_filter())
        .boxed();
    layers.push(console_layer);

    let mut guard = None;
    if config.enable_json_logs {
        std::fs::create_dir_all(&config.log_dir)?;

        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "duckport.log");
        let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(worker_guard);

        let json_layer = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
            .json()
            .with_writer(non_blocking)
            .with_filter(config.env_filter())
            .boxed();
        layers.push(json_layer);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    tracing::debug!(
        json_logs = config.enable_json_logs,
        log_dir = %config.log_dir.display(),
        "logging initialized"
    );
    Ok(guard)
}
