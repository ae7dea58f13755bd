//! Structured logging configuration
//!
//! Provides:
//! - JSON output for machine consumption
//! - Pretty formatting for interactive use
//! - Console, rolling file, or both
//! - A per-run span so every line from one refresh can be correlated

use crate::config::LoggingConfig;
use std::path::Path;
use tracing::Span;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use uuid::Uuid;

const LOG_FILE_NAME: &str = "claude-burn-bar.log";

/// Initialize the logging system based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held for the
/// lifetime of the process when file output is enabled.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    // RUST_LOG wins over the configured level
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.output.as_str() {
        "file" => Some(init_file_logging(env_filter, &config.format, &config.directory)),
        "both" => Some(init_combined_logging(
            env_filter,
            &config.format,
            &config.directory,
        )),
        _ => {
            init_console_logging(env_filter, &config.format);
            None
        }
    }
}

fn init_console_logging(filter: EnvFilter, format: &str) {
    let subscriber = tracing_subscriber::registry().with(filter);

    // try_init: a subscriber may already be installed (tests, embedding hosts)
    let _ = match format {
        "json" => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init(),
        _ => subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .pretty(),
            )
            .try_init(),
    };
}

fn init_file_logging(filter: EnvFilter, format: &str, log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(filter);

    let _ = match format {
        "json" => subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_current_span(true)
                    .with_span_list(true),
            )
            .try_init(),
        _ => subscriber
            .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
            .try_init(),
    };

    guard
}

fn init_combined_logging(filter: EnvFilter, format: &str, log_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry().with(filter);

    let _ = match format {
        "json" => subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(fmt::layer().json().with_writer(non_blocking))
            .try_init(),
        _ => subscriber
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
            .try_init(),
    };

    guard
}

/// Span wrapping one aggregation run, tagged with a fresh run id.
pub fn run_span() -> Span {
    tracing::info_span!("aggregation_run", run_id = %Uuid::new_v4())
}
