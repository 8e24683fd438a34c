use crate::config::AppConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize tracing: a rolling file appender plus, in text mode, a
/// plain stdout layer. Returns the worker guard — keep it alive for the
/// life of the process or buffered log lines get dropped on exit.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let log = &config.logging;
    let file_appender = match log.rotation.as_str() {
        "hourly" => tracing_appender::rolling::hourly(&log.log_dir, &log.log_file),
        "daily" => tracing_appender::rolling::daily(&log.log_dir, &log.log_file),
        _ => tracing_appender::rolling::never(&log.log_dir, &log.log_file),
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if log.use_json {
        let file_layer = fmt::layer()
            .json()
            .with_target(true)
            .with_writer(non_blocking)
            .with_ansi(false);
        registry.with(file_layer).init();
    } else {
        let file_layer = fmt::layer()
            .with_target(false)
            .with_writer(non_blocking)
            .with_ansi(false);
        let stdout_layer = fmt::layer().with_target(false).with_ansi(true);
        registry.with(file_layer).with(stdout_layer).init();
    }

    guard
}
