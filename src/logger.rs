// 📝 Logging - tracing to a daily-rolling file
//
// Stdout belongs to the terminal dashboard, so events go to a file only.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

pub const LOG_FILE_PREFIX: &str = "caramelo.log";

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init(config: &LogConfig) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.dir)?;

    let file_appender = tracing_appender::rolling::daily(&config.dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.default_filter))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {}", e))?;

    tracing::info!(dir = %config.dir.display(), "logging initialized");
    Ok(guard)
}
