//! Logging system initialization
//!
//! Sets up the tracing subscriber from the `[logging]` section of the
//! static configuration.

use crate::config::StaticConfig;
use tracing_appender::rolling;

/// Initialize logging system based on configuration
///
/// **Note**: This should be called only once during application startup,
/// after the configuration has been loaded.
///
/// # Returns
/// * `WorkerGuard` - Must be kept alive for the duration of the program
///   to ensure non-blocking log writes are flushed
///
/// # Errors
/// * If creating the log appender or opening the log file fails
pub fn init_logging(
    config: &StaticConfig,
) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let writer: Box<dyn std::io::Write + Send + Sync> = match config.logging.file.as_deref() {
        Some(log_file) if !log_file.is_empty() && config.logging.enable_rotation => {
            // 按天滚动
            let path = std::path::Path::new(log_file);
            let dir = path.parent().unwrap_or(std::path::Path::new("."));
            let filename = path
                .file_name()
                .and_then(|f| f.to_str())
                .unwrap_or("affiliateaura.log");
            let appender = rolling::Builder::new()
                .rotation(rolling::Rotation::DAILY)
                .filename_prefix(filename.trim_end_matches(".log"))
                .filename_suffix("log")
                .max_log_files(config.logging.max_backups as usize)
                .build(dir)?;
            Box::new(appender)
        }
        Some(log_file) if !log_file.is_empty() => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)?;
            Box::new(file)
        }
        _ => Box::new(std::io::stdout()),
    };

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(writer);
    let filter = tracing_subscriber::EnvFilter::new(config.logging.level.clone());

    let subscriber_builder = tracing_subscriber::fmt()
        .with_writer(non_blocking_writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(config.logging.file.as_ref().is_none_or(|f| f.is_empty()));

    if config.logging.format == "json" {
        subscriber_builder.json().init();
    } else {
        subscriber_builder.init();
    }

    Ok(guard)
}
