//! Logging configuration using tracing

use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable controlling the log filter.
pub const LOG_ENV_VAR: &str = "APPFRAME_LOG";

const DEFAULT_FILTER: &str = "appframe=info,warn";

/// Initialize the logging subsystem for an application
///
/// Logs are written to `<data-local-dir>/<app_name>/logs/<app_name>.log.<date>`,
/// one file per UTC day. Log level is controlled by the `APPFRAME_LOG` environment
/// variable.
///
/// # Examples
/// ```bash
/// APPFRAME_LOG=debug cargo run
/// APPFRAME_LOG=appframe_app=trace cargo run
/// ```
pub fn init(app_name: &str) -> Result<()> {
    let log_dir = get_log_directory(app_name)?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender =
        RollingFileAppender::new(Rotation::DAILY, &log_dir, format!("{}.log", app_name));

    let env_filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .try_init()
        .map_err(|e| crate::Error::config(format!("logging already initialized: {}", e)))?;

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("{} starting", app_name);
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path for an application
pub fn get_log_directory(app_name: &str) -> Result<PathBuf> {
    if app_name.is_empty() {
        return Err(crate::Error::invalid_argument(
            "log directory requires a non-empty application name",
        ));
    }
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join(app_name).join("logs"))
}

/// Get the log file path for the current day
///
/// The daily appender dates its files in UTC.
pub fn get_current_log_file(app_name: &str) -> Result<PathBuf> {
    get_log_file_for_date(app_name, Utc::now().date_naive())
}

/// Get the log file path the daily appender uses on `date`
pub fn get_log_file_for_date(app_name: &str, date: NaiveDate) -> Result<PathBuf> {
    let dir = get_log_directory(app_name)?;
    Ok(dir.join(format!("{}.log.{}", app_name, date.format("%Y-%m-%d"))))
}
