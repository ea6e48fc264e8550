use std::fs;

use probe_http::logger::RequestLogger;
use tracing::info;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::ListenerConfig;
use crate::errors::ListenerError;

const DEFAULT_FILTER: &str = "info";

/// Installs the stdout diagnostics subscriber, filtered by `RUST_LOG`.
pub fn init_diagnostics() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    if let Err(e) = tracing_subscriber::fmt().with_env_filter(env_filter).with_target(false).try_init() {
        eprintln!("diagnostics subscriber already installed: {e}");
    }
}

/// Opens the daily rotated request log under `config.log_dir`.
///
/// Entries are handed to a background writer thread and never dropped when it
/// falls behind. The returned guard flushes pending entries when dropped, so
/// it has to outlive the server.
///
/// # Errors
///
/// Returns an error when the directory or the first log file can't be created.
pub fn open_request_log(config: &ListenerConfig) -> Result<(RequestLogger, WorkerGuard), ListenerError> {
    fs::create_dir_all(&config.log_dir)
        .map_err(|source| ListenerError::CreateLogDir { path: config.log_dir.clone(), source })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.log_file_name)
        .build(&config.log_dir)?;

    let (writer, guard) = NonBlockingBuilder::default().lossy(false).finish(appender);
    info!(dir = %config.log_dir.display(), prefix = %config.log_file_name, "request log opened");

    Ok((RequestLogger::new(writer), guard))
}
