//! Tracing subscriber setup
//!
//! The release binary runs without a console, so records go to
//! `desktop_mascot.log` in the data directory through a background writer.
//! Each run appends, so the log of a crashed run survives the next start.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "desktop_mascot.log";

/// Initialise logging. The default level is `info`; `debug` when enabled in
/// the settings file, in which case `RUST_LOG` may override it.
///
/// Records go to [`LOG_FILE_NAME`] inside `log_dir` when one is given and
/// can be opened, stderr otherwise. The returned guard flushes the file
/// writer when dropped and must be held until the process exits. Calling
/// this more than once is harmless.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(debug));

    let appender = log_dir.and_then(|dir| match file_appender(dir) {
        Ok(appender) => Some(appender),
        Err(e) => {
            eprintln!("Failed to open log file in {}: {}", dir.display(), e);
            None
        }
    });

    match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = builder.with_ansi(false).with_writer(writer).try_init();
            Some(guard)
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
            None
        }
    }
}

fn file_appender(
    dir: &Path,
) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("desktop_mascot")
        .filename_suffix("log")
        .build(dir)
}

fn filter(debug: bool) -> EnvFilter {
    // Without debug logging we force `info` so a stray RUST_LOG in the
    // user's environment cannot flood the log
    let level = if debug { "debug" } else { "info" };

    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    } else {
        EnvFilter::new(level)
    }
}
