//! Desktop Mascot - overlay process
//!
//! This process manages:
//! - The transparent, always-on-top overlay with the wandering mascot
//! - The notification-area icon (left click: show/hide, right click: menu)

#![windows_subsystem = "windows"]

use anyhow::Result;
use desktop_mascot::{config, logging};

fn main() -> Result<()> {
    // Failures here are held until the subscriber exists
    let (config, config_error) = config::load_config();
    let log_dir = config::get_data_directory();

    let _log_guard = logging::init(config.debug_logging, log_dir.as_deref().ok());

    tracing::info!("Desktop Mascot {} starting...", env!("CARGO_PKG_VERSION"));
    if let Err(e) = &log_dir {
        tracing::warn!("Logging to stderr: {:#}", e);
    }
    if let Some(e) = config_error {
        tracing::warn!("Using default configuration: {:#}", e);
    }

    if let Err(e) = config::ensure_config_file() {
        tracing::warn!("Could not write default configuration: {:#}", e);
    }

    run(config)
}

#[cfg(windows)]
fn run(config: config::AppConfig) -> Result<()> {
    desktop_mascot::app::run(config).map_err(|e| {
        tracing::error!("Overlay failed: {:#}", e);
        e
    })
}

#[cfg(not(windows))]
fn run(_config: config::AppConfig) -> Result<()> {
    let err = desktop_mascot::error::TrayError::Unsupported;
    tracing::error!("{}", err);
    Err(err.into())
}
