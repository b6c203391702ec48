//! Error types shared by the overlay, tray and sprite modules

use std::path::PathBuf;
use thiserror::Error;

use crate::tray::TrayState;

/// Failures of the tray icon feature.
///
/// None of these are fatal to the process: the overlay keeps running
/// without a tray icon when startup fails.
#[derive(Debug, Error)]
pub enum TrayError {
    #[error("tray service cannot start while {0:?}")]
    AlreadyStarted(TrayState),

    #[error("failed to register tray window class `{class}`: {reason}")]
    RegisterClass { class: String, reason: String },

    #[error("failed to create tray message window: {0}")]
    CreateWindow(String),

    #[error("failed to load tray icon from {path}: {reason}")]
    LoadIcon { path: PathBuf, reason: String },

    #[error("failed to register notification-area icon: {0}")]
    AddIcon(String),

    #[error("native call `{operation}` failed: {reason}")]
    Native {
        operation: &'static str,
        reason: String,
    },

    #[error("failed to spawn tray message thread")]
    Spawn(#[source] std::io::Error),

    #[error("tray message thread exited before reporting startup")]
    ThreadLost,

    #[error("system tray is not supported on this platform")]
    Unsupported,
}

/// Misuse of the overlay context
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OverlayError {
    #[error("an overlay window is already attached")]
    AlreadyAttached,
}

/// Mascot sprite loading failures
#[derive(Debug, Error)]
pub enum SpriteError {
    #[error("failed to decode sprite image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("sprite buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    Dimensions {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
