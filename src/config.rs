//! Configuration module for the desktop mascot.
//!
//! Settings are read once at startup from `config.json` in the
//! platform-specific application data directory
//! (%APPDATA%/DesktopMascot/ on Windows). Missing or partial files fall
//! back to defaults field by field.
//!
//! # Example
//!
//! ```rust
//! use desktop_mascot::config::AppConfig;
//!
//! let config = AppConfig::default();
//! assert_eq!(config.overlay_size((1920, 1080)), (1280, 720));
//! ```
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::wander::WanderConfig;

const CONFIG_FILE: &str = "config.json";

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Resolution {
            width: 1280,
            height: 720,
        }
    }
}

/// Application configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Cover the whole screen instead of a window
    pub fullscreen: bool,
    /// Use `resolution` even in fullscreen
    pub custom_resolution: bool,
    pub resolution: Resolution,
    pub target_frame_rate: u32,
    /// Layers whose scene objects capture clicks (bit n = layer n)
    pub click_layer_mask: u32,
    pub icon_path: PathBuf,
    pub sprite_path: PathBuf,
    pub tooltip: String,
    pub exit_label: String,
    pub debug_logging: bool,
    pub wander: WanderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            fullscreen: true,
            custom_resolution: true,
            resolution: Resolution::default(),
            target_frame_rate: crate::frame::DEFAULT_FRAME_RATE,
            click_layer_mask: u32::MAX,
            icon_path: PathBuf::from("myicon.ico"),
            sprite_path: PathBuf::from("mascot.png"),
            tooltip: "Desktop Mascot".to_string(),
            exit_label: "Exit".to_string(),
            debug_logging: false,
            wander: WanderConfig::default(),
        }
    }
}

impl AppConfig {
    /// Overlay size for a screen of `screen` (width, height) pixels
    pub fn overlay_size(&self, screen: (u32, u32)) -> (u32, u32) {
        if self.fullscreen && !self.custom_resolution {
            screen
        } else {
            (self.resolution.width, self.resolution.height)
        }
    }
}

/// Get the application's data directory
/// Returns %APPDATA%/DesktopMascot/ on Windows
/// Creates directory if it doesn't exist
pub fn get_data_directory() -> Result<PathBuf> {
    let project_dirs = ProjectDirs::from("", "", "DesktopMascot")
        .ok_or_else(|| anyhow!("Failed to determine user data directory"))?;

    let data_dir = project_dirs.data_dir();

    fs::create_dir_all(data_dir)
        .map_err(|e| anyhow!("Failed to create data directory: {}", e))?;

    Ok(data_dir.to_path_buf())
}

pub fn config_path() -> Result<PathBuf> {
    Ok(get_data_directory()?.join(CONFIG_FILE))
}

/// Load application configuration from config.json.
///
/// Falls back to the defaults when the file cannot be used, and hands the
/// failure back so it can be logged once logging is running.
pub fn load_config() -> (AppConfig, Option<anyhow::Error>) {
    load_config_or_default(config_path())
}

/// Load from `path` if it could be determined, defaults otherwise
pub fn load_config_or_default(path: Result<PathBuf>) -> (AppConfig, Option<anyhow::Error>) {
    match path.and_then(|path| load_config_from(&path)) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    }
}

/// Load configuration from an explicit file.
/// A missing file yields the defaults; a broken one is an error.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}

/// Write the defaults on first run so users have a file to edit
pub fn ensure_config_file() -> Result<PathBuf> {
    let path = config_path()?;
    if !path.exists() {
        save_config_to(&AppConfig::default(), &path)?;
        tracing::info!(path = %path.display(), "Wrote default configuration");
    }
    Ok(path)
}

/// Find an asset file.
///
/// Absolute paths are used as-is when they exist. Relative paths are
/// looked up next to the executable, then in the data directory, then in
/// the working directory.
pub fn resolve_asset(path: &Path) -> Option<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let data_dir = get_data_directory().ok();

    resolve_asset_in(path, [exe_dir, data_dir, std::env::current_dir().ok()])
}

fn resolve_asset_in<I>(path: &Path, roots: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = Option<PathBuf>>,
{
    if path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }

    roots
        .into_iter()
        .flatten()
        .map(|root| root.join(path))
        .find(|candidate| candidate.exists())
}
