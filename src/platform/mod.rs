//! Native backends for the overlay window, cursor and tray icon

#[cfg(windows)]
pub mod win32;
