//! Desktop Mascot Library
//!
//! A click-through desktop overlay with a wandering mascot, controlled from
//! a notification-area icon. The platform-independent core (visibility
//! state, click-through decisions, tray dispatch and service lifecycle) is
//! testable on any OS; the Win32 backend and the binary wiring are
//! Windows-only.

pub mod click_through;
pub mod config;
pub mod error;
pub mod focus;
pub mod frame;
pub mod logging;
pub mod overlay;
pub mod platform;
pub mod sprite;
pub mod tray;
pub mod visibility;
pub mod wander;
pub mod window;

#[cfg(windows)]
pub mod app;
#[cfg(windows)]
pub mod presentation;

#[cfg(test)]
mod testing;
