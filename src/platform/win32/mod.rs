//! Win32 backend

mod tray;
mod window;

pub use tray::{Win32MenuHost, Win32TrayBackend};
pub use window::{prepare_overlay, Win32Cursor, Win32Window};

use windows::Win32::UI::Shell::{NIF_ICON, NIF_MESSAGE, NIF_TIP};
use windows::Win32::UI::WindowsAndMessaging as wm;

use crate::error::TrayError;
use crate::tray::protocol;
use crate::window as overlay_window;

// The portable constants must match the headers they mirror
const _: () = {
    assert!(protocol::WM_USER == wm::WM_USER);
    assert!(protocol::WM_DESTROY == wm::WM_DESTROY);
    assert!(protocol::WM_LBUTTONUP == wm::WM_LBUTTONUP);
    assert!(protocol::WM_RBUTTONUP == wm::WM_RBUTTONUP);
    assert!(protocol::NIF_MESSAGE == NIF_MESSAGE.0);
    assert!(protocol::NIF_ICON == NIF_ICON.0);
    assert!(protocol::NIF_TIP == NIF_TIP.0);
    assert!(overlay_window::WS_POPUP == wm::WS_POPUP.0);
    assert!(overlay_window::WS_VISIBLE == wm::WS_VISIBLE.0);
    assert!(overlay_window::WS_EX_LAYERED == wm::WS_EX_LAYERED.0);
    assert!(overlay_window::WS_EX_TRANSPARENT == wm::WS_EX_TRANSPARENT.0);
    assert!(overlay_window::WS_EX_TOPMOST == wm::WS_EX_TOPMOST.0);
};

/// Null-terminated UTF-16 copy of `s`
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(Some(0)).collect()
}

fn native_error(operation: &'static str, error: windows::core::Error) -> TrayError {
    TrayError::Native {
        operation,
        reason: error.message().to_string(),
    }
}

/// Size of the primary display in pixels
pub fn primary_screen_size() -> (u32, u32) {
    let (width, height) = unsafe {
        (
            wm::GetSystemMetrics(wm::SM_CXSCREEN),
            wm::GetSystemMetrics(wm::SM_CYSCREEN),
        )
    };
    (width.max(1) as u32, height.max(1) as u32)
}
