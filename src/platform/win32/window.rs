//! Overlay window over a raw HWND

use anyhow::{anyhow, Result};
use windows::Win32::{
    Foundation::*,
    Graphics::Dwm::DwmExtendFrameIntoClientArea,
    Graphics::Gdi::ScreenToClient,
    UI::Controls::MARGINS,
    UI::Input::KeyboardAndMouse::ReleaseCapture,
    UI::WindowsAndMessaging::*,
};

use crate::focus::PointerSource;
use crate::window::{self as overlay_window, ColorKey, NativeWindow, Point, Rect, ShowMode, WindowStyle};

/// System command that starts moving a window by its caption
const SC_DRAGMOVE: usize = 0xF012;

/// Handle to the overlay's top-level window.
///
/// Only calls that are safe from any thread are used for show/hide, since
/// the tray thread toggles visibility.
#[derive(Debug, Clone, Copy)]
pub struct Win32Window {
    hwnd: HWND,
}

impl Win32Window {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

impl NativeWindow for Win32Window {
    fn style(&self) -> Option<WindowStyle> {
        let (base, extended) = unsafe {
            (
                GetWindowLongW(self.hwnd, GWL_STYLE) as u32,
                GetWindowLongW(self.hwnd, GWL_EXSTYLE) as u32,
            )
        };
        // Every live window has at least one base style bit
        if base == 0 {
            tracing::trace!("GetWindowLongW returned no style");
            return None;
        }
        Some(WindowStyle { base, extended })
    }

    fn set_style(&self, style: WindowStyle) {
        unsafe {
            SetWindowLongW(self.hwnd, GWL_STYLE, style.base as i32);
            SetWindowLongW(self.hwnd, GWL_EXSTYLE, style.extended as i32);
        }
    }

    fn bounds(&self) -> Option<Rect> {
        let mut rect = RECT::default();
        match unsafe { GetWindowRect(self.hwnd, &mut rect) } {
            Ok(()) => Some(Rect::new(rect.left, rect.top, rect.right, rect.bottom)),
            Err(e) => {
                tracing::debug!("GetWindowRect failed: {}", e);
                None
            }
        }
    }

    fn set_topmost_at(&self, rect: Rect) {
        let result = unsafe {
            SetWindowPos(
                self.hwnd,
                HWND_TOPMOST,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                SWP_FRAMECHANGED | SWP_SHOWWINDOW,
            )
        };
        if let Err(e) = result {
            tracing::debug!("SetWindowPos failed: {}", e);
        }
    }

    fn set_layered_alpha(&self, alpha: u8, key: Option<ColorKey>) {
        let (flags, key) = match key {
            Some(ColorKey(rgb)) => (LWA_ALPHA | LWA_COLORKEY, COLORREF(rgb)),
            None => (LWA_ALPHA, COLORREF(0)),
        };
        if let Err(e) = unsafe { SetLayeredWindowAttributes(self.hwnd, key, alpha, flags) } {
            tracing::debug!("SetLayeredWindowAttributes failed: {}", e);
        }
    }

    fn show(&self, mode: ShowMode) {
        let cmd = match mode {
            ShowMode::Normal => SW_SHOWNORMAL,
            ShowMode::Hidden => SW_HIDE,
        };
        unsafe {
            ShowWindowAsync(self.hwnd, cmd);
        }
    }

    fn bring_to_front(&self) {
        if let Err(e) = unsafe { BringWindowToTop(self.hwnd) } {
            tracing::debug!("BringWindowToTop failed: {}", e);
        }
    }

    fn set_foreground(&self) {
        // Windows may refuse when another process owns the foreground
        if !unsafe { SetForegroundWindow(self.hwnd) }.as_bool() {
            tracing::debug!("SetForegroundWindow refused");
        }
    }

    fn release_capture(&self) {
        if let Err(e) = unsafe { ReleaseCapture() } {
            tracing::trace!("ReleaseCapture failed: {}", e);
        }
    }

    fn begin_move_drag(&self) {
        unsafe {
            SendMessageW(self.hwnd, WM_SYSCOMMAND, WPARAM(SC_DRAGMOVE), LPARAM(0));
        }
    }
}

/// Make a freshly created window a borderless topmost overlay of `rect`
/// with a transparent frame, ready for per-pixel transparency
pub fn prepare_overlay(window: &Win32Window, rect: Rect) -> Result<()> {
    let hwnd = window.hwnd();
    unsafe {
        SetWindowLongW(
            hwnd,
            GWL_STYLE,
            (overlay_window::WS_POPUP | overlay_window::WS_VISIBLE) as i32,
        );
    }
    window.set_topmost_at(rect);

    let margins = MARGINS {
        cxLeftWidth: -1,
        cxRightWidth: -1,
        cyTopHeight: -1,
        cyBottomHeight: -1,
    };
    unsafe { DwmExtendFrameIntoClientArea(hwnd, &margins) }
        .map_err(|e| anyhow!("Failed to extend frame into client area: {}", e))?;

    Ok(())
}

/// Cursor position relative to a window's client area
#[derive(Debug, Clone, Copy)]
pub struct Win32Cursor {
    hwnd: HWND,
}

impl Win32Cursor {
    pub fn new(hwnd: HWND) -> Self {
        Self { hwnd }
    }
}

impl PointerSource for Win32Cursor {
    fn pointer_position(&self) -> Option<Point> {
        let mut point = POINT::default();
        unsafe {
            GetCursorPos(&mut point).ok()?;
            if !ScreenToClient(self.hwnd, &mut point).as_bool() {
                return None;
            }
        }
        Some(Point::new(point.x, point.y))
    }
}
