//! Fakes used by the unit tests

use parking_lot::Mutex;

use crate::window::{ColorKey, NativeWindow, Rect, ShowMode, WindowStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowCall {
    SetStyle(WindowStyle),
    SetTopmostAt(Rect),
    SetLayeredAlpha(u8, Option<ColorKey>),
    Show(ShowMode),
    BringToFront,
    SetForeground,
    ReleaseCapture,
    BeginMoveDrag,
}

/// Window that remembers every mutating call
#[derive(Default)]
pub struct RecordingWindow {
    pub calls: Mutex<Vec<WindowCall>>,
    pub style: Mutex<WindowStyle>,
    pub bounds: Mutex<Option<Rect>>,
}

impl RecordingWindow {
    pub fn take_calls(&self) -> Vec<WindowCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    fn record(&self, call: WindowCall) {
        self.calls.lock().push(call);
    }
}

impl NativeWindow for RecordingWindow {
    fn style(&self) -> Option<WindowStyle> {
        Some(*self.style.lock())
    }

    fn set_style(&self, style: WindowStyle) {
        *self.style.lock() = style;
        self.record(WindowCall::SetStyle(style));
    }

    fn bounds(&self) -> Option<Rect> {
        *self.bounds.lock()
    }

    fn set_topmost_at(&self, rect: Rect) {
        self.record(WindowCall::SetTopmostAt(rect));
    }

    fn set_layered_alpha(&self, alpha: u8, key: Option<ColorKey>) {
        self.record(WindowCall::SetLayeredAlpha(alpha, key));
    }

    fn show(&self, mode: ShowMode) {
        self.record(WindowCall::Show(mode));
    }

    fn bring_to_front(&self) {
        self.record(WindowCall::BringToFront);
    }

    fn set_foreground(&self) {
        self.record(WindowCall::SetForeground);
    }

    fn release_capture(&self) {
        self.record(WindowCall::ReleaseCapture);
    }

    fn begin_move_drag(&self) {
        self.record(WindowCall::BeginMoveDrag);
    }
}
