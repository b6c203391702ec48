//! Fakes shared by the integration tests: a scripted tray backend and a
//! recording overlay window

#![allow(dead_code)]

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use desktop_mascot::error::TrayError;
use desktop_mascot::tray::protocol::NotifyIconSpec;
use desktop_mascot::tray::{
    MenuEntry, PopupMenuHost, TrayBackend, TrayControl, TrayEvent, TrayEventHandler,
};
use desktop_mascot::window::{ColorKey, NativeWindow, Rect, ShowMode, WindowStyle};

pub const WINDOW: u32 = 42;
pub const ICON: u32 = 9;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayCall {
    RegisterClass(String),
    UnregisterClass(String),
    CreateWindow,
    DestroyWindow(u32),
    PostClose(u32),
    LoadIcon,
    DestroyIcon(u32),
    AddNotify { icon: Option<u32>, tooltip: String },
    DeleteNotify(u32),
}

enum Msg {
    Event {
        event: TrayEvent,
        menu_reply: u32,
        done: Sender<()>,
    },
    /// The OS destroyed the window (or it was closed)
    Close { done: Option<Sender<()>> },
}

struct ReplyMenu(u32);

impl PopupMenuHost for ReplyMenu {
    fn track_popup(&self, _entries: &[MenuEntry<'_>]) -> Result<u32, TrayError> {
        Ok(self.0)
    }
}

/// Tray backend whose message loop is fed from the test thread
pub struct FakeTrayBackend {
    calls: Arc<Mutex<Vec<TrayCall>>>,
    tx: Sender<Msg>,
    rx: Receiver<Msg>,
    handler: Mutex<Option<Arc<dyn TrayEventHandler>>>,
    icon_fails: bool,
}

/// Test-side handle to a [`FakeTrayBackend`] after it moved into the service
#[derive(Clone)]
pub struct TrayRemote {
    calls: Arc<Mutex<Vec<TrayCall>>>,
    tx: Sender<Msg>,
}

impl FakeTrayBackend {
    pub fn new(icon_fails: bool) -> (Self, TrayRemote) {
        let (tx, rx) = unbounded();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let backend = Self {
            calls: calls.clone(),
            tx: tx.clone(),
            rx,
            handler: Mutex::new(None),
            icon_fails,
        };
        (backend, TrayRemote { calls, tx })
    }

    fn record(&self, call: TrayCall) {
        self.calls.lock().push(call);
    }

    fn destroyed(&self) -> bool {
        let handler = self.handler.lock().take();
        match handler {
            Some(handler) => {
                handler.on_tray_event(TrayEvent::Destroyed, &ReplyMenu(0)) == TrayControl::StopLoop
            }
            None => true,
        }
    }
}

impl TrayBackend for FakeTrayBackend {
    type Window = u32;
    type Icon = u32;

    fn register_class(&self, class_name: &str) -> Result<(), TrayError> {
        self.record(TrayCall::RegisterClass(class_name.to_string()));
        Ok(())
    }

    fn unregister_class(&self, class_name: &str) -> Result<(), TrayError> {
        self.record(TrayCall::UnregisterClass(class_name.to_string()));
        Ok(())
    }

    fn create_message_window(
        &self,
        _class_name: &str,
        handler: Arc<dyn TrayEventHandler>,
    ) -> Result<u32, TrayError> {
        self.record(TrayCall::CreateWindow);
        *self.handler.lock() = Some(handler);
        Ok(WINDOW)
    }

    fn destroy_window(&self, window: u32) -> Result<(), TrayError> {
        self.record(TrayCall::DestroyWindow(window));
        self.destroyed();
        Ok(())
    }

    fn post_close(&self, window: u32) -> Result<(), TrayError> {
        self.record(TrayCall::PostClose(window));
        let _ = self.tx.send(Msg::Close { done: None });
        Ok(())
    }

    fn load_icon(&self, path: &Path) -> Result<u32, TrayError> {
        self.record(TrayCall::LoadIcon);
        if self.icon_fails {
            return Err(TrayError::LoadIcon {
                path: path.to_path_buf(),
                reason: "file not found".into(),
            });
        }
        Ok(ICON)
    }

    fn destroy_icon(&self, icon: u32) -> Result<(), TrayError> {
        self.record(TrayCall::DestroyIcon(icon));
        Ok(())
    }

    fn add_notify_icon(&self, _window: u32, notify: &NotifyIconSpec<u32>) -> Result<(), TrayError> {
        self.record(TrayCall::AddNotify {
            icon: notify.icon,
            tooltip: String::from_utf16_lossy(&notify.tooltip),
        });
        Ok(())
    }

    fn delete_notify_icon(&self, window: u32) -> Result<(), TrayError> {
        self.record(TrayCall::DeleteNotify(window));
        Ok(())
    }

    fn run_message_loop(&self) -> Result<(), TrayError> {
        while let Ok(msg) = self.rx.recv() {
            match msg {
                Msg::Event {
                    event,
                    menu_reply,
                    done,
                } => {
                    let handler = self.handler.lock().clone();
                    let control = handler
                        .map(|h| h.on_tray_event(event, &ReplyMenu(menu_reply)))
                        .unwrap_or(TrayControl::Continue);
                    let _ = done.send(());
                    if control == TrayControl::StopLoop {
                        break;
                    }
                }
                Msg::Close { done } => {
                    let stop = self.destroyed();
                    if let Some(done) = done {
                        let _ = done.send(());
                    }
                    if stop {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

impl TrayRemote {
    fn deliver(&self, event: TrayEvent, menu_reply: u32) {
        let (done, wait) = crossbeam::channel::bounded(1);
        self.tx
            .send(Msg::Event {
                event,
                menu_reply,
                done,
            })
            .expect("tray loop gone");
        wait.recv_timeout(Duration::from_secs(5))
            .expect("tray event not handled");
    }

    pub fn left_click(&self) {
        self.deliver(TrayEvent::LeftClick, 0);
    }

    /// Right click, then pick `command` from the menu (0 = dismiss)
    pub fn right_click(&self, command: u32) {
        self.deliver(TrayEvent::RightClick, command);
    }

    /// Destroy the message window from outside, as the OS would
    pub fn destroy_window(&self) {
        let _ = self.tx.send(Msg::Close { done: None });
    }

    pub fn calls(&self) -> Vec<TrayCall> {
        self.calls.lock().clone()
    }

    pub fn count(&self, call: &TrayCall) -> usize {
        self.calls.lock().iter().filter(|c| *c == call).count()
    }

    pub fn count_where(&self, pred: impl Fn(&TrayCall) -> bool) -> usize {
        self.calls.lock().iter().filter(|c| pred(c)).count()
    }
}

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

/// Overlay window that records every mutating call
#[derive(Default)]
pub struct RecordingWindow {
    calls: Mutex<Vec<WindowCall>>,
    style: Mutex<WindowStyle>,
    bounds: Mutex<Option<Rect>>,
}

impl RecordingWindow {
    pub fn at(bounds: Rect) -> Self {
        let window = Self::default();
        *window.bounds.lock() = Some(bounds);
        window
    }

    pub fn take_calls(&self) -> Vec<WindowCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    pub fn current_style(&self) -> WindowStyle {
        *self.style.lock()
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
