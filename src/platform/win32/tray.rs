//! Message-only window and notification icon
//!
//! The event handler lives in GWLP_USERDATA as a leaked
//! `Box<Arc<dyn TrayEventHandler>>`, attached right after the window is
//! created and reclaimed on WM_NCDESTROY.

use std::mem;
use std::path::Path;
use std::sync::Arc;
use windows::core::PCWSTR;
use windows::Win32::{
    Foundation::*,
    System::LibraryLoader::GetModuleHandleW,
    UI::Shell::*,
    UI::WindowsAndMessaging::*,
};

use super::{native_error, wide};
use crate::error::TrayError;
use crate::tray::protocol::{self, NotifyIconSpec, TRAY_ICON_ID};
use crate::tray::{MenuEntry, PopupMenuHost, TrayBackend, TrayControl, TrayEventHandler};

type HandlerBox = Box<Arc<dyn TrayEventHandler>>;

/// Win32 implementation of the tray service backend
#[derive(Debug, Default)]
pub struct Win32TrayBackend;

impl Win32TrayBackend {
    pub fn new() -> Self {
        Self
    }
}

fn module_instance() -> Result<HINSTANCE, TrayError> {
    let module = unsafe { GetModuleHandleW(None) }.map_err(|e| TrayError::Native {
        operation: "GetModuleHandleW",
        reason: e.message().to_string(),
    })?;
    Ok(module.into())
}

fn notify_data(window: HWND) -> NOTIFYICONDATAW {
    NOTIFYICONDATAW {
        cbSize: mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: window,
        uID: TRAY_ICON_ID,
        ..Default::default()
    }
}

impl TrayBackend for Win32TrayBackend {
    type Window = HWND;
    type Icon = HICON;

    fn register_class(&self, class_name: &str) -> Result<(), TrayError> {
        let hinstance = module_instance()?;
        let class = wide(class_name);

        let wc = WNDCLASSEXW {
            cbSize: mem::size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(tray_wndproc),
            hInstance: hinstance,
            lpszClassName: PCWSTR(class.as_ptr()),
            ..Default::default()
        };

        if unsafe { RegisterClassExW(&wc) } == 0 {
            return Err(TrayError::RegisterClass {
                class: class_name.to_string(),
                reason: windows::core::Error::from_win32().message().to_string(),
            });
        }
        Ok(())
    }

    fn unregister_class(&self, class_name: &str) -> Result<(), TrayError> {
        let hinstance = module_instance()?;
        let class = wide(class_name);
        unsafe { UnregisterClassW(PCWSTR(class.as_ptr()), hinstance) }
            .map_err(|e| native_error("UnregisterClassW", e))
    }

    fn create_message_window(
        &self,
        class_name: &str,
        handler: Arc<dyn TrayEventHandler>,
    ) -> Result<HWND, TrayError> {
        let hinstance = module_instance()?;
        let class = wide(class_name);

        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                PCWSTR(class.as_ptr()),
                PCWSTR(class.as_ptr()),
                WINDOW_STYLE::default(),
                0,
                0,
                0,
                0,
                HWND_MESSAGE,
                HMENU::default(),
                hinstance,
                None,
            )
        };

        if hwnd == HWND::default() {
            return Err(TrayError::CreateWindow(
                windows::core::Error::from_win32().message().to_string(),
            ));
        }

        let handler: HandlerBox = Box::new(handler);
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(handler) as isize);
        }
        tracing::debug!(?hwnd, "Tray message window created");
        Ok(hwnd)
    }

    fn destroy_window(&self, window: HWND) -> Result<(), TrayError> {
        unsafe { DestroyWindow(window) }.map_err(|e| native_error("DestroyWindow", e))
    }

    fn post_close(&self, window: HWND) -> Result<(), TrayError> {
        unsafe { PostMessageW(window, WM_CLOSE, WPARAM(0), LPARAM(0)) }
            .map_err(|e| native_error("PostMessageW", e))
    }

    fn load_icon(&self, path: &Path) -> Result<HICON, TrayError> {
        let file = wide(&path.to_string_lossy());
        let handle = unsafe {
            LoadImageW(
                None,
                PCWSTR(file.as_ptr()),
                IMAGE_ICON,
                0,
                0,
                LR_LOADFROMFILE | LR_DEFAULTSIZE,
            )
        }
        .map_err(|e| TrayError::LoadIcon {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;

        Ok(HICON(handle.0))
    }

    fn destroy_icon(&self, icon: HICON) -> Result<(), TrayError> {
        unsafe { DestroyIcon(icon) }.map_err(|e| native_error("DestroyIcon", e))
    }

    fn add_notify_icon(&self, window: HWND, notify: &NotifyIconSpec<HICON>) -> Result<(), TrayError> {
        let mut nid = notify_data(window);
        nid.uID = notify.id;
        nid.uFlags = NOTIFY_ICON_DATA_FLAGS(notify.flags());
        nid.uCallbackMessage = notify.callback_message;
        nid.hIcon = notify.icon.unwrap_or_default();
        for (dst, src) in nid.szTip.iter_mut().zip(notify.tooltip.iter()) {
            *dst = *src;
        }

        if !unsafe { Shell_NotifyIconW(NIM_ADD, &nid) }.as_bool() {
            return Err(TrayError::AddIcon(
                windows::core::Error::from_win32().message().to_string(),
            ));
        }
        Ok(())
    }

    fn delete_notify_icon(&self, window: HWND) -> Result<(), TrayError> {
        let nid = notify_data(window);
        if !unsafe { Shell_NotifyIconW(NIM_DELETE, &nid) }.as_bool() {
            return Err(native_error("Shell_NotifyIconW", windows::core::Error::from_win32()));
        }
        Ok(())
    }

    fn run_message_loop(&self) -> Result<(), TrayError> {
        let mut msg = MSG::default();
        loop {
            let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
            match ret.0 {
                -1 => return Err(native_error("GetMessageW", windows::core::Error::from_win32())),
                0 => return Ok(()),
                _ => unsafe {
                    TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                },
            }
        }
    }
}

/// Popup menu shown for the message window at the cursor position
pub struct Win32MenuHost {
    owner: HWND,
}

/// Destroys the popup menu on every exit path
struct MenuGuard(HMENU);

impl Drop for MenuGuard {
    fn drop(&mut self) {
        if let Err(e) = unsafe { DestroyMenu(self.0) } {
            tracing::debug!("DestroyMenu failed: {}", e);
        }
    }
}

impl PopupMenuHost for Win32MenuHost {
    fn track_popup(&self, entries: &[MenuEntry<'_>]) -> Result<u32, TrayError> {
        let menu = unsafe { CreatePopupMenu() }.map_err(|e| native_error("CreatePopupMenu", e))?;
        let guard = MenuGuard(menu);

        for entry in entries {
            let label = wide(entry.label);
            unsafe { AppendMenuW(guard.0, MF_STRING, entry.id as usize, PCWSTR(label.as_ptr())) }
                .map_err(|e| native_error("AppendMenuW", e))?;
        }

        let mut cursor = POINT::default();
        unsafe { GetCursorPos(&mut cursor) }.map_err(|e| native_error("GetCursorPos", e))?;

        // Without this the menu does not close when clicking elsewhere
        let _ = unsafe { SetForegroundWindow(self.owner) };

        let command = unsafe {
            TrackPopupMenu(
                guard.0,
                TPM_RETURNCMD | TPM_NONOTIFY | TPM_RIGHTBUTTON,
                cursor.x,
                cursor.y,
                0,
                self.owner,
                None,
            )
        };

        let _ = unsafe { PostMessageW(self.owner, WM_NULL, WPARAM(0), LPARAM(0)) };

        Ok(command.0.max(0) as u32)
    }
}

/// Strong reference to the handler stored on the window, so a nested
/// destroy cannot free it while an event is being handled
unsafe fn handler_for(hwnd: HWND) -> Option<Arc<dyn TrayEventHandler>> {
    let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const Arc<dyn TrayEventHandler>;
    if ptr.is_null() {
        None
    } else {
        Some(Arc::clone(&*ptr))
    }
}

unsafe extern "system" fn tray_wndproc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCDESTROY {
        let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA);
        if ptr != 0 {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            drop(Box::from_raw(ptr as *mut Arc<dyn TrayEventHandler>));
        }
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let Some(event) = protocol::decode(msg, lparam.0) else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };

    let control = match handler_for(hwnd) {
        Some(handler) => handler.on_tray_event(event, &Win32MenuHost { owner: hwnd }),
        None => TrayControl::Continue,
    };

    if control == TrayControl::StopLoop {
        PostQuitMessage(0);
    }

    if msg == protocol::WM_TRAY {
        LRESULT(0)
    } else {
        DefWindowProcW(hwnd, msg, wparam, lparam)
    }
}
