//! System tray icon service
//!
//! Architecture:
//! - A dedicated thread owns the native message-only window, the
//!   notification icon and the blocking message loop
//! - Clicks are decoded by the platform backend and routed through
//!   [`TrayEventHandler`] (left: toggle overlay, right: context menu)
//! - Two teardown paths exist: the message thread after its loop ends, and
//!   [`TrayIconService::shutdown`] on the main thread. Both take each
//!   resource out of the shared record before releasing it, so whichever
//!   runs second finds nothing left to do.

pub mod dispatch;
pub mod menu;
pub mod protocol;

pub use dispatch::{TrayControl, TrayDispatcher, TrayEventHandler};
pub use menu::{ContextMenuPresenter, MenuEntry, MenuOutcome, PopupMenuHost};
pub use protocol::{NotifyIconSpec, TrayEvent};

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::TrayError;

pub const TRAY_THREAD_NAME: &str = "tray-message-pump";

/// How long `shutdown` waits for the message thread before leaving it to
/// exit with the process
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

#[derive(Debug, Clone, Default)]
pub struct TraySettings {
    /// Icon file for the notification area. Missing or broken icons are
    /// not fatal: the entry is registered without an image.
    pub icon_path: Option<PathBuf>,
    pub tooltip: String,
}

/// Native operations behind the tray service.
///
/// `register_class`, `create_message_window`, `destroy_window` and
/// `run_message_loop` are only called on the tray thread. `post_close`,
/// `delete_notify_icon` and `destroy_icon` may also be called from the main
/// thread during shutdown.
pub trait TrayBackend: Send + Sync + 'static {
    type Window: Copy + Send + fmt::Debug + 'static;
    type Icon: Copy + Send + fmt::Debug + 'static;

    fn register_class(&self, class_name: &str) -> Result<(), TrayError>;
    fn unregister_class(&self, class_name: &str) -> Result<(), TrayError>;

    /// Create the message-only window. The backend keeps `handler` alive for
    /// as long as the window exists and feeds it every decoded tray event.
    /// When the handler answers [`TrayControl::StopLoop`] the backend posts
    /// the quit message to its own thread.
    fn create_message_window(
        &self,
        class_name: &str,
        handler: Arc<dyn TrayEventHandler>,
    ) -> Result<Self::Window, TrayError>;
    fn destroy_window(&self, window: Self::Window) -> Result<(), TrayError>;
    /// Ask the window's own thread to destroy it
    fn post_close(&self, window: Self::Window) -> Result<(), TrayError>;

    fn load_icon(&self, path: &Path) -> Result<Self::Icon, TrayError>;
    fn destroy_icon(&self, icon: Self::Icon) -> Result<(), TrayError>;

    fn add_notify_icon(
        &self,
        window: Self::Window,
        notify: &NotifyIconSpec<Self::Icon>,
    ) -> Result<(), TrayError>;
    fn delete_notify_icon(&self, window: Self::Window) -> Result<(), TrayError>;

    /// Blocking retrieve/translate/dispatch loop. Returns once the quit
    /// message arrives.
    fn run_message_loop(&self) -> Result<(), TrayError>;
}

/// Native resources currently held. `None` means "not held (any more)".
struct TrayResources<W, I> {
    class_name: Option<String>,
    window: Option<W>,
    icon: Option<I>,
    /// Window the notification icon is registered on
    notify: Option<W>,
    handler: Option<Arc<dyn TrayEventHandler>>,
}

impl<W, I> Default for TrayResources<W, I> {
    fn default() -> Self {
        Self {
            class_name: None,
            window: None,
            icon: None,
            notify: None,
            handler: None,
        }
    }
}

struct Shared<B: TrayBackend> {
    state: Mutex<TrayState>,
    resources: Mutex<TrayResources<B::Window, B::Icon>>,
}

impl<B: TrayBackend> Shared<B> {
    fn set_state(&self, state: TrayState) {
        tracing::debug!(?state, "Tray state");
        *self.state.lock() = state;
    }
}

/// Forgets the window handle once the OS starts destroying the window and
/// always ends the loop on destroy
struct TrackedHandler<B: TrayBackend> {
    inner: Arc<dyn TrayEventHandler>,
    shared: Arc<Shared<B>>,
}

impl<B: TrayBackend> TrayEventHandler for TrackedHandler<B> {
    fn on_tray_event(&self, event: TrayEvent, menu: &dyn PopupMenuHost) -> TrayControl {
        let control = self.inner.on_tray_event(event, menu);
        if event == TrayEvent::Destroyed {
            self.shared.resources.lock().window = None;
            return TrayControl::StopLoop;
        }
        control
    }
}

pub struct TrayIconService<B: TrayBackend> {
    backend: Arc<B>,
    settings: TraySettings,
    handler: Arc<dyn TrayEventHandler>,
    shared: Arc<Shared<B>>,
    thread: Option<JoinHandle<()>>,
    exited: Option<Receiver<()>>,
}

impl<B: TrayBackend> TrayIconService<B> {
    pub fn new(backend: B, settings: TraySettings, handler: Arc<dyn TrayEventHandler>) -> Self {
        Self {
            backend: Arc::new(backend),
            settings,
            handler,
            shared: Arc::new(Shared {
                state: Mutex::new(TrayState::Stopped),
                resources: Mutex::new(TrayResources::default()),
            }),
            thread: None,
            exited: None,
        }
    }

    pub fn state(&self) -> TrayState {
        *self.shared.state.lock()
    }

    /// Spawn the message thread and wait until it reports whether the
    /// window and notification icon came up.
    ///
    /// On error the service is back in `Stopped` with nothing registered and
    /// no thread left running.
    pub fn start(&mut self) -> Result<(), TrayError> {
        {
            let mut state = self.shared.state.lock();
            if *state != TrayState::Stopped {
                return Err(TrayError::AlreadyStarted(*state));
            }
            *state = TrayState::Starting;
        }
        // Reap a thread left over from an earlier run
        self.wait_until_stopped(SHUTDOWN_GRACE);

        let (ready_tx, ready_rx) = bounded::<Result<(), TrayError>>(1);
        let (exit_tx, exit_rx) = bounded::<()>(0);

        let backend = Arc::clone(&self.backend);
        let shared = Arc::clone(&self.shared);
        let settings = self.settings.clone();
        let handler: Arc<dyn TrayEventHandler> = Arc::new(TrackedHandler {
            inner: Arc::clone(&self.handler),
            shared: Arc::clone(&self.shared),
        });

        let spawned = thread::Builder::new()
            .name(TRAY_THREAD_NAME.to_string())
            .spawn(move || {
                // Dropped when the thread ends, which wakes `wait_until_stopped`
                let _exit_guard = exit_tx;
                message_thread(backend.as_ref(), &shared, &settings, handler, ready_tx);
            });

        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.set_state(TrayState::Stopped);
                return Err(TrayError::Spawn(e));
            }
        };

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.thread = Some(handle);
                self.exited = Some(exit_rx);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                self.shared.set_state(TrayState::Stopped);
                Err(TrayError::ThreadLost)
            }
        }
    }

    /// Main-thread quit path: remove the notification icon right away and ask
    /// the message window to close, which ends the message loop. Safe to call
    /// any number of times, before or after the thread has exited.
    pub fn shutdown(&mut self) {
        if self.thread.is_none() {
            return;
        }

        let (notify, icon, window) = {
            let mut resources = self.shared.resources.lock();
            (resources.notify.take(), resources.icon.take(), resources.window)
        };

        if let Some(owner) = notify {
            if let Err(e) = self.backend.delete_notify_icon(owner) {
                tracing::warn!("Failed to remove tray icon: {}", e);
            }
        }
        if let Some(icon) = icon {
            if let Err(e) = self.backend.destroy_icon(icon) {
                tracing::warn!("Failed to destroy tray icon image: {}", e);
            }
        }
        if let Some(window) = window {
            if let Err(e) = self.backend.post_close(window) {
                tracing::warn!("Failed to close tray message window: {}", e);
            }
        }

        if !self.wait_until_stopped(SHUTDOWN_GRACE) {
            tracing::warn!("Tray message thread did not stop in time; it ends with the process");
        }
    }

    /// Wait for the message thread to finish and join it.
    /// Returns true when no thread is left running.
    pub fn wait_until_stopped(&mut self, timeout: Duration) -> bool {
        let Some(exited) = &self.exited else {
            return true;
        };

        match exited.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            _ => {
                self.exited = None;
                if let Some(handle) = self.thread.take() {
                    if handle.join().is_err() {
                        tracing::error!("Tray message thread panicked");
                    }
                }
                true
            }
        }
    }
}

impl<B: TrayBackend> Drop for TrayIconService<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn message_thread<B: TrayBackend>(
    backend: &B,
    shared: &Shared<B>,
    settings: &TraySettings,
    handler: Arc<dyn TrayEventHandler>,
    ready: Sender<Result<(), TrayError>>,
) {
    if let Err(e) = register(backend, shared, settings, handler) {
        tracing::error!("Tray icon unavailable: {}", e);
        shared.set_state(TrayState::Stopped);
        let _ = ready.send(Err(e));
        return;
    }

    shared.set_state(TrayState::Running);
    let _ = ready.send(Ok(()));
    tracing::info!("Tray message thread started");

    if let Err(e) = backend.run_message_loop() {
        tracing::error!("Tray message loop failed: {}", e);
    }

    shared.set_state(TrayState::Stopping);
    release_resources(backend, shared);
    shared.set_state(TrayState::Stopped);
    tracing::info!("Tray message thread exiting");
}

/// Class, window, icon, notification entry, in that order. Anything already
/// created is released again if a later step fails.
fn register<B: TrayBackend>(
    backend: &B,
    shared: &Shared<B>,
    settings: &TraySettings,
    handler: Arc<dyn TrayEventHandler>,
) -> Result<(), TrayError> {
    let class_name = protocol::unique_class_name();
    backend.register_class(&class_name)?;
    shared.resources.lock().class_name = Some(class_name.clone());

    let window = match backend.create_message_window(&class_name, Arc::clone(&handler)) {
        Ok(window) => window,
        Err(e) => {
            release_resources(backend, shared);
            return Err(e);
        }
    };
    {
        let mut resources = shared.resources.lock();
        resources.window = Some(window);
        resources.handler = Some(handler);
    }

    let icon = match &settings.icon_path {
        Some(path) => match backend.load_icon(path) {
            Ok(icon) => Some(icon),
            Err(e) => {
                tracing::warn!("{}; continuing without a tray icon image", e);
                None
            }
        },
        None => {
            tracing::warn!("No tray icon configured; continuing without a tray icon image");
            None
        }
    };
    shared.resources.lock().icon = icon;

    let notify = NotifyIconSpec::new(&settings.tooltip, icon);
    if let Err(e) = backend.add_notify_icon(window, &notify) {
        release_resources(backend, shared);
        return Err(e);
    }
    shared.resources.lock().notify = Some(window);

    Ok(())
}

/// Release whatever is still held. Runs on the tray thread; the lock is
/// never held across a native call because destroying the window re-enters
/// the handler.
fn release_resources<B: TrayBackend>(backend: &B, shared: &Shared<B>) {
    let notify = shared.resources.lock().notify.take();
    if let Some(owner) = notify {
        if let Err(e) = backend.delete_notify_icon(owner) {
            tracing::warn!("Failed to remove tray icon: {}", e);
        }
    }

    let icon = shared.resources.lock().icon.take();
    if let Some(icon) = icon {
        if let Err(e) = backend.destroy_icon(icon) {
            tracing::warn!("Failed to destroy tray icon image: {}", e);
        }
    }

    let window = shared.resources.lock().window.take();
    if let Some(window) = window {
        if let Err(e) = backend.destroy_window(window) {
            tracing::warn!("Failed to destroy tray message window: {}", e);
        }
    }

    let class_name = shared.resources.lock().class_name.take();
    if let Some(class_name) = class_name {
        if let Err(e) = backend.unregister_class(&class_name) {
            tracing::warn!("Failed to unregister tray window class: {}", e);
        }
    }

    shared.resources.lock().handler = None;
}
