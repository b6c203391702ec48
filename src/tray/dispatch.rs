//! Tray callback dispatch
//!
//! The platform backend decodes native messages into [`TrayEvent`]s and
//! hands them to a [`TrayEventHandler`] on the tray thread.

use std::sync::Arc;

use super::menu::{ContextMenuPresenter, PopupMenuHost};
use super::protocol::TrayEvent;
use crate::overlay::OverlayContext;

/// Whether the message loop should keep running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayControl {
    Continue,
    /// Post the quit message to the tray thread's own queue
    StopLoop,
}

pub trait TrayEventHandler: Send + Sync {
    fn on_tray_event(&self, event: TrayEvent, menu: &dyn PopupMenuHost) -> TrayControl;
}

/// Routes clicks to the overlay visibility toggle and the context menu
pub struct TrayDispatcher {
    ctx: Arc<OverlayContext>,
    menu: ContextMenuPresenter,
}

impl TrayDispatcher {
    pub fn new(ctx: Arc<OverlayContext>, menu: ContextMenuPresenter) -> Self {
        Self { ctx, menu }
    }
}

impl TrayEventHandler for TrayDispatcher {
    fn on_tray_event(&self, event: TrayEvent, menu: &dyn PopupMenuHost) -> TrayControl {
        match event {
            TrayEvent::LeftClick => {
                self.ctx.toggle_visibility();
                TrayControl::Continue
            }
            TrayEvent::RightClick => {
                let outcome = self.menu.show(menu);
                tracing::debug!(?outcome, "Tray menu closed");
                TrayControl::Continue
            }
            TrayEvent::Destroyed => {
                tracing::debug!("Tray message window destroyed");
                TrayControl::StopLoop
            }
        }
    }
}
