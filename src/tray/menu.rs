//! Tray right-click menu

use std::sync::Arc;

use super::protocol::{ID_EXIT, MENU_NO_SELECTION};
use crate::error::TrayError;
use crate::overlay::OverlayContext;

/// One command in a popup menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuEntry<'a> {
    pub id: u32,
    pub label: &'a str,
}

/// Shows a native popup menu for the tray's message window.
///
/// Implementations put the menu at the cursor, bring the owner window to
/// the foreground first, block until the user picks a command or dismisses
/// the menu, and free the menu before returning. The result is the chosen
/// command id, or [`MENU_NO_SELECTION`].
pub trait PopupMenuHost {
    fn track_popup(&self, entries: &[MenuEntry<'_>]) -> Result<u32, TrayError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOutcome {
    ExitRequested,
    /// Dismissed while visible; the overlay was hidden again
    Rehidden,
    Dismissed,
    Failed,
}

pub struct ContextMenuPresenter {
    ctx: Arc<OverlayContext>,
    exit_label: String,
}

impl ContextMenuPresenter {
    pub fn new(ctx: Arc<OverlayContext>, exit_label: impl Into<String>) -> Self {
        Self {
            ctx,
            exit_label: exit_label.into(),
        }
    }

    /// Show the menu and act on the result. Runs on the tray thread.
    ///
    /// "Exit" never quits from here: it raises the quit request and the
    /// main thread performs the shutdown on its next frame.
    pub fn show(&self, host: &dyn PopupMenuHost) -> MenuOutcome {
        let entries = [MenuEntry {
            id: ID_EXIT,
            label: &self.exit_label,
        }];

        match host.track_popup(&entries) {
            Ok(ID_EXIT) => {
                if self.ctx.quit().request() {
                    tracing::info!("Exit selected from tray menu");
                }
                MenuOutcome::ExitRequested
            }
            Ok(MENU_NO_SELECTION) => {
                // Clicking away from the menu while the overlay is up hides it
                if self.ctx.hide_if_visible() {
                    MenuOutcome::Rehidden
                } else {
                    MenuOutcome::Dismissed
                }
            }
            Ok(other) => {
                tracing::warn!(command = other, "Unknown tray menu command");
                MenuOutcome::Dismissed
            }
            Err(e) => {
                tracing::warn!("Tray menu failed: {}", e);
                MenuOutcome::Failed
            }
        }
    }
}
