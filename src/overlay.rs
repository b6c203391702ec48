//! Overlay context shared by the render thread and the tray thread
//!
//! Created once at startup and handed (behind an `Arc`) to every component
//! that needs the overlay window or the shared flags.

use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::error::OverlayError;
use crate::visibility::{QuitRequest, VisibilityToggle};
use crate::window::{NativeWindow, ShowMode};

/// Fullscreen overlays cannot be dragged around
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationMode {
    Fullscreen,
    Windowed,
}

pub struct OverlayContext {
    window: OnceCell<Arc<dyn NativeWindow>>,
    visibility: VisibilityToggle,
    quit: QuitRequest,
    presentation: PresentationMode,
}

impl OverlayContext {
    pub fn new(presentation: PresentationMode) -> Self {
        Self {
            window: OnceCell::new(),
            visibility: VisibilityToggle::new(),
            quit: QuitRequest::new(),
            presentation,
        }
    }

    /// Attach the overlay window. Only the first call succeeds.
    pub fn attach_window(&self, window: Arc<dyn NativeWindow>) -> Result<(), OverlayError> {
        self.window
            .set(window)
            .map_err(|_| OverlayError::AlreadyAttached)
    }

    pub fn window(&self) -> Option<&Arc<dyn NativeWindow>> {
        self.window.get()
    }

    pub fn visibility(&self) -> &VisibilityToggle {
        &self.visibility
    }

    pub fn quit(&self) -> &QuitRequest {
        &self.quit
    }

    pub fn presentation(&self) -> PresentationMode {
        self.presentation
    }

    /// Flip force-hidden and show or hide the window to match.
    ///
    /// Returns the new hidden state, or `None` when no window is attached yet
    /// (the flag is left untouched in that case).
    pub fn toggle_visibility(&self) -> Option<bool> {
        let Some(window) = self.window() else {
            tracing::warn!("Visibility toggle requested before the overlay window exists");
            return None;
        };

        let hidden = self.visibility.toggle();
        apply_visibility(window.as_ref(), hidden);
        Some(hidden)
    }

    /// Hide the overlay if it is currently visible.
    /// Returns true when the overlay went from visible to hidden.
    pub fn hide_if_visible(&self) -> bool {
        let Some(window) = self.window() else {
            tracing::warn!("Hide requested before the overlay window exists");
            return false;
        };

        if self.visibility.hide_if_visible() {
            apply_visibility(window.as_ref(), true);
            true
        } else {
            false
        }
    }

    /// Start dragging the overlay with the mouse (windowed mode only)
    pub fn drag_window(&self) {
        let Some(window) = self.window() else {
            tracing::warn!("Drag requested before the overlay window exists");
            return;
        };

        if self.presentation != PresentationMode::Windowed {
            return;
        }

        window.release_capture();
        window.begin_move_drag();
    }
}

fn apply_visibility(window: &dyn NativeWindow, hidden: bool) {
    if hidden {
        window.show(ShowMode::Hidden);
        tracing::info!("Overlay force-hidden");
    } else {
        window.show(ShowMode::Normal);
        window.bring_to_front();
        window.set_foreground();
        tracing::info!("Overlay shown");
    }
}
