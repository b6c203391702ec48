//! Per-frame click-through controller
//!
//! Each tick asks the focus probe whether the pointer is over the mascot and
//! restyles the overlay window accordingly:
//! - focused: interactive (clicks land on the overlay)
//! - not focused: layered + transparent (clicks fall through to the desktop)
//!
//! Position and topmost order are re-asserted on every tick so other
//! programs cannot quietly push the overlay down or move it.

use std::sync::Arc;

use crate::focus::FocusProbe;
use crate::overlay::OverlayContext;
use crate::window::{Rect, WindowMode, WindowStyle};

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Overlay is force-hidden, nothing touched
    Hidden,
    /// No native window attached yet
    NoWindow,
    Applied(WindowMode),
}

pub struct ClickThroughController {
    ctx: Arc<OverlayContext>,
    probe: Box<dyn FocusProbe>,
    width: u32,
    height: u32,
    last_bounds: Rect,
    mode: Option<WindowMode>,
}

impl ClickThroughController {
    /// `width`/`height` is the overlay size re-applied on every tick
    pub fn new(ctx: Arc<OverlayContext>, probe: Box<dyn FocusProbe>, width: u32, height: u32) -> Self {
        Self {
            ctx,
            probe,
            width,
            height,
            last_bounds: Rect::default(),
            mode: None,
        }
    }

    /// Mode applied by the most recent tick
    pub fn mode(&self) -> Option<WindowMode> {
        self.mode
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.ctx.visibility().is_hidden() {
            return TickOutcome::Hidden;
        }
        let Some(window) = self.ctx.window() else {
            return TickOutcome::NoWindow;
        };

        let mode = WindowMode::from_focus(self.probe.is_pointer_over_interactive_region());

        // Keep the previous origin if the native query fails this frame
        if let Some(bounds) = window.bounds() {
            self.last_bounds = bounds;
        }

        let current = window.style().unwrap_or_else(WindowStyle::default);
        window.set_style(mode.restyle(current));
        if mode == WindowMode::PassThrough {
            window.set_layered_alpha(255, None);
        }
        window.set_topmost_at(Rect::from_origin_size(
            self.last_bounds.left,
            self.last_bounds.top,
            self.width,
            self.height,
        ));

        if self.mode != Some(mode) {
            tracing::debug!(?mode, "Click-through mode changed");
            self.mode = Some(mode);
        }
        TickOutcome::Applied(mode)
    }
}
