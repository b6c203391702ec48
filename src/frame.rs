//! Main-thread frame driver

use std::sync::Arc;
use std::time::Duration;

use crate::click_through::{ClickThroughController, TickOutcome};
use crate::overlay::OverlayContext;

pub const DEFAULT_FRAME_RATE: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    Continue(TickOutcome),
    /// "Exit" was chosen from the tray; the request has been consumed
    ExitRequested,
}

pub struct FrameDriver {
    ctx: Arc<OverlayContext>,
    controller: ClickThroughController,
}

impl FrameDriver {
    pub fn new(ctx: Arc<OverlayContext>, controller: ClickThroughController) -> Self {
        Self { ctx, controller }
    }

    /// Run once per rendered frame.
    ///
    /// A pending quit request is cleared before it is reported, so a slow
    /// shutdown never sees it twice.
    pub fn run_frame(&mut self) -> FrameOutcome {
        if self.ctx.quit().take() {
            tracing::info!("Exit requested from tray, shutting down");
            return FrameOutcome::ExitRequested;
        }
        FrameOutcome::Continue(self.controller.tick())
    }
}

/// Time between frames for a target rate (0 falls back to the default)
pub fn frame_interval(frame_rate: u32) -> Duration {
    let rate = if frame_rate == 0 {
        DEFAULT_FRAME_RATE
    } else {
        frame_rate
    };
    Duration::from_secs(1) / rate
}
