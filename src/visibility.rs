//! Lock-free flags shared between the tray thread and the render thread
//!
//! - `VisibilityToggle`: the "force-hidden" flag. Flipped by the tray thread,
//!   read every frame by the main thread.
//! - `QuitRequest`: set by the tray thread when "Exit" is chosen, consumed
//!   and cleared by the main thread only.

use std::sync::atomic::{AtomicBool, Ordering};

/// Shared force-hidden flag (starts visible)
#[derive(Debug, Default)]
pub struct VisibilityToggle {
    hidden: AtomicBool,
}

impl VisibilityToggle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current force-hidden value. Wait-free.
    pub fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::Acquire)
    }

    /// Atomically flip the flag and return the NEW value.
    ///
    /// Callers must act on the returned value instead of re-reading the flag,
    /// otherwise two interleaved toggles can both observe the same state.
    pub fn toggle(&self) -> bool {
        !self.hidden.fetch_xor(true, Ordering::AcqRel)
    }

    /// Set the flag to hidden only if it is currently visible.
    /// Returns true when this call performed the transition.
    pub fn hide_if_visible(&self) -> bool {
        self.hidden
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Pending "quit the application" request
#[derive(Debug, Default)]
pub struct QuitRequest {
    requested: AtomicBool,
}

impl QuitRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the request. Returns false if one was already pending.
    pub fn request(&self) -> bool {
        !self.requested.swap(true, Ordering::AcqRel)
    }

    /// Consume a pending request. Only the main thread calls this; the flag
    /// is cleared before the caller starts shutting down.
    pub fn take(&self) -> bool {
        self.requested.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }
}
