//! Native window abstraction
//!
//! The overlay only ever touches its OS window through [`NativeWindow`].
//! The style transitions between the interactive and click-through modes are
//! computed here as plain bit arithmetic so they can be checked without a
//! real window.

pub const WS_POPUP: u32 = 0x8000_0000;
pub const WS_VISIBLE: u32 = 0x1000_0000;
pub const WS_EX_TOPMOST: u32 = 0x0000_0008;
pub const WS_EX_TRANSPARENT: u32 = 0x0000_0020;
pub const WS_EX_LAYERED: u32 = 0x0008_0000;

/// Extended bits that make the window ignore mouse input
const PASS_THROUGH_BITS: u32 = WS_EX_LAYERED | WS_EX_TRANSPARENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Screen-space rectangle, right/bottom exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin_size(left: i32, top: i32, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(width as i32),
            bottom: top.saturating_add(height as i32),
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right && point.y >= self.top && point.y < self.bottom
    }
}

/// Base (`GWL_STYLE`) and extended (`GWL_EXSTYLE`) style bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStyle {
    pub base: u32,
    pub extended: u32,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            base: WS_POPUP | WS_VISIBLE,
            extended: 0,
        }
    }
}

/// The two input modes of the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowMode {
    /// Accepts mouse input (cursor is over the mascot or UI)
    Interactive,
    /// Layered and mouse-transparent; clicks reach the windows below
    PassThrough,
}

impl WindowMode {
    pub fn from_focus(focused: bool) -> Self {
        if focused {
            WindowMode::Interactive
        } else {
            WindowMode::PassThrough
        }
    }

    /// Style to apply when entering this mode from `current`.
    ///
    /// PassThrough also forces the borderless popup base style back on, in
    /// case something outside the overlay restyled the window.
    pub fn restyle(self, current: WindowStyle) -> WindowStyle {
        match self {
            WindowMode::Interactive => WindowStyle {
                base: current.base,
                extended: current.extended & !PASS_THROUGH_BITS,
            },
            WindowMode::PassThrough => WindowStyle {
                base: WS_POPUP | WS_VISIBLE,
                extended: current.extended | PASS_THROUGH_BITS,
            },
        }
    }

    /// Mode implied by existing style bits
    pub fn classify(style: WindowStyle) -> Self {
        if style.extended & WS_EX_TRANSPARENT != 0 {
            WindowMode::PassThrough
        } else {
            WindowMode::Interactive
        }
    }
}

/// How to show the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowMode {
    Normal,
    Hidden,
}

/// RGB colour treated as fully transparent by a layered window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorKey(pub u32);

/// Operations the overlay needs from its top-level OS window.
///
/// Every call is best-effort: implementations log native failures and
/// return normally. The next frame retries whatever the controller needs.
pub trait NativeWindow: Send + Sync {
    fn style(&self) -> Option<WindowStyle>;
    fn set_style(&self, style: WindowStyle);
    fn bounds(&self) -> Option<Rect>;
    /// Move/resize and put the window in the topmost band
    fn set_topmost_at(&self, rect: Rect);
    fn set_layered_alpha(&self, alpha: u8, key: Option<ColorKey>);
    fn show(&self, mode: ShowMode);
    fn bring_to_front(&self);
    fn set_foreground(&self);
    fn release_capture(&self);
    /// Enter the system move loop as if the caption had been grabbed
    fn begin_move_drag(&self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_through_sets_layered_and_transparent() {
        let current = WindowStyle {
            base: 0x00CF_0000,
            extended: WS_EX_TOPMOST,
        };
        let next = WindowMode::PassThrough.restyle(current);
        assert_eq!(next.base, WS_POPUP | WS_VISIBLE);
        assert_eq!(
            next.extended,
            WS_EX_TOPMOST | WS_EX_LAYERED | WS_EX_TRANSPARENT
        );
        assert_eq!(WindowMode::classify(next), WindowMode::PassThrough);
    }

    #[test]
    fn test_interactive_clears_only_pass_through_bits() {
        let current = WindowStyle {
            base: WS_POPUP | WS_VISIBLE,
            extended: WS_EX_TOPMOST | WS_EX_LAYERED | WS_EX_TRANSPARENT | 0x80,
        };
        let next = WindowMode::Interactive.restyle(current);
        assert_eq!(next.base, current.base);
        assert_eq!(next.extended, WS_EX_TOPMOST | 0x80);
        assert_eq!(WindowMode::classify(next), WindowMode::Interactive);
    }

    #[test]
    fn test_rect_contains_is_right_exclusive() {
        let rect = Rect::from_origin_size(10, 20, 5, 5);
        assert!(rect.contains(Point::new(10, 20)));
        assert!(rect.contains(Point::new(14, 24)));
        assert!(!rect.contains(Point::new(15, 24)));
        assert!(!rect.contains(Point::new(9, 22)));
        assert_eq!(rect.width(), 5);
    }
}
