//! Notification-area message constants and decoding
//!
//! Values match the Win32 headers so the platform backend can pass them
//! straight through.

pub const WM_USER: u32 = 0x0400;
/// Callback message the notification icon posts to the message window
pub const WM_TRAY: u32 = WM_USER + 1;
pub const WM_DESTROY: u32 = 0x0002;
pub const WM_LBUTTONUP: u32 = 0x0202;
pub const WM_RBUTTONUP: u32 = 0x0205;

/// Menu command id of "Exit". Must differ from [`MENU_NO_SELECTION`].
pub const ID_EXIT: u32 = 1001;
/// What a popup menu returns when dismissed without a selection
pub const MENU_NO_SELECTION: u32 = 0;

pub const NIF_MESSAGE: u32 = 0x0000_0001;
pub const NIF_ICON: u32 = 0x0000_0002;
pub const NIF_TIP: u32 = 0x0000_0004;

/// uID of our single notification icon
pub const TRAY_ICON_ID: u32 = 1;

/// Tooltip buffer is 128 UTF-16 units including the terminator
pub const TOOLTIP_CAPACITY: usize = 128;

/// Tray events the dispatcher cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayEvent {
    LeftClick,
    RightClick,
    /// The message window is being destroyed
    Destroyed,
}

/// Map a raw window message to a tray event.
/// For `WM_TRAY` the mouse message is in the low word of `lparam`.
pub fn decode(message: u32, lparam: isize) -> Option<TrayEvent> {
    match message {
        WM_TRAY => match (lparam & 0xFFFF) as u32 {
            WM_LBUTTONUP => Some(TrayEvent::LeftClick),
            WM_RBUTTONUP => Some(TrayEvent::RightClick),
            _ => None,
        },
        WM_DESTROY => Some(TrayEvent::Destroyed),
        _ => None,
    }
}

/// Everything needed to register the notification icon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyIconSpec<I> {
    pub id: u32,
    pub callback_message: u32,
    pub icon: Option<I>,
    pub tooltip: Vec<u16>,
}

impl<I> NotifyIconSpec<I> {
    pub fn new(tooltip: &str, icon: Option<I>) -> Self {
        Self {
            id: TRAY_ICON_ID,
            callback_message: WM_TRAY,
            icon,
            tooltip: tooltip_units(tooltip),
        }
    }

    /// `NIF_ICON` is left out when no icon could be loaded
    pub fn flags(&self) -> u32 {
        let mut flags = NIF_MESSAGE | NIF_TIP;
        if self.icon.is_some() {
            flags |= NIF_ICON;
        }
        flags
    }
}

/// UTF-16 tooltip, truncated so the terminator still fits
fn tooltip_units(text: &str) -> Vec<u16> {
    let mut units: Vec<u16> = text.encode_utf16().take(TOOLTIP_CAPACITY - 1).collect();
    // Never end on half of a surrogate pair
    if units.last().is_some_and(|u| (0xD800..0xDC00).contains(u)) {
        units.pop();
    }
    units
}

/// Window class name unique to this process run, so a class left registered
/// by an earlier instance cannot collide with ours
pub fn unique_class_name() -> String {
    format!("DesktopMascotTray_{}", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tray_clicks() {
        assert_eq!(decode(WM_TRAY, WM_LBUTTONUP as isize), Some(TrayEvent::LeftClick));
        assert_eq!(decode(WM_TRAY, WM_RBUTTONUP as isize), Some(TrayEvent::RightClick));
        // high word carries the icon id on newer shells
        assert_eq!(
            decode(WM_TRAY, (1 << 16) | WM_LBUTTONUP as isize),
            Some(TrayEvent::LeftClick)
        );
        assert_eq!(decode(WM_TRAY, 0x0201), None);
    }

    #[test]
    fn test_decode_destroy_and_unrelated() {
        assert_eq!(decode(WM_DESTROY, 0), Some(TrayEvent::Destroyed));
        assert_eq!(decode(WM_LBUTTONUP, 0), None);
    }

    #[test]
    fn test_flags_without_icon() {
        let notify: NotifyIconSpec<u32> = NotifyIconSpec::new("Mascot", None);
        assert_eq!(notify.flags(), NIF_MESSAGE | NIF_TIP);
        assert_eq!(notify.flags() & NIF_ICON, 0);

        let notify = NotifyIconSpec::new("Mascot", Some(7u32));
        assert_eq!(notify.flags(), NIF_MESSAGE | NIF_TIP | NIF_ICON);
        assert_eq!(notify.callback_message, WM_TRAY);
    }

    #[test]
    fn test_tooltip_truncated() {
        let long = "x".repeat(300);
        let notify: NotifyIconSpec<u32> = NotifyIconSpec::new(&long, None);
        assert_eq!(notify.tooltip.len(), TOOLTIP_CAPACITY - 1);

        // An emoji straddling the limit is dropped whole
        let straddling = format!("{}\u{1F600}", "x".repeat(TOOLTIP_CAPACITY - 2));
        let notify: NotifyIconSpec<u32> = NotifyIconSpec::new(&straddling, None);
        assert_eq!(notify.tooltip.len(), TOOLTIP_CAPACITY - 2);
        assert!(String::from_utf16(&notify.tooltip).is_ok());

        // One that fits is kept
        let fitting = format!("{}\u{1F600}", "x".repeat(TOOLTIP_CAPACITY - 3));
        let notify: NotifyIconSpec<u32> = NotifyIconSpec::new(&fitting, None);
        assert_eq!(notify.tooltip.len(), TOOLTIP_CAPACITY - 1);
        assert!(String::from_utf16(&notify.tooltip).unwrap().ends_with('\u{1F600}'));
    }

    #[test]
    fn test_exit_id_distinct_from_dismissal() {
        assert_ne!(ID_EXIT, MENU_NO_SELECTION);
    }

    #[test]
    fn test_class_names_unique() {
        let a = unique_class_name();
        let b = unique_class_name();
        assert_ne!(a, b);
        assert!(a.starts_with("DesktopMascotTray_"));
    }
}
