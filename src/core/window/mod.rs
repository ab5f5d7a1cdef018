//! The window sum type.
//!
//! Replaces a `Toplevel → AbstractClient → X11Client / XdgShellClient …`
//! inheritance tree with one `Window` holding fields common to every variant
//! plus a `WindowKind` enum for the variant-specific bits. Dispatch that used
//! to be virtual is an explicit `match` on `kind`.

pub mod remnant;
pub mod wayland;
pub mod x11;

use crate::core::geometry::Rect;
use crate::core::ids::{GroupId, WindowId};

pub use remnant::RemnantState;
pub use wayland::{WaylandState, WaylandSurfaceKind};
pub use x11::X11State;

/// `max_mode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxMode {
    #[default]
    Restore,
    Vertical,
    Horizontal,
    Full,
}

impl MaxMode {
    pub fn is_maximized(self) -> bool {
        !matches!(self, MaxMode::Restore)
    }
}

/// Coarse z-order bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Unknown,
    Desktop,
    Below,
    Normal,
    Dock,
    Above,
    Notification,
    OnScreenDisplay,
    CriticalNotification,
    ActiveFullscreen,
    Popup,
    Unmanaged,
}

/// A window's `user_time`: either unset, an explicit "don't activate me"
/// zero, or a 32-bit wire timestamp compared wrap-safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserTime {
    Unset,
    ExplicitZero,
    Timestamp(u32),
}

impl UserTime {
    /// True iff `self` is at least as new as `other`, using 32-bit
    /// wrap-safe comparison (the newer of two timestamps is the one that
    /// leads by less than 2^31).
    pub fn at_least_as_new_as(self, other: UserTime) -> bool {
        match (self, other) {
            (UserTime::Timestamp(a), UserTime::Timestamp(b)) => a.wrapping_sub(b) < (1u32 << 31),
            (UserTime::Unset, _) => false,
            (_, UserTime::Unset) => true,
            (UserTime::ExplicitZero, UserTime::ExplicitZero) => true,
            (UserTime::ExplicitZero, UserTime::Timestamp(_)) => false,
            (UserTime::Timestamp(_), UserTime::ExplicitZero) => true,
        }
    }
}

/// Bitmask of quick-tile edges; `NONE` means untiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuickTileMode(u8);

impl QuickTileMode {
    pub const NONE: QuickTileMode = QuickTileMode(0);
    pub const LEFT: QuickTileMode = QuickTileMode(1 << 0);
    pub const RIGHT: QuickTileMode = QuickTileMode(1 << 1);
    pub const TOP: QuickTileMode = QuickTileMode(1 << 2);
    pub const BOTTOM: QuickTileMode = QuickTileMode(1 << 3);
    pub const MAXIMIZE: QuickTileMode = QuickTileMode(1 << 4);

    pub fn contains(self, other: QuickTileMode) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn union(self, other: QuickTileMode) -> QuickTileMode {
        QuickTileMode(self.0 | other.0)
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// One entry in `pending_configures`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfigure {
    pub serial: u64,
    pub frame_geometry: Rect,
    pub client_geometry: Rect,
    pub max_mode: MaxMode,
    pub fullscreen: bool,
}

/// Which virtual desktop(s) a window is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Desktop {
    Numbered(u32),
    All,
}

/// Present iff the window participates in focus/layer/rules.
#[derive(Debug, Clone, Default)]
pub struct Control {
    pub focus_stealing_level: Option<u8>,
    pub rules_applied: std::collections::HashSet<&'static str>,
}

/// Fields shared by every variant.
#[derive(Debug, Clone)]
pub struct WindowCommon {
    pub frame_geometry: Rect,
    pub client_geometry: Rect,
    pub render_geometry: Rect,
    pub max_mode: MaxMode,
    pub fullscreen: bool,
    pub minimized: bool,
    pub hidden: bool,
    pub on_all_desktops: bool,
    pub keep_above: bool,
    pub keep_below: bool,
    pub skip_taskbar: bool,
    pub skip_pager: bool,
    pub skip_switcher: bool,
    pub no_border: bool,
    pub demands_attention: bool,
    pub desktop: Desktop,
    pub layer: Layer,
    pub user_time: UserTime,
    pub restore_geometry: Rect,
    pub quicktile_mode: QuickTileMode,
    pub pending_configures: std::collections::VecDeque<PendingConfigure>,
    pub transient_for: Option<WindowId>,
    pub transient_children: Vec<WindowId>,
    pub group_id: Option<GroupId>,
    pub control: Option<Control>,
    pub title: String,
    pub app_id: String,
}

impl WindowCommon {
    pub fn new(frame_geometry: Rect) -> Self {
        Self {
            frame_geometry,
            client_geometry: frame_geometry,
            render_geometry: frame_geometry,
            max_mode: MaxMode::Restore,
            fullscreen: false,
            minimized: false,
            hidden: false,
            on_all_desktops: false,
            keep_above: false,
            keep_below: false,
            skip_taskbar: false,
            skip_pager: false,
            skip_switcher: false,
            no_border: false,
            demands_attention: false,
            desktop: Desktop::Numbered(1),
            layer: Layer::Normal,
            user_time: UserTime::Unset,
            restore_geometry: frame_geometry,
            quicktile_mode: QuickTileMode::NONE,
            pending_configures: Default::default(),
            transient_for: None,
            transient_children: Vec::new(),
            group_id: None,
            control: Some(Control::default()),
            title: String::new(),
            app_id: String::new(),
        }
    }

    /// True unless the client's content geometry has escaped its frame
    /// geometry, which borderless windows are exempt from.
    pub fn geometry_is_consistent(&self) -> bool {
        self.client_geometry.is_contained_in(self.frame_geometry) || self.no_border
    }
}

/// Variant-specific state.
#[derive(Debug, Clone)]
pub enum WindowKind {
    X11Managed(X11State),
    WaylandNative(WaylandState),
    Internal,
    Remnant(RemnantState),
}

/// A managed window: common fields plus variant-specific state.
#[derive(Debug, Clone)]
pub struct Window {
    pub id: WindowId,
    pub common: WindowCommon,
    pub kind: WindowKind,
}

/// Why a focus-take attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FocusError {
    #[error("client refused focus")]
    Refused,
    #[error("window has no control block and cannot take focus")]
    Unmanaged,
}

impl Window {
    pub fn new(id: WindowId, kind: WindowKind, frame_geometry: Rect) -> Self {
        let mut common = WindowCommon::new(frame_geometry);
        if matches!(kind, WindowKind::Remnant(_)) {
            common.control = None;
        }
        Self { id, common, kind }
    }

    pub fn frame_geometry(&self) -> Rect {
        self.common.frame_geometry
    }

    /// Raw geometry setter used by `geometry_sync` once it has decided the
    /// new canonical geometry; does not itself talk to clients.
    pub fn set_frame_geometry(&mut self, rect: Rect) {
        self.common.frame_geometry = rect;
    }

    pub fn set_max_mode(&mut self, mode: MaxMode) {
        self.common.max_mode = mode;
        if mode.is_maximized() {
            // Maximized windows are always borderless.
            self.common.no_border = true;
        }
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.common.fullscreen = fullscreen;
        if fullscreen {
            self.common.no_border = true;
        }
    }

    pub fn set_minimized(&mut self, minimized: bool) {
        self.common.minimized = minimized;
    }

    /// True iff remnants/internal windows: these never block on an ack
    /// round trip and are asked to close synchronously.
    pub fn is_remnant(&self) -> bool {
        matches!(self.kind, WindowKind::Remnant(_))
    }

    pub fn is_unmanaged(&self) -> bool {
        self.common.control.is_none()
    }

    pub fn is_closeable(&self) -> bool {
        match &self.kind {
            WindowKind::Remnant(_) => false,
            WindowKind::Internal => true,
            WindowKind::X11Managed(s) => s.supports_delete || s.pid.is_some(),
            WindowKind::WaylandNative(_) => true,
        }
    }

    pub fn wants_input(&self) -> bool {
        match &self.kind {
            WindowKind::Remnant(_) => false,
            WindowKind::Internal => false,
            WindowKind::X11Managed(s) => s.accepts_input,
            WindowKind::WaylandNative(s) => s.accepts_keyboard_focus,
        }
    }

    pub fn accepts_focus(&self) -> bool {
        self.common.control.is_some() && self.wants_input() && !self.common.minimized
    }

    /// Records a focus-take attempt's outcome.
    pub fn take_focus(&mut self) -> Result<(), FocusError> {
        if self.common.control.is_none() {
            return Err(FocusError::Unmanaged);
        }
        if !self.wants_input() {
            return Err(FocusError::Refused);
        }
        Ok(())
    }

    pub fn is_shown(&self) -> bool {
        !self.common.minimized && !self.common.hidden
    }

    /// Where to place the window's taskbar/pager icon animation source.
    pub fn icon_geometry(&self) -> Rect {
        self.common.frame_geometry
    }

    /// `close()`: per-variant graceful close.
    pub fn close(&self) -> CloseAction {
        if !self.is_closeable() {
            return CloseAction::NoOp;
        }
        match &self.kind {
            WindowKind::X11Managed(s) if s.supports_delete => CloseAction::SendX11Delete,
            WindowKind::X11Managed(_) => CloseAction::Kill,
            WindowKind::WaylandNative(_) => CloseAction::SendXdgClose,
            WindowKind::Internal => CloseAction::DropInternal,
            WindowKind::Remnant(_) => CloseAction::NoOp,
        }
    }

    /// `kill()`: forceful termination, falling through to killing the
    /// client connection when no pid is known.
    pub fn kill(&self) -> CloseAction {
        match &self.kind {
            WindowKind::X11Managed(s) => match s.pid {
                Some(pid) => CloseAction::KillPid(pid),
                None => CloseAction::KillClientConnection,
            },
            _ => CloseAction::KillClientConnection,
        }
    }
}

/// What the adapter layer must actually do in response to `close`/`kill`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    NoOp,
    SendX11Delete,
    SendXdgClose,
    Kill,
    KillPid(u32),
    KillClientConnection,
    DropInternal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::{Point, Size};

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn fullscreen_forces_no_border() {
        let mut w = Window::new(WindowId::for_test(1), WindowKind::Internal, rect(0, 0, 100, 100));
        assert!(!w.common.no_border);
        w.set_fullscreen(true);
        assert!(w.common.no_border);
    }

    #[test]
    fn remnant_has_no_control_and_is_not_closeable() {
        let w = Window::new(
            WindowId::for_test(2),
            WindowKind::Remnant(RemnantState::new(vec![])),
            rect(0, 0, 10, 10),
        );
        assert!(w.is_unmanaged());
        assert!(!w.is_closeable());
        assert_eq!(w.close(), CloseAction::NoOp);
    }

    #[test]
    fn user_time_wrap_safe_comparison() {
        let newer = UserTime::Timestamp(10);
        let older = UserTime::Timestamp(u32::MAX - 5);
        // 10 trails MAX-5 by 16, which is less than 2^31, so 10 is newer.
        assert!(newer.at_least_as_new_as(older));
        assert!(!older.at_least_as_new_as(newer));
    }

    #[test]
    fn explicit_zero_never_outranks_a_timestamp() {
        assert!(!UserTime::ExplicitZero.at_least_as_new_as(UserTime::Timestamp(1)));
        assert!(UserTime::Timestamp(1).at_least_as_new_as(UserTime::ExplicitZero));
    }
}
