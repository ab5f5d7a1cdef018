//! Wayland-native window state: xdg_toplevel, xdg_popup, layer-shell
//! surfaces, and subsurfaces.

use crate::core::ids::WindowId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaylandSurfaceKind {
    Toplevel,
    Popup { parent: WindowId, has_grab: bool },
    Layer { layer_index: u8, exclusive_zone: i32 },
    Subsurface { parent: WindowId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XdgToplevelStates {
    pub maximized: bool,
    pub fullscreen: bool,
    pub resizing: bool,
    pub activated: bool,
    pub tiled_left: bool,
    pub tiled_right: bool,
    pub tiled_top: bool,
    pub tiled_bottom: bool,
}

#[derive(Debug, Clone)]
pub struct WaylandState {
    pub surface_kind: WaylandSurfaceKind,
    /// Highest serial the client has acked via `xdg_surface.ack_configure`.
    pub last_acked_serial: Option<u64>,
    pub states: XdgToplevelStates,
    pub accepts_keyboard_focus: bool,
    /// Set once a `xdg_toplevel.close` ping/close has been sent; a second
    /// close without an intervening unmap means the client is stuck.
    pub close_sent: bool,
}

impl WaylandState {
    pub fn new(surface_kind: WaylandSurfaceKind) -> Self {
        let accepts_keyboard_focus = !matches!(surface_kind, WaylandSurfaceKind::Subsurface { .. });
        Self {
            surface_kind,
            last_acked_serial: None,
            states: XdgToplevelStates::default(),
            accepts_keyboard_focus,
            close_sent: false,
        }
    }

    pub fn is_popup(&self) -> bool {
        matches!(self.surface_kind, WaylandSurfaceKind::Popup { .. })
    }
}
