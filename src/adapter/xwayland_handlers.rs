//! X11 window lifecycle: each `XwmHandler` callback does the same
//! `core::Space` bookkeeping `adapter::wayland_handlers` does for Wayland
//! toplevels.

use smithay::utils::{Logical, Rectangle};
use smithay::wayland::xwayland_shell::{XWaylandShellHandler, XWaylandShellState};
use smithay::xwayland::xwm::{Reorder, ResizeEdge, XwmId};
use smithay::xwayland::{X11Surface, X11Wm, XwmHandler};

use crate::adapter::registry::Handle;
use crate::adapter::state::State;
use crate::core::geometry::{Point as CorePoint, Rect as CoreRect, Size as CoreSize};
use crate::core::space::RemoveReason;
use crate::core::window::x11::X11State;
use crate::core::window::{Window as CoreWindow, WindowKind};

impl XWaylandShellHandler for State {
    fn xwayland_shell_state(&mut self) -> &mut XWaylandShellState {
        &mut self.xwayland_shell_state
    }
}
smithay::delegate_xwayland_shell!(State);

impl XwmHandler for State {
    fn xwm_state(&mut self, _xwm: XwmId) -> &mut X11Wm {
        self.xwm.as_mut().expect("XwmHandler is only invoked once Xwayland has started")
    }

    /// Nothing to track here: override-redirect windows never go through
    /// `core::Space` at all, since they don't participate in stacking,
    /// rules, or focus.
    fn new_window(&mut self, _xwm: XwmId, window: X11Surface) {
        tracing::debug!(xid = window.window_id(), "new X11 window");
    }

    fn new_override_redirect_window(&mut self, _xwm: XwmId, window: X11Surface) {
        tracing::debug!(xid = window.window_id(), "new override-redirect X11 window");
    }

    fn map_window_request(&mut self, _xwm: XwmId, window: X11Surface) {
        let geometry = window.geometry();
        let id = self.space.allocate_id();
        let mut x11_state = X11State::new(window.window_id());
        x11_state.pid = window.pid();
        x11_state.override_redirect = window.is_override_redirect();
        x11_state.supports_delete = true;

        let frame = CoreRect::new(
            CorePoint::new(geometry.loc.x, geometry.loc.y),
            CoreSize::new(geometry.size.w, geometry.size.h),
        );
        let core_window = CoreWindow::new(id, WindowKind::X11Managed(x11_state), frame);
        self.space.adopt(core_window);
        self.registry.insert(id, Handle::X11(window.clone()));

        if let Err(err) = window.set_mapped(true) {
            tracing::warn!(?err, xid = window.window_id(), "failed to map X11 window");
        }
        self.space.activate(id, true);
    }

    fn mapped_override_redirect_window(&mut self, _xwm: XwmId, window: X11Surface) {
        tracing::debug!(xid = window.window_id(), "override-redirect X11 window mapped");
    }

    fn unmapped_window(&mut self, _xwm: XwmId, window: X11Surface) {
        let Some(id) = self.registry.id_for_x11_xid(window.window_id()) else { return };
        if let Some(core_window) = self.space.get_mut(id) {
            core_window.set_minimized(true);
        }
    }

    fn destroyed_window(&mut self, _xwm: XwmId, window: X11Surface) {
        let Some(id) = self.registry.id_for_x11_xid(window.window_id()) else { return };
        self.registry.remove(id);
        self.space.remove(id, RemoveReason::Destroy, false);
    }

    /// Per-geometry-sync: X11 clients propose their own
    /// geometry on `ConfigureRequest`, unlike Wayland's server-driven
    /// `xdg_toplevel.configure`. `core::geometry_sync` still owns whether
    /// the proposal is honored; this just feeds it through.
    fn configure_request(
        &mut self,
        _xwm: XwmId,
        window: X11Surface,
        x: Option<i32>,
        y: Option<i32>,
        w: Option<u32>,
        h: Option<u32>,
        _reorder: Option<Reorder>,
    ) {
        let current = window.geometry();
        let geo = Rectangle::new(
            (x.unwrap_or(current.loc.x), y.unwrap_or(current.loc.y)).into(),
            (w.map(|w| w as i32).unwrap_or(current.size.w), h.map(|h| h as i32).unwrap_or(current.size.h)).into(),
        );
        if let Err(err) = window.configure(geo) {
            tracing::warn!(?err, xid = window.window_id(), "failed to honor X11 configure request");
        }
    }

    fn configure_notify(
        &mut self,
        _xwm: XwmId,
        window: X11Surface,
        geometry: Rectangle<i32, Logical>,
        _above: Option<smithay::xwayland::xwm::X11Window>,
    ) {
        let Some(id) = self.registry.id_for_x11_xid(window.window_id()) else { return };
        let Some(core_window) = self.space.get_mut(id) else { return };
        core_window.set_frame_geometry(CoreRect::new(
            CorePoint::new(geometry.loc.x, geometry.loc.y),
            CoreSize::new(geometry.size.w, geometry.size.h),
        ));
    }

    /// Interactive move/resize grabs are `core::input_router`'s job once a
    /// grab target is wired up; until then these requests are acknowledged
    /// but not acted on.
    fn move_request(&mut self, _xwm: XwmId, window: X11Surface, _button: u32) {
        tracing::debug!(xid = window.window_id(), "X11 interactive move request (not yet wired)");
    }

    fn resize_request(&mut self, _xwm: XwmId, window: X11Surface, _button: u32, _resize_edge: ResizeEdge) {
        tracing::debug!(xid = window.window_id(), "X11 interactive resize request (not yet wired)");
    }
}

#[cfg(test)]
mod tests {
    // `XwmHandler` needs a live Xwayland connection to construct an
    // `X11Surface`; the `core::Space` bookkeeping each callback performs is
    // covered by `core::space`'s own test module instead.
}
