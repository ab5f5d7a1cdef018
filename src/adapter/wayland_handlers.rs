//! `smithay` protocol handlers for the subset of lifecycle/geometry events
//! that `core::Space` needs to know about, grounded on `handlers/mod.rs`'s
//! `CompositorHandler`/`handle_commit` and `handlers/xdg.rs`'s
//! `XdgShellHandler`. Everything here stays a thin bridge: the policy
//! (where the window lands, whether activation is allowed, what layer it
//! sits in) lives in `core`, this file only translates the wire event into
//! the matching `core` call and back.

use smithay::backend::renderer::utils::on_commit_buffer_handler;
use smithay::delegate_compositor;
use smithay::delegate_xdg_shell;
use smithay::desktop::Window as SmithayWindow;
use smithay::reexports::wayland_server::protocol::wl_surface::WlSurface;
use smithay::reexports::wayland_server::Client;
use smithay::utils::Serial;
use smithay::wayland::compositor::{
    is_sync_subsurface, with_states, CompositorClientState, CompositorHandler, CompositorState,
    SurfaceAttributes,
};
use smithay::wayland::seat::WaylandFocus;
use smithay::wayland::shell::xdg::{ToplevelSurface, XdgShellHandler, XdgShellState};

use crate::adapter::registry::{Handle, WindowRegistry};
use crate::adapter::state::{ClientState, State};
use crate::core::geometry::{Point as CorePoint, Rect as CoreRect, Size as CoreSize};
use crate::core::window::{Window as CoreWindow, WindowKind};
use crate::core::window::{WaylandState, WaylandSurfaceKind};

impl CompositorHandler for State {
    fn compositor_state(&mut self) -> &mut CompositorState {
        &mut self.compositor_state
    }

    fn client_compositor_state<'a>(&self, client: &'a Client) -> &'a CompositorClientState {
        client
            .get_data::<ClientState>()
            .map(|state| &state.compositor_state)
            .expect("every client here was inserted with adapter::state::ClientState")
    }

    fn commit(&mut self, surface: &WlSurface) {
        on_commit_buffer_handler::<Self>(surface);

        if is_sync_subsurface(surface) {
            return;
        }

        let Some(id) = self.registry.id_for_surface(surface) else { return };
        let buffer_size = with_states(surface, |states| {
            states
                .cached_state
                .get::<SurfaceAttributes>()
                .current()
                .buffer_size()
        });
        let Some(buffer_size) = buffer_size else { return };

        if let Some(window) = self.space.get_mut(id) {
            self.geometry_sync_accept(window, buffer_size);
        }
    }
}
delegate_compositor!(State);

impl State {
    fn geometry_sync_accept(&mut self, window: &mut CoreWindow, buffer_size: smithay::utils::Size<i32, smithay::utils::Logical>) {
        self.space.geometry_sync.accept_buffer_size(window, CoreSize::new(buffer_size.w, buffer_size.h));
    }
}

impl XdgShellHandler for State {
    fn xdg_shell_state(&mut self) -> &mut XdgShellState {
        &mut self.xdg_shell_state
    }

    fn new_toplevel(&mut self, surface: ToplevelSurface) {
        let smithay_window = SmithayWindow::new_wayland_window(surface);
        let id = self.space.allocate_id();
        let frame = CoreRect::new(CorePoint::new(0, 0), CoreSize::new(0, 0));
        let core_window = CoreWindow::new(
            id,
            WindowKind::WaylandNative(WaylandState::new(WaylandSurfaceKind::Toplevel)),
            frame,
        );
        self.space.adopt(core_window);
        self.registry.insert(id, Handle::Wayland(smithay_window));
        self.space.activate(id, true);
    }

    fn toplevel_destroyed(&mut self, surface: ToplevelSurface) {
        let Some(wl_surface) = surface.wl_surface().map(|s| s.clone()) else { return };
        let Some(id) = self.registry.id_for_surface(&wl_surface) else { return };
        self.registry.remove(id);
        self.space.remove(id, crate::core::space::RemoveReason::Destroy, false);
    }

    fn fullscreen_request(
        &mut self,
        surface: ToplevelSurface,
        _output: Option<smithay::reexports::wayland_server::protocol::wl_output::WlOutput>,
    ) {
        let Some(wl_surface) = surface.wl_surface().map(|s| s.clone()) else { return };
        let Some(id) = self.registry.id_for_surface(&wl_surface) else { return };
        self.toggle_fullscreen_to(id, true);
    }

    fn unfullscreen_request(&mut self, surface: ToplevelSurface) {
        let Some(wl_surface) = surface.wl_surface().map(|s| s.clone()) else { return };
        let Some(id) = self.registry.id_for_surface(&wl_surface) else { return };
        self.toggle_fullscreen_to(id, false);
    }

    fn grab(&mut self, _surface: smithay::wayland::shell::xdg::PopupSurface, _seat: smithay::reexports::wayland_server::protocol::wl_seat::WlSeat, _serial: Serial) {
    }
}
delegate_xdg_shell!(State);

impl State {
    fn toggle_fullscreen_to(&mut self, id: crate::core::ids::WindowId, fullscreen: bool) {
        if let Some(window) = self.space.get_mut(id) {
            window.set_fullscreen(fullscreen);
        }
        self.send_configure_for(id);
    }

    fn send_configure_for(&mut self, id: crate::core::ids::WindowId) {
        if let Some(handle) = self.registry.get(id).and_then(Handle::as_smithay_window) {
            if let Some(toplevel) = handle.toplevel() {
                toplevel.send_configure();
            }
        }
    }
}
