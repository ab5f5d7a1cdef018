//! Device events in, `core::input_router` events out.
//! Pointer and keyboard wire delivery (`ptr.motion`/`keyboard.input`) stays
//! ordinary protocol plumbing; what changes is shortcut matching and focus
//! routing, which go through `core::global_shortcuts` and
//! `core::input_router` instead of direct window lookups.

use smithay::backend::input::{
    Axis, ButtonState, Event, InputBackend, InputEvent as BackendInputEvent, KeyState,
    KeyboardKeyEvent, PointerAxisEvent, PointerButtonEvent, PointerMotionEvent,
};
use smithay::input::keyboard::FilterResult;
use smithay::utils::SERIAL_COUNTER;

use crate::adapter::config::WmAction;
use crate::adapter::state::State;
use crate::core::input_router::InputEvent as CoreInputEvent;
use crate::core::xkb_keyboard::ModMask;

/// Mirrors a `smithay` `ModifiersState` into the core's own `ModMask`, the
/// seam `adapter::config::parse_keybind` targets too.
fn core_mods(mods: &smithay::input::keyboard::ModifiersState) -> ModMask {
    let mut mask = ModMask::NONE;
    if mods.shift {
        mask = mask.union(ModMask::SHIFT);
    }
    if mods.ctrl {
        mask = mask.union(ModMask::CTRL);
    }
    if mods.alt {
        mask = mask.union(ModMask::ALT);
    }
    if mods.logo {
        mask = mask.union(ModMask::LOGO);
    }
    if mods.caps_lock {
        mask = mask.union(ModMask::CAPS_LOCK);
    }
    if mods.num_lock {
        mask = mask.union(ModMask::NUM_LOCK);
    }
    mask
}

impl State {
    pub fn process_input_event<I: InputBackend>(&mut self, event: BackendInputEvent<I>) {
        match event {
            BackendInputEvent::Keyboard { event } => self.handle_keyboard_event::<I>(event),
            BackendInputEvent::PointerMotionAbsolute { event } => {
                self.input_router.route(CoreInputEvent::MotionAbsolute { x: 0.0, y: 0.0 });
                let _ = event;
            }
            BackendInputEvent::PointerMotion { event } => {
                self.input_router
                    .route(CoreInputEvent::Motion { dx: event.delta_x(), dy: event.delta_y() });
            }
            BackendInputEvent::PointerButton { event, .. } => {
                let pressed = event.state() == ButtonState::Pressed;
                self.input_router.route(CoreInputEvent::Button { code: event.button_code(), pressed });
                if pressed {
                    if let Some(action) = self
                        .global_shortcuts
                        .process_pointer_pressed(self.keyboard_state.effective_mods(), event.button_code())
                    {
                        self.execute_action(action);
                    }
                }
            }
            BackendInputEvent::PointerAxis { event } => {
                let horizontal = event.amount(Axis::Horizontal).unwrap_or(0.0);
                let vertical = event.amount(Axis::Vertical).unwrap_or(0.0);
                self.input_router.route(CoreInputEvent::Axis { horizontal, vertical });
            }
            _ => {}
        }
    }

    fn handle_keyboard_event<I: InputBackend>(&mut self, event: I::KeyboardKeyEvent) {
        let press_state = event.state();
        let action = self.seat.get_keyboard().unwrap().input::<WmAction, _>(
            self,
            event.key_code(),
            press_state,
            SERIAL_COUNTER.next_serial(),
            0,
            |state, modifiers, handle| {
                let mods = core_mods(modifiers);
                let pressed = press_state == KeyState::Pressed;
                let keysym = handle.modified_sym().raw();
                state.input_router.route(CoreInputEvent::Key { code: keysym, pressed });

                if let Some(action) =
                    state.global_shortcuts.notify_modifiers_changed(mods.without_locks())
                {
                    return FilterResult::Intercept(action);
                }
                if !pressed {
                    return FilterResult::Forward;
                }
                if let Some(action) = state.global_shortcuts.process_key(mods, keysym) {
                    return FilterResult::Intercept(action);
                }
                FilterResult::Forward
            },
        );
        if let Some(action) = action {
            self.execute_action(action);
        }
    }

    fn execute_action(&mut self, action: WmAction) {
        match action {
            WmAction::Exit => self.loop_signal.stop(),
            WmAction::ReloadConfig => {
                if let Ok(config) = crate::adapter::config::Config::load() {
                    self.global_shortcuts = config.build_global_shortcuts();
                    self.config = config;
                }
            }
            WmAction::Exec { command } => {
                tracing::debug!("spawning {command:?}");
                let _ = std::process::Command::new("/bin/sh").arg("-c").arg(&command).spawn();
            }
            WmAction::KillActive => {
                if let Some(id) = self.space.active_window() {
                    self.kill_window(id);
                }
            }
            WmAction::CloseActive => {
                if let Some(id) = self.space.active_window() {
                    self.close_window(id);
                }
            }
            WmAction::ToggleFullscreen => {
                if let Some(id) = self.space.active_window() {
                    self.toggle_fullscreen(id);
                }
            }
            WmAction::ToggleMaximize => {
                if let Some(id) = self.space.active_window() {
                    self.toggle_maximize(id);
                }
            }
            WmAction::QuickTile { edge } => {
                if let Some(id) = self.space.active_window() {
                    self.quick_tile_active(id, edge);
                }
            }
            WmAction::SwitchWindow { direction } => self.switch_window_action(direction),
            WmAction::Desktop { index } => self.space.set_current_desktop(index),
            WmAction::MoveToDesktop { index } => {
                if let Some(id) = self.space.active_window() {
                    if let Some(window) = self.space.get_mut(id) {
                        window.common.desktop = crate::core::window::Desktop::Numbered(index);
                    }
                }
            }
        }
    }
}
