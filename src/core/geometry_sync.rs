//! Frame↔client geometry synchronisation.
//!
//! Reconciles compositor-driven geometry changes with the client's
//! ack-configure round trip (Wayland) or sync-counter alarm (X11). Owns no
//! clock itself: callers pass `now` and a `TimerWheel` they drive from the
//! real event loop, so the coalescing/watchdog logic here is deterministic
//! and unit-testable.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::geometry::{Point, Rect};
use crate::core::ids::WindowId;
use crate::core::timer_wheel::{TimerId, TimerWheel};
use crate::core::window::{PendingConfigure, Window, WindowKind};

const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(1);
const RETARDER_COALESCE_WINDOW: Duration = Duration::from_millis(16);

/// What protocol `window` is speaking, and what it supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    X11 { has_sync_counter: bool },
    Wayland,
    Internal,
}

/// Result of a `set_frame_geometry` call, for the adapter layer to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Geometry already matched; nothing to do.
    NoChange,
    /// Applied immediately, no client round trip needed (move-only, or an
    /// internal window): no configure serial / sync alarm is sent.
    AppliedImmediately,
    /// A pending configure was queued with this serial.
    Queued { serial: u64 },
    /// Coalesced into the sync-less-resize retarder; no wire message was
    /// sent yet, it will fire within `RETARDER_COALESCE_WINDOW`.
    Coalesced,
    /// A position rule forced the geometry; the request was dropped and a
    /// synthetic configure-notify with the *current* geometry should be
    /// sent back to the client.
    DroppedByStrictGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("window is not tracked by geometry_sync")]
    NotTracked,
}

#[derive(Debug, Default)]
struct WindowSync {
    has_completed_first_sync: bool,
    watchdog: Option<TimerId>,
    retarder: Option<TimerId>,
    coalesced_target: Option<Rect>,
    /// X11-only "sync suppressor": set while a sync counter alarm is
    /// programmed and not yet confirmed. Kept distinct from the watchdog
    /// timer so a slow-but-still-responding client isn't killed early.
    sync_suppressor: bool,
    next_serial: u64,
}

#[derive(Debug, Default)]
pub struct GeometrySync {
    windows: HashMap<WindowId, WindowSync>,
}

impl GeometrySync {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, window: WindowId) -> &mut WindowSync {
        self.windows.entry(window).or_default()
    }

    pub fn set_frame_geometry(
        &mut self,
        window: &mut Window,
        requested: Rect,
        protocol: Protocol,
        now: Instant,
        wheel: &mut TimerWheel,
        strict_geometry: bool,
        interactive_resize_anchor: Option<Point>,
    ) -> Outcome {
        let requested = clamp_to_hints(window, requested);

        if strict_geometry {
            return Outcome::DroppedByStrictGeometry;
        }

        let state = self.windows.entry(window.id).or_default();

        if requested == window.common.frame_geometry && state.has_completed_first_sync {
            return Outcome::NoChange;
        }

        let size_unchanged = requested.size == window.common.frame_geometry.size;
        let no_pending_size_change = window
            .common
            .pending_configures
            .back()
            .map(|p| p.frame_geometry.size == window.common.frame_geometry.size)
            .unwrap_or(true);

        if size_unchanged && no_pending_size_change {
            window.common.frame_geometry = requested;
            for pending in window.common.pending_configures.iter_mut() {
                pending.frame_geometry.loc = requested.loc;
            }
            state.has_completed_first_sync = true;
            return Outcome::AppliedImmediately;
        }

        if let Protocol::X11 { has_sync_counter: false } = protocol {
            let anchored = interactive_resize_anchor
                .map(|anchor| pin_anchor(window.common.frame_geometry, requested, anchor))
                .unwrap_or(requested);
            state.coalesced_target = Some(anchored);
            if state.retarder.is_none() {
                state.retarder = Some(wheel.schedule_at(now, RETARDER_COALESCE_WINDOW));
            }
            return Outcome::Coalesced;
        }

        self.push_pending_configure(window, requested, protocol, now, wheel, interactive_resize_anchor)
    }

    fn push_pending_configure(
        &mut self,
        window: &mut Window,
        requested: Rect,
        protocol: Protocol,
        now: Instant,
        wheel: &mut TimerWheel,
        interactive_resize_anchor: Option<Point>,
    ) -> Outcome {
        let state = self.windows.entry(window.id).or_default();
        let serial = state.next_serial;
        state.next_serial += 1;

        let frame_geometry = interactive_resize_anchor
            .map(|anchor| pin_anchor(window.common.frame_geometry, requested, anchor))
            .unwrap_or(requested);
        let client_geometry = frame_geometry;

        window.common.pending_configures.push_back(PendingConfigure {
            serial,
            frame_geometry,
            client_geometry,
            max_mode: window.common.max_mode,
            fullscreen: window.common.fullscreen,
        });

        if let Protocol::X11 { has_sync_counter: true } = protocol {
            state.sync_suppressor = true;
        }

        if state.watchdog.is_none() && !state.has_completed_first_sync {
            state.watchdog = Some(wheel.schedule_at(now, WATCHDOG_TIMEOUT));
        }

        Outcome::Queued { serial }
    }

    /// Wayland `handle_configure_ack`: pops every entry with
    /// `serial' <= serial`, commits the last popped as canonical.
    pub fn handle_configure_ack(&mut self, window: &mut Window, serial: u64) {
        self.commit_up_to(window, serial);
    }

    /// X11 sync-alarm confirmation carrying the counter value, which this
    /// implementation keys by the same serial space as Wayland acks.
    pub fn handle_x11_sync_alarm(&mut self, window: &mut Window, serial: u64) {
        if let Some(state) = self.windows.get_mut(&window.id) {
            state.sync_suppressor = false;
        }
        self.commit_up_to(window, serial);
    }

    fn commit_up_to(&mut self, window: &mut Window, serial: u64) {
        let mut last = None;
        while let Some(front) = window.common.pending_configures.front() {
            if front.serial > serial {
                break;
            }
            last = window.common.pending_configures.pop_front();
        }
        if let Some(applied) = last {
            window.common.frame_geometry = applied.frame_geometry;
            window.common.client_geometry = applied.client_geometry;
            window.common.max_mode = applied.max_mode;
            window.common.fullscreen = applied.fullscreen;
        }
        if let Some(state) = self.windows.get_mut(&window.id) {
            state.has_completed_first_sync = true;
            state.watchdog = None;
        }
    }

    /// Accepts a client-attached buffer whose size differs from the
    /// configured size, rewriting the frame to match.
    pub fn accept_buffer_size(&mut self, window: &mut Window, buffer_size: crate::core::geometry::Size) {
        if buffer_size != window.common.client_geometry.size {
            window.common.client_geometry.size = buffer_size;
            window.common.frame_geometry.size = buffer_size;
        }
    }

    /// Called by the adapter's event loop when `timer_id` has fired.
    /// Returns the geometry to apply immediately, if this was a watchdog
    /// (force ready-for-painting) or a retarder (flush the coalesced
    /// resize) firing for `window`.
    pub fn on_timer_fired(
        &mut self,
        window: &mut Window,
        timer_id: TimerId,
        protocol: Protocol,
        now: Instant,
        wheel: &mut TimerWheel,
    ) -> Option<Outcome> {
        let is_watchdog = self.windows.get(&window.id).and_then(|s| s.watchdog) == Some(timer_id);
        let is_retarder = self.windows.get(&window.id).and_then(|s| s.retarder) == Some(timer_id);

        if is_watchdog {
            let state = self.windows.get_mut(&window.id)?;
            state.watchdog = None;
            if let Some(first) = window.common.pending_configures.front().cloned() {
                window.common.frame_geometry = first.frame_geometry;
                window.common.client_geometry = first.client_geometry;
            }
            let state = self.windows.get_mut(&window.id)?;
            state.has_completed_first_sync = true;
            return Some(Outcome::AppliedImmediately);
        }

        if is_retarder {
            let state = self.windows.get_mut(&window.id)?;
            state.retarder = None;
            let target = state.coalesced_target.take()?;
            return Some(self.push_pending_configure(window, target, protocol, now, wheel, None));
        }

        None
    }

    pub fn is_tracked(&self, window: WindowId) -> bool {
        self.windows.contains_key(&window)
    }

    pub fn forget(&mut self, window: WindowId) {
        self.windows.remove(&window);
    }
}

fn clamp_to_hints(window: &Window, requested: Rect) -> Rect {
    if let WindowKind::X11Managed(state) = &window.kind {
        let (w, h) = state.size_hints.clamp(requested.size.w, requested.size.h);
        Rect::new(requested.loc, crate::core::geometry::Size::new(w, h))
    } else {
        requested
    }
}

/// Keeps the anchor corner (opposite the drag grip) pinned during
/// interactive resize: the configure size is a maximum, the client may
/// attach smaller, but the anchor corner's absolute position never moves.
fn pin_anchor(current: Rect, requested: Rect, anchor: Point) -> Rect {
    let anchor_is_right = anchor.x == current.right();
    let anchor_is_bottom = anchor.y == current.bottom();
    let x = if anchor_is_right {
        anchor.x - requested.size.w
    } else {
        requested.loc.x
    };
    let y = if anchor_is_bottom {
        anchor.y - requested.size.h
    } else {
        requested.loc.y
    };
    Rect::new(Point::new(x, y), requested.size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Size;
    use crate::core::window::{Window, WindowKind};
    use pretty_assertions::assert_eq;

    fn rect(x: i32, y: i32, w: i32, h: i32) -> Rect {
        Rect::new(Point::new(x, y), Size::new(w, h))
    }

    fn wayland_window(id: u64, geo: Rect) -> Window {
        Window::new(
            WindowId::for_test(id),
            WindowKind::WaylandNative(crate::core::window::WaylandState::new(
                crate::core::window::WaylandSurfaceKind::Toplevel,
            )),
            geo,
        )
    }

    #[test]
    fn move_only_is_immediate_and_rewrites_pending_positions() {
        let mut sync = GeometrySync::new();
        let mut wheel = TimerWheel::new();
        let mut win = wayland_window(1, rect(0, 0, 100, 100));
        let now = Instant::now();

        let outcome = sync.set_frame_geometry(
            &mut win,
            rect(50, 50, 100, 100),
            Protocol::Wayland,
            now,
            &mut wheel,
            false,
            None,
        );
        assert_eq!(outcome, Outcome::AppliedImmediately);
        assert_eq!(win.common.frame_geometry, rect(50, 50, 100, 100));
    }

    #[test]
    fn resize_queues_a_pending_configure_and_ack_commits_it() {
        let mut sync = GeometrySync::new();
        let mut wheel = TimerWheel::new();
        let mut win = wayland_window(1, rect(0, 0, 100, 100));
        let now = Instant::now();

        let outcome = sync.set_frame_geometry(
            &mut win,
            rect(0, 0, 200, 150),
            Protocol::Wayland,
            now,
            &mut wheel,
            false,
            None,
        );
        assert!(matches!(outcome, Outcome::Queued { serial: 0 }));
        assert_eq!(win.common.frame_geometry, rect(0, 0, 100, 100));

        sync.handle_configure_ack(&mut win, 0);
        assert_eq!(win.common.frame_geometry, rect(0, 0, 200, 150));
    }

    #[test]
    fn strict_geometry_rule_drops_the_request() {
        let mut sync = GeometrySync::new();
        let mut wheel = TimerWheel::new();
        let mut win = wayland_window(1, rect(0, 0, 100, 100));
        let outcome = sync.set_frame_geometry(
            &mut win,
            rect(10, 10, 200, 200),
            Protocol::Wayland,
            Instant::now(),
            &mut wheel,
            true,
            None,
        );
        assert_eq!(outcome, Outcome::DroppedByStrictGeometry);
        assert_eq!(win.common.frame_geometry, rect(0, 0, 100, 100));
    }

    #[test]
    fn watchdog_force_applies_unacked_first_configure_after_one_second() {
        let mut sync = GeometrySync::new();
        let mut wheel = TimerWheel::new();
        let mut win = wayland_window(1, rect(0, 0, 100, 100));
        let now = Instant::now();

        sync.set_frame_geometry(&mut win, rect(0, 0, 300, 300), Protocol::Wayland, now, &mut wheel, false, None);
        let later = now + Duration::from_millis(1001);
        let fired = wheel.expired(later);
        assert_eq!(fired.len(), 1);
        let outcome = sync.on_timer_fired(&mut win, fired[0], Protocol::Wayland, later, &mut wheel);
        assert_eq!(outcome, Some(Outcome::AppliedImmediately));
        assert_eq!(win.common.frame_geometry, rect(0, 0, 300, 300));
    }

    #[test]
    fn sync_less_x11_resize_coalesces_into_one_configure_per_16ms() {
        let mut sync = GeometrySync::new();
        let mut wheel = TimerWheel::new();
        let mut win = Window::new(
            WindowId::for_test(2),
            WindowKind::X11Managed(crate::core::window::X11State::new(100)),
            rect(0, 0, 100, 100),
        );
        let proto = Protocol::X11 { has_sync_counter: false };
        let t0 = Instant::now();

        for step in 1..=4 {
            let now = t0 + Duration::from_millis(step * 4);
            let outcome = sync.set_frame_geometry(
                &mut win,
                rect(0, 0, 100 + (step as i32) * 100, 100),
                proto,
                now,
                &mut wheel,
                false,
                None,
            );
            assert_eq!(outcome, Outcome::Coalesced);
        }

        let fired = wheel.expired(t0 + Duration::from_millis(21));
        assert_eq!(fired.len(), 1);
        let outcome = sync.on_timer_fired(&mut win, fired[0], proto, t0 + Duration::from_millis(21), &mut wheel);
        assert!(matches!(outcome, Some(Outcome::Queued { .. })));
        assert_eq!(win.common.pending_configures.back().unwrap().frame_geometry.size.w, 500);
    }
}
