//! The orchestrator: owns the windows, stacking order,
//! focus chain, rules engine, and session state, and wires them together.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::activation::{self, ActivationRequest, ActiveWindowInfo};
use crate::core::events::{ActiveChanged, EventHub, WindowAdded, WindowRemoved};
use crate::core::focus_chain::{FocusChain, Reason};
use crate::core::geometry::{Edges, Point, Rect};
use crate::core::geometry_sync::GeometrySync;
use crate::core::ids::{WindowId, WindowIdAllocator};
use crate::core::output_set::{Output, OutputSet};
use crate::core::rules_engine::{PropertyKey, RulesEngine, WindowMatchInfo};
use crate::core::session::SessionStore;
use crate::core::stacking_order::StackingOrder;
use crate::core::transient_graph::TransientGraph;
use crate::core::window::{MaxMode, QuickTileMode, Window};

const QUICK_TILE_COMBINE_WINDOW: Duration = Duration::from_millis(400);

/// `space.client_area(kind, ...)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    Placement,
    Movement,
    Maximize,
    MaximizeFull,
    Fullscreen,
    WorkArea,
    FullArea,
    ScreenArea,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveReason {
    Release,
    Destroy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

struct PendingQuickTile {
    window: WindowId,
    mode: QuickTileMode,
    at: Instant,
}

pub struct Space {
    windows: HashMap<WindowId, Window>,
    id_alloc: WindowIdAllocator,
    pub stacking: StackingOrder,
    pub transients: TransientGraph,
    pub rules: RulesEngine,
    pub focus_chain: FocusChain,
    pub geometry_sync: GeometrySync,
    pub outputs: OutputSet,
    pub sessions: SessionStore,
    pub events: EventHub,
    active_window: Option<WindowId>,
    current_desktop: u32,
    pending_quick_tile: Option<PendingQuickTile>,
    startup_grace_period: bool,
}

impl Default for Space {
    fn default() -> Self {
        Self {
            windows: HashMap::new(),
            id_alloc: WindowIdAllocator::new(),
            stacking: StackingOrder::new(),
            transients: TransientGraph::new(),
            rules: RulesEngine::new(),
            focus_chain: FocusChain::new(),
            geometry_sync: GeometrySync::new(),
            outputs: OutputSet::new(),
            sessions: SessionStore::new(),
            events: EventHub::new(),
            active_window: None,
            current_desktop: 1,
            pending_quick_tile: None,
            startup_grace_period: true,
        }
    }
}

impl Space {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn end_startup_grace_period(&mut self) {
        self.startup_grace_period = false;
    }

    pub fn allocate_id(&self) -> WindowId {
        self.id_alloc.alloc()
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        self.windows.get_mut(&id)
    }

    pub fn active_window(&self) -> Option<WindowId> {
        self.active_window
    }

    pub fn current_desktop(&self) -> u32 {
        self.current_desktop
    }

    pub fn set_current_desktop(&mut self, desktop: u32) {
        self.current_desktop = desktop;
    }

    /// `adopt(window)`: registers a window built by the adapter after
    /// rules+placement were applied.
    pub fn adopt(&mut self, window: Window) -> WindowId {
        let id = window.id;
        let layer = window.common.layer;
        self.windows.insert(id, window);
        self.stacking.insert(id, layer);
        self.events.window_added.emit(&WindowAdded { window: id });
        id
    }

    /// `remove(window)`: unmanages a window. `create_remnant` mirrors the
    /// adapter's "do effects want to paint a close animation" decision.
    pub fn remove(&mut self, id: WindowId, _reason: RemoveReason, create_remnant: bool) {
        let Some(mut window) = self.windows.remove(&id) else { return };

        self.stacking.remove(id);
        self.focus_chain.remove(id);
        self.transients.detach(id);
        self.geometry_sync.forget(id);
        if self.active_window == Some(id) {
            self.active_window = None;
        }
        self.events.window_removed.emit(&WindowRemoved { window: id });

        if create_remnant {
            window.common.control = None;
            window.kind = crate::core::window::WindowKind::Remnant(
                crate::core::window::RemnantState::new(Vec::new()),
            );
            self.windows.insert(id, window);
        }
    }

    fn match_info(&self, id: WindowId) -> WindowMatchInfo {
        let window = self.windows.get(&id);
        WindowMatchInfo {
            wm_class: window.map(|w| w.common.app_id.clone()).unwrap_or_default(),
            title: window.map(|w| w.common.title.clone()).unwrap_or_default(),
            ..Default::default()
        }
    }

    /// `activate(window, force)`.
    pub fn activate(&mut self, id: WindowId, force: bool) -> bool {
        let Some(window) = self.windows.get(&id) else { return false };
        let is_descendant = self
            .active_window
            .map(|active| self.transients.parent_of(id) == Some(active))
            .unwrap_or(false);

        let request = ActivationRequest {
            user_time: window.common.user_time,
            is_transient_descendant_of_active: is_descendant,
            focus_in: false,
        };
        let active_info = self.active_window.and_then(|a| self.windows.get(&a)).map(|w| ActiveWindowInfo {
            user_time: w.common.user_time,
        });
        let level = window
            .common
            .control
            .as_ref()
            .and_then(|c| c.focus_stealing_level)
            .map(level_from_u8)
            .unwrap_or(activation::Level::Normal);

        let allowed = force || activation::allow_activation(level, request, active_info, self.startup_grace_period);

        if !allowed {
            if let Some(window) = self.windows.get_mut(&id) {
                window.common.demands_attention = true;
            }
            return false;
        }

        let previous = self.active_window;
        self.active_window = Some(id);
        if force {
            self.stacking.raise(id);
        }
        self.focus_chain.update(self.current_desktop, id, Reason::MakeFirst);
        self.events.active_changed.emit(&ActiveChanged { previous, current: Some(id) });
        true
    }

    /// `client_area(kind, screen, desktop)`: a work-area
    /// style rect, accounting for struts reserved by dock windows.
    pub fn client_area(&self, kind: AreaKind, output: &Output, _desktop: u32) -> Rect {
        let geometry = output.geometry();
        match kind {
            AreaKind::FullArea | AreaKind::ScreenArea | AreaKind::Fullscreen => geometry,
            AreaKind::Placement | AreaKind::Movement | AreaKind::Maximize | AreaKind::WorkArea => {
                geometry.shrunk(self.total_struts(output))
            }
            AreaKind::MaximizeFull => geometry,
        }
    }

    fn total_struts(&self, output: &Output) -> Edges {
        let mut total = Edges::ZERO;
        for window in self.windows.values() {
            if let crate::core::window::WindowKind::X11Managed(state) = &window.kind {
                if let Some(strut) = state.strut {
                    if window.common.frame_geometry.intersection(output.geometry()).is_some() {
                        total = Edges {
                            left: total.left.max(strut.left),
                            top: total.top.max(strut.top),
                            right: total.right.max(strut.right),
                            bottom: total.bottom.max(strut.bottom),
                        };
                    }
                }
            }
        }
        total
    }

    /// `maximize(window, mode)`: resizes into the output's maximize area on
    /// the requested axes, saving `restore_geometry` on the way in and
    /// restoring it on the way back to `MaxMode::Restore`.
    pub fn maximize(&mut self, id: WindowId, mode: MaxMode, output: &Output) {
        let desktop = self.current_desktop;
        let area_kind = if matches!(mode, MaxMode::Full) { AreaKind::MaximizeFull } else { AreaKind::Maximize };
        let area = self.client_area(area_kind, output, desktop);

        let Some(window) = self.windows.get_mut(&id) else { return };
        if !window.common.max_mode.is_maximized() && mode.is_maximized() {
            window.common.restore_geometry = window.common.frame_geometry;
        }

        let current = window.common.frame_geometry;
        let target = match mode {
            MaxMode::Restore => window.common.restore_geometry,
            MaxMode::Vertical => Rect::new(Point::new(current.loc.x, area.loc.y), crate::core::geometry::Size::new(current.size.w, area.size.h)),
            MaxMode::Horizontal => Rect::new(Point::new(area.loc.x, current.loc.y), crate::core::geometry::Size::new(area.size.w, current.size.h)),
            MaxMode::Full => area,
        };
        window.set_frame_geometry(target);
        window.set_max_mode(mode);
    }

    /// `quick_tile(window, mode)`. Combines chained tile
    /// requests within a debounce window unless a rule forces position.
    pub fn quick_tile(&mut self, id: WindowId, mode: QuickTileMode, now: Instant, output: &Output) {
        let info = self.match_info(id);
        let rule_forces_position = self.rules.is_forced(&info, PropertyKey::Position);

        let effective_mode = if rule_forces_position {
            mode
        } else {
            match &self.pending_quick_tile {
                Some(pending)
                    if pending.window == id && now.duration_since(pending.at) <= QUICK_TILE_COMBINE_WINDOW =>
                {
                    pending.mode.union(mode)
                }
                _ => mode,
            }
        };

        self.pending_quick_tile = Some(PendingQuickTile { window: id, mode: effective_mode, at: now });

        let Some(window) = self.windows.get_mut(&id) else { return };
        if window.common.quicktile_mode.is_none() && !effective_mode.is_none() {
            window.common.restore_geometry = window.common.frame_geometry;
        }
        window.common.frame_geometry = if effective_mode.is_none() {
            window.common.restore_geometry
        } else {
            tile_rect(effective_mode, output.geometry())
        };
        window.common.quicktile_mode = effective_mode;
    }

    /// `switch_window(direction)`:
    /// chooses the nearest window in a cardinal direction relative to the
    /// active window's centre, preferring the topmost window among those
    /// occupying overlapping screen regions (so a maximized occluded
    /// window is skipped in favour of the one stacked above it).
    pub fn switch_window(&mut self, direction: Direction) -> Option<WindowId> {
        let active_id = self.active_window?;
        let active = self.windows.get(&active_id)?;
        let active_rect = active.common.frame_geometry;
        let active_center = active_rect.center();

        let mut candidates: Vec<WindowId> = self
            .windows
            .iter()
            .filter(|(&id, w)| id != active_id && w.common.control.is_some() && w.is_shown())
            .filter(|(_, w)| direction_matches(direction, active_rect, w.common.frame_geometry))
            .map(|(&id, _)| id)
            .collect();

        // Dedupe windows whose frames overlap: within an overlapping
        // cluster, only the topmost (highest win_stack index) is a
        // candidate, so a maximized window below another is skipped.
        let snapshot = candidates.clone();
        candidates.retain(|&id| {
            let rect = self.windows[&id].common.frame_geometry;
            !snapshot.iter().any(|&other| {
                other != id
                    && rect.intersection(self.windows[&other].common.frame_geometry).is_some()
                    && stack_rank(&self.stacking, other) > stack_rank(&self.stacking, id)
            })
        });

        candidates.sort_by_key(|&id| {
            let center = self.windows[&id].common.frame_geometry.center();
            distance(direction, active_center, center)
        });

        let chosen = candidates.into_iter().next().or_else(|| {
            // Wrap: pick the farthest window in the opposite direction.
            self.windows
                .iter()
                .filter(|(&id, w)| id != active_id && w.common.control.is_some() && w.is_shown())
                .filter(|(_, w)| direction_matches(opposite(direction), active_rect, w.common.frame_geometry))
                .max_by_key(|(_, w)| distance(opposite(direction), active_center, w.common.frame_geometry.center()))
                .map(|(&id, _)| id)
        });

        if let Some(id) = chosen {
            self.activate(id, true);
        }
        chosen
    }
}

fn level_from_u8(v: u8) -> activation::Level {
    match v {
        0 => activation::Level::None,
        1 => activation::Level::Low,
        3 => activation::Level::High,
        4 => activation::Level::Extreme,
        _ => activation::Level::Normal,
    }
}

fn direction_matches(direction: Direction, from: Rect, candidate: Rect) -> bool {
    let from_c = from.center();
    let cand_c = candidate.center();
    match direction {
        Direction::West => cand_c.x < from_c.x && candidate.top() < from.bottom() && candidate.bottom() > from.top(),
        Direction::East => cand_c.x > from_c.x && candidate.top() < from.bottom() && candidate.bottom() > from.top(),
        Direction::North => cand_c.y < from_c.y && candidate.left() < from.right() && candidate.right() > from.left(),
        Direction::South => cand_c.y > from_c.y && candidate.left() < from.right() && candidate.right() > from.left(),
    }
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::North => Direction::South,
        Direction::South => Direction::North,
        Direction::East => Direction::West,
        Direction::West => Direction::East,
    }
}

fn distance(direction: Direction, from: Point, to: Point) -> i64 {
    let primary = match direction {
        Direction::West | Direction::East => (from.x - to.x).unsigned_abs() as i64,
        Direction::North | Direction::South => (from.y - to.y).unsigned_abs() as i64,
    };
    let secondary = match direction {
        Direction::West | Direction::East => (from.y - to.y).unsigned_abs() as i64,
        Direction::North | Direction::South => (from.x - to.x).unsigned_abs() as i64,
    };
    primary * 1000 + secondary
}

fn stack_rank(stacking: &StackingOrder, window: WindowId) -> usize {
    stacking.win_stack().iter().position(|&w| w == window).unwrap_or(0)
}

/// Maps a combined quick-tile bitmask to a screen region (halves for a
/// single edge, quadrants for two adjacent edges, full area for
/// `MAXIMIZE`).
fn tile_rect(mode: QuickTileMode, area: Rect) -> Rect {
    if mode.contains(QuickTileMode::MAXIMIZE) {
        return area;
    }
    let half_w = area.size.w / 2;
    let half_h = area.size.h / 2;
    let left = mode.contains(QuickTileMode::LEFT);
    let right = mode.contains(QuickTileMode::RIGHT);
    let top = mode.contains(QuickTileMode::TOP);
    let bottom = mode.contains(QuickTileMode::BOTTOM);

    let (x, w) = match (left, right) {
        (true, false) => (area.loc.x, half_w),
        (false, true) => (area.loc.x + half_w, area.size.w - half_w),
        _ => (area.loc.x, area.size.w),
    };
    let (y, h) = match (top, bottom) {
        (true, false) => (area.loc.y, half_h),
        (false, true) => (area.loc.y + half_h, area.size.h - half_h),
        _ => (area.loc.y, area.size.h),
    };
    Rect::new(Point::new(x, y), crate::core::geometry::Size::new(w, h))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Size;
    use crate::core::output_set::{Dpms, Transform};
    use pretty_assertions::{assert_eq, assert_ne};
    use crate::core::window::WindowKind;

    fn output(x: i32, w: i32) -> Output {
        Output {
            id: crate::core::ids::OutputId::for_test(1),
            position: Point::new(x, 0),
            size: Size::new(w, 1024),
            scale: 1.0,
            refresh_rate_mhz: 60_000,
            dpms: Dpms { on: true },
            transform: Transform::Normal,
            enabled: true,
        }
    }

    fn window_at(space: &mut Space, x: i32, y: i32, w: i32, h: i32) -> WindowId {
        let id = space.allocate_id();
        let win = Window::new(id, WindowKind::Internal, Rect::new(Point::new(x, y), Size::new(w, h)));
        space.adopt(win)
    }

    #[test]
    fn scenario_switch_to_window_left_across_screens() {
        let mut space = Space::new();
        let a = window_at(&mut space, 0, 200, 300, 300);
        let b = window_at(&mut space, 500, 200, 300, 300);
        let c = window_at(&mut space, 1380, 200, 300, 300);
        let d = window_at(&mut space, 1580, 200, 300, 300);
        space.activate(d, true);

        assert_eq!(space.switch_window(Direction::West), Some(c));
        assert_eq!(space.switch_window(Direction::West), Some(b));
        assert_eq!(space.switch_window(Direction::West), Some(a));
        assert_eq!(space.switch_window(Direction::West), Some(d));
    }

    #[test]
    fn scenario_maximized_switch_skips_occluded_window() {
        let mut space = Space::new();
        let a = window_at(&mut space, 0, 0, 1280, 1024);
        let b = window_at(&mut space, 0, 0, 1280, 1024);
        let c = window_at(&mut space, 1380, 200, 300, 300);
        let d = window_at(&mut space, 1580, 200, 300, 300);
        space.stacking.raise(b);
        space.stacking.raise(d);
        space.activate(d, true);

        assert_eq!(space.switch_window(Direction::West), Some(c));
        assert_eq!(space.switch_window(Direction::West), Some(b));
        assert_ne!(space.active_window(), Some(a));
        assert_eq!(space.switch_window(Direction::West), Some(d));
    }

    #[test]
    fn quick_tile_combines_chained_requests_within_debounce_window() {
        let mut space = Space::new();
        let w = window_at(&mut space, 100, 100, 200, 200);
        let out = output(0, 1280);
        let t0 = Instant::now();

        space.quick_tile(w, QuickTileMode::TOP, t0, &out);
        space.quick_tile(w, QuickTileMode::LEFT, t0 + Duration::from_millis(50), &out);

        let geo = space.get(w).unwrap().common.frame_geometry;
        assert_eq!(geo, Rect::new(Point::new(0, 0), Size::new(640, 512)));
    }

    #[test]
    fn quick_tile_does_not_combine_after_debounce_expires() {
        let mut space = Space::new();
        let w = window_at(&mut space, 100, 100, 200, 200);
        let out = output(0, 1280);
        let t0 = Instant::now();

        space.quick_tile(w, QuickTileMode::TOP, t0, &out);
        space.quick_tile(w, QuickTileMode::LEFT, t0 + Duration::from_millis(500), &out);

        // The debounce window lapsed, so the second request is not unioned
        // with the first: the window ends up left-tiled only, not a quadrant.
        let geo = space.get(w).unwrap().common.frame_geometry;
        assert_eq!(geo, Rect::new(Point::new(0, 0), Size::new(640, 1024)));
    }

    #[test]
    fn maximize_full_then_restore_round_trips_geometry() {
        let mut space = Space::new();
        let w = window_at(&mut space, 50, 60, 200, 150);
        let out = output(0, 1280);
        let pre_maximize = space.get(w).unwrap().common.frame_geometry;

        space.maximize(w, MaxMode::Full, &out);
        assert_eq!(space.get(w).unwrap().common.frame_geometry, out.geometry());

        space.maximize(w, MaxMode::Restore, &out);
        assert_eq!(space.get(w).unwrap().common.frame_geometry, pre_maximize);
    }

    #[test]
    fn quick_tile_left_then_none_round_trips_geometry() {
        let mut space = Space::new();
        let w = window_at(&mut space, 50, 60, 200, 150);
        let out = output(0, 1280);
        let t0 = Instant::now();
        let pre_tile = space.get(w).unwrap().common.frame_geometry;

        space.quick_tile(w, QuickTileMode::LEFT, t0, &out);
        assert_ne!(space.get(w).unwrap().common.frame_geometry, pre_tile);

        space.quick_tile(w, QuickTileMode::NONE, t0 + Duration::from_millis(50), &out);
        assert_eq!(space.get(w).unwrap().common.frame_geometry, pre_tile);
    }

    #[test]
    fn forced_position_rule_skips_quick_tile_combine_debounce() {
        let mut space = Space::new();
        let w = window_at(&mut space, 100, 100, 200, 200);
        let out = output(0, 1280);
        let t0 = Instant::now();
        space.rules.set_rules(vec![crate::core::rules_engine::Rule {
            matcher: Default::default(),
            overrides: vec![crate::core::rules_engine::PropertyOverride {
                property: PropertyKey::Position,
                policy: crate::core::rules_engine::Policy::Force,
                value: crate::core::rules_engine::PropertyValue::Bool(true),
            }],
        }]);

        space.quick_tile(w, QuickTileMode::TOP, t0, &out);
        // Within the debounce window, but the forced-position rule means
        // this request is never unioned with the pending one.
        space.quick_tile(w, QuickTileMode::LEFT, t0 + Duration::from_millis(50), &out);

        let geo = space.get(w).unwrap().common.frame_geometry;
        assert_eq!(geo, Rect::new(Point::new(0, 0), Size::new(640, 1024)));
    }

    #[test]
    fn remove_with_remnant_keeps_a_readonly_snapshot() {
        let mut space = Space::new();
        let w = window_at(&mut space, 0, 0, 10, 10);
        space.remove(w, RemoveReason::Destroy, true);
        let remnant = space.get(w).unwrap();
        assert!(remnant.is_unmanaged());
        assert!(!space.stacking.pre_stack().contains(&w));
    }

    #[test]
    fn remove_without_remnant_drops_the_window_entirely() {
        let mut space = Space::new();
        let w = window_at(&mut space, 0, 0, 10, 10);
        space.remove(w, RemoveReason::Release, false);
        assert!(space.get(w).is_none());
    }
}
