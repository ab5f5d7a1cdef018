//! Device → spy → filter → target input pipeline.

use crate::core::geometry::{Point, Rect};
use crate::core::ids::WindowId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    Motion { dx: f64, dy: f64 },
    MotionAbsolute { x: f64, y: f64 },
    Button { code: u32, pressed: bool },
    Axis { horizontal: f64, vertical: f64 },
    Key { code: u32, pressed: bool },
    TouchDown { id: i32, x: f64, y: f64 },
    TouchUp { id: i32 },
    TouchMotion { id: i32, x: f64, y: f64 },
    SwipeBegin { fingers: u8 },
    SwipeUpdate { dx: f64, dy: f64 },
    SwipeEnd,
    PinchBegin { fingers: u8 },
    PinchUpdate { scale: f64 },
    PinchEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    Consumed,
    Continue,
}

type Spy = Box<dyn FnMut(&InputEvent)>;
type Filter = Box<dyn FnMut(&InputEvent) -> FilterResult>;

/// Outcome of routing one event through the spy/filter chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    ConsumedByFilter(String),
    ReachedTarget,
}

/// Single-threaded spy/filter/target pipeline. Spies and
/// filters run in insertion order; the first filter to return `Consumed`
/// stops the chain.
#[derive(Default)]
pub struct InputRouter {
    spies: Vec<Spy>,
    filters: Vec<(String, Filter)>,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_spy(&mut self, spy: impl FnMut(&InputEvent) + 'static) {
        self.spies.push(Box::new(spy));
    }

    pub fn add_filter(&mut self, name: impl Into<String>, filter: impl FnMut(&InputEvent) -> FilterResult + 'static) {
        self.filters.push((name.into(), Box::new(filter)));
    }

    /// Routes a single event: every spy observes it, then filters run
    /// until one consumes it or the chain is exhausted.
    pub fn route(&mut self, event: InputEvent) -> RouteOutcome {
        for spy in &mut self.spies {
            spy(&event);
        }
        for (name, filter) in &mut self.filters {
            if filter(&event) == FilterResult::Consumed {
                return RouteOutcome::ConsumedByFilter(name.clone());
            }
        }
        RouteOutcome::ReachedTarget
    }
}

/// What to deliver to surfaces after a pointer-focus change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTransition {
    None,
    EnterOnly(WindowId),
    LeaveOnly(WindowId),
    LeaveThenEnter(WindowId, WindowId),
}

/// Tracks which window currently has pointer focus and computes the
/// leave/enter transition when it changes.
#[derive(Debug, Default)]
pub struct PointerFocusTracker {
    current: Option<WindowId>,
    /// Nested-call-safe recursion counter: an outer `set_target` call
    /// drains positions queued by re-entrant calls triggered from within
    /// its own focus-change notification.
    depth: u32,
    deferred: Vec<Option<WindowId>>,
}

impl PointerFocusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<WindowId> {
        self.current
    }

    /// Computes the transition for moving focus to `target`. If called
    /// re-entrantly (from inside another `set_target`'s caller-side
    /// handling), the request is queued and drained by the outermost call.
    pub fn set_target(&mut self, target: Option<WindowId>) -> Vec<FocusTransition> {
        self.depth += 1;
        if self.depth > 1 {
            self.deferred.push(target);
            self.depth -= 1;
            return Vec::new();
        }

        let mut transitions = Vec::new();
        let mut next = target;
        loop {
            if next != self.current {
                let transition = match (self.current.take(), next) {
                    (None, Some(enter)) => FocusTransition::EnterOnly(enter),
                    (Some(leave), None) => FocusTransition::LeaveOnly(leave),
                    (Some(leave), Some(enter)) => FocusTransition::LeaveThenEnter(leave, enter),
                    (None, None) => FocusTransition::None,
                };
                self.current = next;
                if transition != FocusTransition::None {
                    transitions.push(transition);
                }
            }
            next = match self.deferred.pop() {
                Some(queued) => queued,
                None => break,
            };
        }
        self.depth -= 1;
        transitions
    }
}

/// Pointer constraint kind.
#[derive(Debug, Clone, Copy)]
pub enum ConstraintKind {
    Confine { region: Rect },
    Lock { position_hint: Option<Point> },
}

#[derive(Debug, Clone, Copy)]
pub struct PointerConstraint {
    pub kind: ConstraintKind,
    pub enabled: bool,
}

impl PointerConstraint {
    /// Active iff enabled and the constrained window is the focused and
    /// active window.
    pub fn is_active(&self, focused_window: Option<WindowId>, active_window: Option<WindowId>) -> bool {
        self.enabled && focused_window.is_some() && focused_window == active_window
    }

    /// Clamps a pointer delta against a confinement region, falling back
    /// to single-axis movement when the diagonal target leaves the
    /// region.
    pub fn confine(current: Point, delta: Point, region: Rect) -> Point {
        let full = Point::new(current.x + delta.x, current.y + delta.y);
        if region.contains(full) {
            return full;
        }
        let x_only = Point::new(full.x, current.y);
        if region.contains(x_only) {
            return x_only;
        }
        let y_only = Point::new(current.x, full.y);
        if region.contains(y_only) {
            return y_only;
        }
        current
    }

    /// Resolves the new absolute position on unlock: the client's cursor
    /// hint if given, else the frozen position.
    pub fn unlock_position(frozen: Point, hint: Option<Point>) -> Point {
        hint.unwrap_or(frozen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::Size;

    fn id(v: u64) -> WindowId {
        WindowId::for_test(v)
    }

    #[test]
    fn filter_chain_stops_at_first_consumer() {
        let mut router = InputRouter::new();
        router.add_filter("lock-screen", |_| FilterResult::Continue);
        router.add_filter("move-resize", |_| FilterResult::Consumed);
        router.add_filter("never-reached", |_| panic!("should not run"));

        let outcome = router.route(InputEvent::Key { code: 1, pressed: true });
        assert_eq!(outcome, RouteOutcome::ConsumedByFilter("move-resize".into()));
    }

    #[test]
    fn spies_observe_every_event_regardless_of_filters() {
        let seen = std::rc::Rc::new(std::cell::Cell::new(0));
        let seen2 = seen.clone();
        let mut router = InputRouter::new();
        router.add_spy(move |_| seen2.set(seen2.get() + 1));
        router.add_filter("consume-all", |_| FilterResult::Consumed);

        router.route(InputEvent::Key { code: 1, pressed: true });
        router.route(InputEvent::Key { code: 2, pressed: true });
        assert_eq!(seen.get(), 2);
    }

    #[test]
    fn leave_is_synthesised_before_enter_on_stacking_change() {
        let mut tracker = PointerFocusTracker::new();
        tracker.set_target(Some(id(1)));
        let transitions = tracker.set_target(Some(id(2)));
        assert_eq!(transitions, vec![FocusTransition::LeaveThenEnter(id(1), id(2))]);
    }

    #[test]
    fn confine_falls_back_to_single_axis_when_diagonal_leaves_region() {
        let region = Rect::new(Point::new(0, 0), Size::new(100, 100));
        let current = Point::new(95, 95);
        // Moving by (10, -10) would leave the region on X; only Y should move.
        let result = PointerConstraint::confine(current, Point::new(10, -10), region);
        assert_eq!(result, Point::new(95, 85));
    }
}
