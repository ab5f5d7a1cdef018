//! Owned timer handles, replacing `QTimer`.
//!
//! The core never blocks on a clock; it only ever schedules a deadline and,
//! at some later point, is told "now" has passed that deadline by whatever
//! owns the real event loop (the adapter's `calloop` source, mirroring the
//! teacher's use of `calloop::timer::Timer`). `TimerWheel` is a plain
//! min-heap of deadlines; `TimerHandle::cancel` (or drop) removes the entry.
//! This is used for the geometry-sync 1s watchdog and 16ms resize retarder,
//! and for `space`'s quick-tile combine-debounce window.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Opaque handle identifying one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry {
    id: TimerId,
    deadline: Instant,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline
    }
}
impl Eq for Entry {}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest deadline.
        other.deadline.cmp(&self.deadline)
    }
}
impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A single-threaded wheel of pending deadlines. Owns no callbacks: callers
/// poll `expired(now)` and dispatch themselves, the way `geometry_sync` maps
/// an expired id back to the window it watches.
#[derive(Debug, Default)]
pub struct TimerWheel {
    next_id: u64,
    heap: BinaryHeap<Entry>,
    cancelled: std::collections::HashSet<TimerId>,
}

impl TimerWheel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a deadline `delay` from `now`. `now` is passed in rather
    /// than read from the clock so tests can drive it deterministically.
    pub fn schedule_at(&mut self, now: Instant, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.heap.push(Entry {
            id,
            deadline: now + delay,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) {
        self.cancelled.insert(id);
    }

    /// Pops every timer whose deadline is at or before `now`, skipping
    /// cancelled ones, and returns their ids in deadline order.
    pub fn expired(&mut self, now: Instant) -> Vec<TimerId> {
        let mut fired = Vec::new();
        while let Some(top) = self.heap.peek() {
            if top.deadline > now {
                break;
            }
            let entry = self.heap.pop().expect("peeked Some");
            if self.cancelled.remove(&entry.id) {
                continue;
            }
            fired.push(entry.id);
        }
        fired
    }

    /// The deadline of the next non-cancelled timer, if any. The adapter's
    /// event loop uses this to arm the next `calloop` timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap
            .iter()
            .filter(|e| !self.cancelled.contains(&e.id))
            .map(|e| e.deadline)
            .min()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        !self.cancelled.contains(&id) && self.heap.iter().any(|e| e.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_order() {
        let mut wheel = TimerWheel::new();
        let t0 = Instant::now();
        let late = wheel.schedule_at(t0, Duration::from_millis(100));
        let early = wheel.schedule_at(t0, Duration::from_millis(10));

        assert!(wheel.expired(t0).is_empty());
        let fired = wheel.expired(t0 + Duration::from_millis(50));
        assert_eq!(fired, vec![early]);
        let fired = wheel.expired(t0 + Duration::from_millis(150));
        assert_eq!(fired, vec![late]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut wheel = TimerWheel::new();
        let t0 = Instant::now();
        let id = wheel.schedule_at(t0, Duration::from_millis(16));
        wheel.cancel(id);
        assert!(wheel.expired(t0 + Duration::from_secs(1)).is_empty());
        assert!(!wheel.is_pending(id));
    }

    #[test]
    fn next_deadline_ignores_cancelled() {
        let mut wheel = TimerWheel::new();
        let t0 = Instant::now();
        let a = wheel.schedule_at(t0, Duration::from_millis(10));
        let _b = wheel.schedule_at(t0, Duration::from_millis(20));
        wheel.cancel(a);
        assert_eq!(wheel.next_deadline(), Some(t0 + Duration::from_millis(20)));
    }
}
