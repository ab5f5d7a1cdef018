//! Typed observer lists, replacing the `connect(obj, &Cls::sig, ...)`
//! signal/slot pattern.
//!
//! Each event kind gets its own `Broadcaster<T>`. Subscribers register a
//! callback and get back a `Subscription` handle; dropping the handle
//! removes the callback. `space` owns one broadcaster per event kind and
//! is the only thing that ever calls `.emit`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::core::ids::WindowId;

type Callback<T> = Box<dyn FnMut(&T)>;

struct Slot<T> {
    id: u64,
    callback: Callback<T>,
}

struct Inner<T> {
    next_id: u64,
    slots: Vec<Slot<T>>,
}

/// A broadcaster for a single event kind `T`.
pub struct Broadcaster<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Default for Broadcaster<T> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }
}

impl<T> Broadcaster<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback. The returned `Subscription` must be kept alive
    /// for as long as the callback should keep firing.
    #[must_use]
    pub fn subscribe(&self, callback: impl FnMut(&T) + 'static) -> Subscription<T> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.slots.push(Slot {
                id,
                callback: Box::new(callback),
            });
            id
        };
        Subscription {
            id,
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn emit(&self, event: &T) {
        // Re-entrancy guard: a callback that subscribes/unsubscribes during
        // emission must not corrupt the in-flight borrow. We snapshot the
        // slot ids up front and re-fetch by id, skipping ones removed
        // mid-emission.
        let ids: Vec<u64> = self.inner.borrow().slots.iter().map(|s| s.id).collect();
        for id in ids {
            let mut inner = self.inner.borrow_mut();
            if let Some(slot) = inner.slots.iter_mut().find(|s| s.id == id) {
                // SAFETY-free reborrow dance: we need `&mut callback` while
                // also allowing the callback to re-borrow `inner` for
                // subscribe/unsubscribe. Take the callback out, call it
                // without holding the borrow, put it back.
                let mut cb = std::mem::replace(&mut slot.callback, Box::new(|_| {}));
                drop(inner);
                cb(event);
                let mut inner = self.inner.borrow_mut();
                if let Some(slot) = inner.slots.iter_mut().find(|s| s.id == id) {
                    slot.callback = cb;
                }
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().slots.len()
    }
}

/// RAII handle: removes its callback from the broadcaster on drop.
pub struct Subscription<T> {
    id: u64,
    inner: std::rc::Weak<RefCell<Inner<T>>>,
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.borrow_mut().slots.retain(|s| s.id != self.id);
        }
    }
}

/// Emitted after `space.adopt`.
#[derive(Debug, Clone)]
pub struct WindowAdded {
    pub window: WindowId,
}

/// Emitted whenever a window is removed from `space` (release or destroy).
#[derive(Debug, Clone)]
pub struct WindowRemoved {
    pub window: WindowId,
}

/// Emitted whenever a window's synced frame geometry changes.
#[derive(Debug, Clone)]
pub struct GeometryChanged {
    pub window: WindowId,
    pub frame: crate::core::geometry::Rect,
}

/// Emitted whenever `space`'s active window changes.
#[derive(Debug, Clone)]
pub struct ActiveChanged {
    pub previous: Option<WindowId>,
    pub current: Option<WindowId>,
}

/// Emitted whenever `stacking_order::update` changes the top of the stack.
#[derive(Debug, Clone)]
pub struct TopChanged {
    pub top: Option<WindowId>,
}

/// The set of broadcasters `space` owns, one per event kind.
#[derive(Default)]
pub struct EventHub {
    pub window_added: Broadcaster<WindowAdded>,
    pub window_removed: Broadcaster<WindowRemoved>,
    pub geometry_changed: Broadcaster<GeometryChanged>,
    pub active_changed: Broadcaster<ActiveChanged>,
    pub top_changed: Broadcaster<TopChanged>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn subscriber_receives_events_until_dropped() {
        let hub: Broadcaster<u32> = Broadcaster::new();
        let seen = Rc::new(Cell::new(0));
        let seen2 = seen.clone();
        let sub = hub.subscribe(move |v| seen2.set(seen2.get() + v));

        hub.emit(&1);
        hub.emit(&2);
        assert_eq!(seen.get(), 3);

        drop(sub);
        hub.emit(&5);
        assert_eq!(seen.get(), 3);
    }

    #[test]
    fn multiple_subscribers_each_receive_the_event() {
        let hub: Broadcaster<u32> = Broadcaster::new();
        let count = Rc::new(Cell::new(0));
        let (c1, c2) = (count.clone(), count.clone());
        let _s1 = hub.subscribe(move |_| c1.set(c1.get() + 1));
        let _s2 = hub.subscribe(move |_| c2.set(c2.get() + 1));
        assert_eq!(hub.subscriber_count(), 2);

        hub.emit(&1);
        assert_eq!(count.get(), 2);
    }
}
