//! Stable identifiers used across the core instead of raw pointers.
//!
//! Per the "raw pointers with ad-hoc ownership" redesign flag: `space` owns
//! the windows, everything else holds an id and looks the window up.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Stable 64-bit window identity, unique for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u64);

impl WindowId {
    pub fn as_u64(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub fn for_test(v: u64) -> Self {
        WindowId(v)
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Monotonically increasing id allocator, one per `space`.
#[derive(Debug, Default)]
pub struct WindowIdAllocator {
    next: AtomicU64,
}

impl WindowIdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn alloc(&self) -> WindowId {
        WindowId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Identifies an `output` (display head). Immutable within a frame; the
/// whole set is replaced atomically by `output_set::reconfigure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputId(u64);

#[derive(Debug, Default)]
pub struct OutputIdAllocator {
    next: AtomicU64,
}

impl OutputIdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn alloc(&self) -> OutputId {
        OutputId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl OutputId {
    #[cfg(test)]
    pub fn for_test(v: u64) -> Self {
        OutputId(v)
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "output#{}", self.0)
    }
}

/// Clusters X11 windows created by the same client leader (the X11 window
/// group). Wayland windows never carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupId(u64);

#[derive(Debug, Default)]
pub struct GroupIdAllocator {
    next: AtomicU64,
}

impl GroupIdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn alloc(&self) -> GroupId {
        GroupId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

impl GroupId {
    #[cfg(test)]
    pub fn for_test(v: u64) -> Self {
        GroupId(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let alloc = WindowIdAllocator::new();
        let a = alloc.alloc();
        let b = alloc.alloc();
        assert_ne!(a, b);
        assert!(b.as_u64() > a.as_u64());
    }
}
