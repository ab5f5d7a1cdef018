//! Per-seat keymap/modifier state.
//!
//! Modifier state is kept split into depressed/latched/locked components
//! and recomputed from the xkb state after every key event, rather than
//! collapsed into one bool set.

/// A modifier bitmask. Bits are assigned arbitrarily; what matters is that
/// every modifier gets its own bit and `ModMask`s combine with bitwise or.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModMask(u32);

impl ModMask {
    pub const NONE: ModMask = ModMask(0);
    pub const SHIFT: ModMask = ModMask(1 << 0);
    pub const CTRL: ModMask = ModMask(1 << 1);
    pub const ALT: ModMask = ModMask(1 << 2);
    pub const LOGO: ModMask = ModMask(1 << 3);
    pub const CAPS_LOCK: ModMask = ModMask(1 << 4);
    pub const NUM_LOCK: ModMask = ModMask(1 << 5);

    pub fn union(self, other: ModMask) -> ModMask {
        ModMask(self.0 | other.0)
    }

    pub fn contains(self, other: ModMask) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Masks out lock indicators (Caps Lock, Num Lock), which are never
    /// themselves part of a shortcut's modifier combination.
    pub fn without_locks(self) -> ModMask {
        ModMask(self.0 & !(Self::CAPS_LOCK.0 | Self::NUM_LOCK.0))
    }
}

impl std::ops::BitOr for ModMask {
    type Output = ModMask;
    fn bitor(self, rhs: ModMask) -> ModMask {
        self.union(rhs)
    }
}

/// Per-seat xkb state: layout index plus the three modifier components the
/// xkb state machine tracks independently.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    layout_index: u32,
    layout_count: u32,
    depressed: ModMask,
    latched: ModMask,
    locked: ModMask,
}

impl KeyboardState {
    pub fn new(layout_count: u32) -> Self {
        Self {
            layout_index: 0,
            layout_count: layout_count.max(1),
            ..Default::default()
        }
    }

    pub fn set_depressed(&mut self, mask: ModMask) {
        self.depressed = mask;
    }

    pub fn set_latched(&mut self, mask: ModMask) {
        self.latched = mask;
    }

    pub fn set_locked(&mut self, mask: ModMask) {
        self.locked = mask;
    }

    /// The modifier state a key/button/axis event carries, as used to
    /// match regular global shortcuts. Lock indicators are masked out.
    pub fn effective_mods(&self) -> ModMask {
        (self.depressed | self.latched | self.locked).without_locks()
    }

    /// Raw effective modifiers, including lock bits, for clients that
    /// asked for the true xkb state (e.g. an input method).
    pub fn raw_effective_mods(&self) -> ModMask {
        self.depressed | self.latched | self.locked
    }

    pub fn layout_index(&self) -> u32 {
        self.layout_index
    }

    pub fn cycle_layout(&mut self, delta: i32) {
        if self.layout_count == 0 {
            return;
        }
        let count = self.layout_count as i64;
        let next = (self.layout_index as i64 + delta as i64).rem_euclid(count);
        self.layout_index = next as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_lock_is_excluded_from_effective_mods() {
        let mut state = KeyboardState::new(1);
        state.set_locked(ModMask::CAPS_LOCK);
        assert!(state.effective_mods().is_empty());
        assert!(state.raw_effective_mods().contains(ModMask::CAPS_LOCK));
    }

    #[test]
    fn shift_with_caps_lock_still_reads_as_shift() {
        let mut state = KeyboardState::new(1);
        state.set_depressed(ModMask::SHIFT);
        state.set_locked(ModMask::CAPS_LOCK);
        assert!(state.effective_mods().contains(ModMask::SHIFT));
        assert!(!state.effective_mods().contains(ModMask::CAPS_LOCK));
    }

    #[test]
    fn layout_cycles_and_wraps() {
        let mut state = KeyboardState::new(3);
        state.cycle_layout(1);
        state.cycle_layout(1);
        assert_eq!(state.layout_index(), 2);
        state.cycle_layout(1);
        assert_eq!(state.layout_index(), 0);
        state.cycle_layout(-1);
        assert_eq!(state.layout_index(), 2);
    }
}
