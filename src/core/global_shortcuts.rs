//! Global shortcut registry: gesture and regular shortcuts live in one
//! registry keyed by a `Shortcut` sum type, matched in registration order,
//! first-match-wins.

use crate::core::gesture_recognizer::SwipeGesture;
use crate::core::xkb_keyboard::ModMask;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Key(u32),
    Button(u32),
    Axis(AxisDirection),
    Gesture(SwipeGesture),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegularShortcut {
    pub mods: ModMask,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierOnlyShortcut {
    pub modifier: ModMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Regular(RegularShortcut),
    ModifierOnly(ModifierOnlyShortcut),
}

/// Registered (shortcut, action) pairs plus the bare-modifier tap/release
/// tracking state.
pub struct GlobalShortcuts<A: Clone> {
    entries: Vec<(Shortcut, A)>,
    pending_modifier_only: Option<ModMask>,
    locked_out: bool,
}

impl<A: Clone> Default for GlobalShortcuts<A> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            pending_modifier_only: None,
            locked_out: false,
        }
    }
}

impl<A: Clone> GlobalShortcuts<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `addIfNotExists`: dedupes by shortcut equality.
    pub fn add_if_not_exists(&mut self, shortcut: Shortcut, action: A) {
        if self.entries.iter().any(|(s, _)| *s == shortcut) {
            return;
        }
        self.entries.push((shortcut, action));
    }

    /// Disables/enables modifier-only shortcuts (screen lock, or a
    /// focused window's "disable global shortcuts" rule).
    pub fn set_locked_out(&mut self, locked_out: bool) {
        self.locked_out = locked_out;
        if locked_out {
            self.pending_modifier_only = None;
        }
    }

    fn find_regular(&mut self, mods: ModMask, trigger: Trigger) -> Option<A> {
        self.entries.iter().find_map(|(s, action)| match s {
            Shortcut::Regular(r) if r.mods == mods && r.trigger == trigger => Some(action.clone()),
            _ => None,
        })
    }

    pub fn process_key(&mut self, mods: ModMask, key: u32) -> Option<A> {
        self.notify_other_event();
        self.find_regular(mods, Trigger::Key(key))
    }

    pub fn process_pointer_pressed(&mut self, mods: ModMask, button: u32) -> Option<A> {
        self.notify_other_event();
        self.find_regular(mods, Trigger::Button(button))
    }

    pub fn process_axis(&mut self, mods: ModMask, direction: AxisDirection) -> Option<A> {
        self.notify_other_event();
        self.find_regular(mods, Trigger::Axis(direction))
    }

    pub fn process_gesture(&mut self, gesture: SwipeGesture) -> Option<A> {
        self.entries.iter().find_map(|(s, action)| match s {
            Shortcut::Regular(r) if r.trigger == Trigger::Gesture(gesture) => Some(action.clone()),
            _ => None,
        })
    }

    /// Any key/button/pointer-motion/scroll event in between a bare
    /// modifier's press and release suppresses the modifier-only shortcut.
    /// Call this for every non-modifier-state device event.
    pub fn notify_other_event(&mut self) {
        self.pending_modifier_only = None;
    }

    /// Feeds the seat's current effective modifier mask (locks already
    /// excluded, see `xkb_keyboard::ModMask::without_locks`) after a
    /// modifier press/release. Returns the triggered action, if releasing
    /// a bare modifier with no intervening event completed a match.
    pub fn notify_modifiers_changed(&mut self, mods_now: ModMask) -> Option<A> {
        if self.locked_out {
            return None;
        }
        if mods_now.is_empty() {
            let pending = self.pending_modifier_only.take()?;
            return self.entries.iter().find_map(|(s, action)| match s {
                Shortcut::ModifierOnly(m) if m.modifier == pending => Some(action.clone()),
                _ => None,
            });
        }

        if self.pending_modifier_only.is_none() && is_single_bit(mods_now) {
            self.pending_modifier_only = Some(mods_now);
        } else if self.pending_modifier_only != Some(mods_now) {
            // A second modifier joined, or it doesn't match what we were
            // tracking: no longer a candidate bare-modifier tap.
            self.pending_modifier_only = None;
        }
        None
    }
}

fn is_single_bit(mask: ModMask) -> bool {
    let known = [
        ModMask::SHIFT,
        ModMask::CTRL,
        ModMask::ALT,
        ModMask::LOGO,
    ];
    known.into_iter().filter(|&bit| mask.contains(bit)).count() == 1
        && known.into_iter().fold(ModMask::NONE, |acc, bit| {
            if mask.contains(bit) {
                acc.union(bit)
            } else {
                acc
            }
        }) == mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_shortcut_matches_mods_and_key() {
        let mut shortcuts: GlobalShortcuts<&'static str> = GlobalShortcuts::new();
        shortcuts.add_if_not_exists(
            Shortcut::Regular(RegularShortcut { mods: ModMask::LOGO, trigger: Trigger::Key(1) }),
            "kill-active",
        );
        assert_eq!(shortcuts.process_key(ModMask::LOGO, 1), Some("kill-active"));
        assert_eq!(shortcuts.process_key(ModMask::CTRL, 1), None);
    }

    #[test]
    fn bare_modifier_tap_triggers_on_release() {
        let mut shortcuts: GlobalShortcuts<&'static str> = GlobalShortcuts::new();
        shortcuts.add_if_not_exists(
            Shortcut::ModifierOnly(ModifierOnlyShortcut { modifier: ModMask::SHIFT }),
            "show-desktop",
        );

        assert_eq!(shortcuts.notify_modifiers_changed(ModMask::SHIFT), None);
        assert_eq!(shortcuts.notify_modifiers_changed(ModMask::NONE), Some("show-desktop"));
    }

    #[test]
    fn intervening_event_suppresses_modifier_only_shortcut() {
        let mut shortcuts: GlobalShortcuts<&'static str> = GlobalShortcuts::new();
        shortcuts.add_if_not_exists(
            Shortcut::ModifierOnly(ModifierOnlyShortcut { modifier: ModMask::SHIFT }),
            "show-desktop",
        );

        assert_eq!(shortcuts.notify_modifiers_changed(ModMask::SHIFT), None);
        shortcuts.notify_other_event();
        assert_eq!(shortcuts.notify_modifiers_changed(ModMask::NONE), None);
    }

    #[test]
    fn locked_out_disables_modifier_only_shortcuts() {
        let mut shortcuts: GlobalShortcuts<&'static str> = GlobalShortcuts::new();
        shortcuts.add_if_not_exists(
            Shortcut::ModifierOnly(ModifierOnlyShortcut { modifier: ModMask::SHIFT }),
            "show-desktop",
        );
        shortcuts.set_locked_out(true);
        assert_eq!(shortcuts.notify_modifiers_changed(ModMask::SHIFT), None);
        assert_eq!(shortcuts.notify_modifiers_changed(ModMask::NONE), None);
    }
}
