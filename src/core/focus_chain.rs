//! Per-desktop MRU focus chain.

use std::collections::HashMap;

use crate::core::ids::WindowId;

/// Why `update` is moving a window within its desktop's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// Place at the very front, unconditionally.
    MakeFirst,
    /// Place at the very back, unconditionally.
    MakeLast,
    /// Move to front only if the window is already present in the chain.
    Update,
}

#[derive(Debug, Default)]
pub struct FocusChain {
    per_desktop: HashMap<u32, Vec<WindowId>>,
}

impl FocusChain {
    pub fn new() -> Self {
        Self::default()
    }

    fn chain_mut(&mut self, desktop: u32) -> &mut Vec<WindowId> {
        self.per_desktop.entry(desktop).or_default()
    }

    pub fn chain(&self, desktop: u32) -> &[WindowId] {
        self.per_desktop.get(&desktop).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Most-recently-used window on `desktop`, if any.
    pub fn front(&self, desktop: u32) -> Option<WindowId> {
        self.chain(desktop).first().copied()
    }

    pub fn update(&mut self, desktop: u32, window: WindowId, reason: Reason) {
        let chain = self.chain_mut(desktop);
        let present = chain.iter().position(|&w| w == window);

        match reason {
            Reason::MakeFirst => {
                if let Some(pos) = present {
                    chain.remove(pos);
                }
                chain.insert(0, window);
            }
            Reason::MakeLast => {
                if let Some(pos) = present {
                    chain.remove(pos);
                }
                chain.push(window);
            }
            Reason::Update => {
                if let Some(pos) = present {
                    chain.remove(pos);
                    chain.insert(0, window);
                }
            }
        }
    }

    pub fn remove(&mut self, window: WindowId) {
        for chain in self.per_desktop.values_mut() {
            chain.retain(|&w| w != window);
        }
    }

    /// Adds `window` to every desktop's chain it should appear on, used
    /// when a window is marked `on_all_desktops`.
    pub fn add_to_all(&mut self, window: WindowId, desktops: impl Iterator<Item = u32>) {
        for desktop in desktops {
            let chain = self.chain_mut(desktop);
            if !chain.contains(&window) {
                chain.push(window);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(v: u64) -> WindowId {
        WindowId::for_test(v)
    }

    #[test]
    fn make_first_and_make_last() {
        let mut chain = FocusChain::new();
        chain.update(1, id(1), Reason::MakeLast);
        chain.update(1, id(2), Reason::MakeLast);
        chain.update(1, id(3), Reason::MakeFirst);
        assert_eq!(chain.chain(1), &[id(3), id(1), id(2)]);
    }

    #[test]
    fn update_only_moves_if_already_present() {
        let mut chain = FocusChain::new();
        chain.update(1, id(1), Reason::MakeLast);
        chain.update(1, id(2), Reason::MakeLast);
        chain.update(1, id(99), Reason::Update);
        assert_eq!(chain.chain(1), &[id(1), id(2)]);

        chain.update(1, id(2), Reason::Update);
        assert_eq!(chain.chain(1), &[id(2), id(1)]);
    }

    #[test]
    fn activate_sets_front_of_chain() {
        let mut chain = FocusChain::new();
        chain.update(1, id(1), Reason::MakeLast);
        chain.update(1, id(2), Reason::MakeFirst);
        assert_eq!(chain.front(1), Some(id(2)));
    }
}
