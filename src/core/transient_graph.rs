//! Parent/child transient relations and X11 window groups.
//!
//! Per the "cyclic graphs" redesign note, this is the single adjacency
//! store keyed by `WindowId`; `Window::common::transient_for`/
//! `transient_children` are a cache the adapter/`space` layer refreshes
//! from here after each mutation, never the other way around.

use std::collections::{HashMap, HashSet};

use crate::core::ids::{GroupId, WindowId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("adding this edge would create a transient cycle")]
    WouldCycle,
}

#[derive(Debug, Default)]
pub struct TransientGraph {
    parents: HashMap<WindowId, WindowId>,
    children: HashMap<WindowId, Vec<WindowId>>,
    /// Group membership in insertion order (oldest first), per group.
    group_members: HashMap<GroupId, Vec<WindowId>>,
    window_group: HashMap<WindowId, GroupId>,
    /// Windows that are transient for their group rather than a specific
    /// parent window.
    group_transient: HashSet<WindowId>,
}

impl TransientGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent_of(&self, window: WindowId) -> Option<WindowId> {
        self.parents.get(&window).copied()
    }

    pub fn children_of(&self, window: WindowId) -> &[WindowId] {
        self.children.get(&window).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn is_group_transient(&self, window: WindowId) -> bool {
        self.group_transient.contains(&window)
    }

    fn is_ancestor(&self, candidate: WindowId, of: WindowId) -> bool {
        let mut cur = of;
        let mut guard = self.parents.len() + 1;
        while let Some(&parent) = self.parents.get(&cur) {
            if parent == candidate {
                return true;
            }
            cur = parent;
            guard -= 1;
            if guard == 0 {
                // Would mean an existing cycle; defensive only, the store
                // never allows one to be inserted.
                return true;
            }
        }
        false
    }

    /// Adds a `child` transient-for `parent` edge. Rejects the edge (and
    /// leaves the graph unchanged) if it would create a cycle; a
    /// pre-existing conflicting edge on `child` is severed first.
    pub fn add_child(&mut self, parent: WindowId, child: WindowId) -> Result<(), Error> {
        if parent == child || self.is_ancestor(child, parent) {
            return Err(Error::WouldCycle);
        }
        if let Some(&old_parent) = self.parents.get(&child) {
            if old_parent != parent {
                self.remove_child(old_parent, child);
            }
        }
        self.parents.insert(child, parent);
        let siblings = self.children.entry(parent).or_default();
        if !siblings.contains(&child) {
            siblings.push(child);
        }
        self.group_transient.remove(&child);
        Ok(())
    }

    /// Removes the `child` edge from `parent`. If `child` belongs to an
    /// X11 window group, it is promoted to a group transient rather than
    /// fully detached (`win/x11/transient.h`'s `remove_child` override).
    pub fn remove_child(&mut self, parent: WindowId, child: WindowId) {
        if self.parents.get(&child) != Some(&parent) {
            return;
        }
        self.parents.remove(&child);
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|&c| c != child);
        }
        if self.window_group.contains_key(&child) {
            self.group_transient.insert(child);
        }
    }

    /// Fully detaches `child` from any parent (used when the window is
    /// destroyed or explicitly untransiented, as opposed to orphaned).
    pub fn detach(&mut self, child: WindowId) {
        if let Some(parent) = self.parents.remove(&child) {
            if let Some(siblings) = self.children.get_mut(&parent) {
                siblings.retain(|&c| c != child);
            }
        }
        self.children.remove(&child);
        self.group_transient.remove(&child);
        if let Some(group) = self.window_group.remove(&child) {
            if let Some(members) = self.group_members.get_mut(&group) {
                members.retain(|&w| w != child);
            }
        }
    }

    /// Adds `window` to `group`, inserting the minimum set of edges needed
    /// to preserve acyclicity.
    pub fn join_group(&mut self, group: GroupId, window: WindowId) {
        self.window_group.insert(window, group);
        let members = self.group_members.entry(group).or_default();
        let is_leader = members.is_empty();
        if !members.contains(&window) {
            members.push(window);
        }
        // The group leader (the first/oldest member) is never itself group
        // transient; only later members with no explicit parent are.
        if !is_leader && self.parents.get(&window).is_none() {
            self.group_transient.insert(window);
        }
    }

    /// The older group members a group-transient `window` is implicitly
    /// transient for (every older member that is not itself a group
    /// transient and not already an explicit child of `window`).
    pub fn implicit_group_parents(&self, window: WindowId) -> Vec<WindowId> {
        let Some(group) = self.window_group.get(&window) else {
            return Vec::new();
        };
        let Some(members) = self.group_members.get(group) else {
            return Vec::new();
        };
        let Some(pos) = members.iter().position(|&w| w == window) else {
            return Vec::new();
        };
        members[..pos]
            .iter()
            .filter(|&&m| !self.group_transient.contains(&m) && !self.is_ancestor(window, m))
            .copied()
            .collect()
    }

    /// Depth-first search for the first shown, non-minimized modal
    /// descendant.
    pub fn find_modal(
        &self,
        window: WindowId,
        is_modal_and_eligible: impl Fn(WindowId) -> bool,
    ) -> Option<WindowId> {
        for &child in self.children_of(window) {
            if is_modal_and_eligible(child) {
                return Some(child);
            }
            if let Some(found) = self.find_modal(child, &is_modal_and_eligible) {
                return Some(found);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(v: u64) -> WindowId {
        WindowId::for_test(v)
    }

    #[test]
    fn rejects_cycles() {
        let mut g = TransientGraph::new();
        g.add_child(id(1), id(2)).unwrap();
        g.add_child(id(2), id(3)).unwrap();
        assert_eq!(g.add_child(id(3), id(1)), Err(Error::WouldCycle));
    }

    #[test]
    fn reparenting_severs_old_edge() {
        let mut g = TransientGraph::new();
        g.add_child(id(1), id(2)).unwrap();
        g.add_child(id(9), id(2)).unwrap();
        assert_eq!(g.parent_of(id(2)), Some(id(9)));
        assert!(!g.children_of(id(1)).contains(&id(2)));
    }

    #[test]
    fn orphaned_group_member_is_promoted_not_detached() {
        let mut g = TransientGraph::new();
        let group = GroupId::for_test(1);
        g.join_group(group, id(1));
        g.join_group(group, id(2));
        g.add_child(id(1), id(2)).unwrap();
        assert!(!g.is_group_transient(id(2)));

        g.remove_child(id(1), id(2));
        assert!(g.is_group_transient(id(2)));
        assert_eq!(g.parent_of(id(2)), None);
    }

    #[test]
    fn implicit_group_parents_excludes_group_transients() {
        let mut g = TransientGraph::new();
        let group = GroupId::for_test(2);
        g.join_group(group, id(1));
        g.join_group(group, id(2));
        g.join_group(group, id(3));
        // window 2 never got an explicit parent, so it's a group transient
        // and should not count as an implicit parent for window 3.
        assert_eq!(g.implicit_group_parents(id(3)), vec![id(1)]);
    }

    #[test]
    fn find_modal_depth_first() {
        let mut g = TransientGraph::new();
        g.add_child(id(1), id(2)).unwrap();
        g.add_child(id(2), id(3)).unwrap();
        let found = g.find_modal(id(1), |w| w == id(3));
        assert_eq!(found, Some(id(3)));
    }
}
