//! Session save/restore.
//!
//! The core only requires round-tripping; the adapter picks the actual
//! encoding (TOML, matching the rest of its config). This module holds
//! the record shape and the matching logic `take_session_info` uses.

use crate::core::geometry::Rect;
use crate::core::window::{Desktop, MaxMode};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub window_role: String,
    pub resource_name: String,
    pub resource_class: String,
    pub client_machine: String,
    pub frame_geometry: SerRect,
    pub restore_geometry: SerRect,
    pub desktop: u32,
    pub on_all_desktops: bool,
    pub max_mode: SerMaxMode,
    pub fullscreen: bool,
    pub minimized: bool,
    pub keep_above: bool,
    pub keep_below: bool,
    pub skip_taskbar: bool,
    pub skip_pager: bool,
    pub skip_switcher: bool,
    pub no_border: bool,
    pub window_type: String,
    pub shortcut: Option<String>,
    pub active: bool,
    pub stacking_index: u32,
    pub opacity: f32,
}

/// `Rect` has no serde impl (the core stays dependency-light); mirror it
/// here for the persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SerRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl From<Rect> for SerRect {
    fn from(r: Rect) -> Self {
        SerRect { x: r.loc.x, y: r.loc.y, w: r.size.w, h: r.size.h }
    }
}

impl From<SerRect> for Rect {
    fn from(r: SerRect) -> Self {
        Rect::new(
            crate::core::geometry::Point::new(r.x, r.y),
            crate::core::geometry::Size::new(r.w, r.h),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SerMaxMode {
    Restore,
    Vertical,
    Horizontal,
    Full,
}

impl From<MaxMode> for SerMaxMode {
    fn from(m: MaxMode) -> Self {
        match m {
            MaxMode::Restore => SerMaxMode::Restore,
            MaxMode::Vertical => SerMaxMode::Vertical,
            MaxMode::Horizontal => SerMaxMode::Horizontal,
            MaxMode::Full => SerMaxMode::Full,
        }
    }
}

impl From<SerMaxMode> for MaxMode {
    fn from(m: SerMaxMode) -> Self {
        match m {
            SerMaxMode::Restore => MaxMode::Restore,
            SerMaxMode::Vertical => MaxMode::Vertical,
            SerMaxMode::Horizontal => MaxMode::Horizontal,
            SerMaxMode::Full => MaxMode::Full,
        }
    }
}

pub fn desktop_number(desktop: Desktop) -> u32 {
    match desktop {
        Desktop::Numbered(n) => n,
        Desktop::All => 0,
    }
}

/// Holds restored records not yet consumed by a matching `adopt`.
#[derive(Debug, Default)]
pub struct SessionStore {
    pending: Vec<SessionRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, records: Vec<SessionRecord>) {
        self.pending = records;
    }

    pub fn pending(&self) -> &[SessionRecord] {
        &self.pending
    }

    /// Matches on `(session_id, window_role)` first, falling back to
    /// `(resource_class, role)`; the record is consumed on a hit.
    pub fn take_session_info(
        &mut self,
        session_id: &str,
        window_role: &str,
        resource_class: &str,
    ) -> Option<SessionRecord> {
        if let Some(pos) = self
            .pending
            .iter()
            .position(|r| r.session_id == session_id && r.window_role == window_role)
        {
            return Some(self.pending.remove(pos));
        }
        self.pending
            .iter()
            .position(|r| r.resource_class == resource_class && r.window_role == window_role)
            .map(|pos| self.pending.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(session_id: &str, role: &str, class: &str) -> SessionRecord {
        SessionRecord {
            session_id: session_id.into(),
            window_role: role.into(),
            resource_name: "name".into(),
            resource_class: class.into(),
            client_machine: "localhost".into(),
            frame_geometry: SerRect { x: 0, y: 0, w: 100, h: 100 },
            restore_geometry: SerRect { x: 0, y: 0, w: 100, h: 100 },
            desktop: 1,
            on_all_desktops: false,
            max_mode: SerMaxMode::Restore,
            fullscreen: false,
            minimized: false,
            keep_above: false,
            keep_below: false,
            skip_taskbar: false,
            skip_pager: false,
            skip_switcher: false,
            no_border: false,
            window_type: "normal".into(),
            shortcut: None,
            active: false,
            stacking_index: 0,
            opacity: 1.0,
        }
    }

    #[test]
    fn matches_by_session_id_and_role_first() {
        let mut store = SessionStore::new();
        store.load(vec![record("s1", "main", "kitty")]);
        let found = store.take_session_info("s1", "main", "other-class");
        assert!(found.is_some());
        assert!(store.pending().is_empty());
    }

    #[test]
    fn falls_back_to_resource_class_and_role() {
        let mut store = SessionStore::new();
        store.load(vec![record("old-session", "main", "kitty")]);
        let found = store.take_session_info("new-session", "main", "kitty");
        assert!(found.is_some());
    }

    #[test]
    fn consumed_record_cannot_match_twice() {
        let mut store = SessionStore::new();
        store.load(vec![record("s1", "main", "kitty")]);
        assert!(store.take_session_info("s1", "main", "kitty").is_some());
        assert!(store.take_session_info("s1", "main", "kitty").is_none());
    }
}
