//! X11-managed window state.

use crate::core::geometry::Edges;

/// WM_NORMAL_HINTS-derived size constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeHints {
    pub min: (i32, i32),
    pub max: (i32, i32),
    pub base: (i32, i32),
    pub increment: (i32, i32),
    pub aspect_min: Option<(i32, i32)>,
    pub aspect_max: Option<(i32, i32)>,
}

impl Default for SizeHints {
    fn default() -> Self {
        Self {
            min: (1, 1),
            max: (i32::MAX, i32::MAX),
            base: (0, 0),
            increment: (1, 1),
            aspect_min: None,
            aspect_max: None,
        }
    }
}

impl SizeHints {
    /// Clamps a requested `(w, h)` to min/max and rounds down to the
    /// nearest increment above `base`, per ICCCM WM_NORMAL_HINTS semantics.
    pub fn clamp(&self, w: i32, h: i32) -> (i32, i32) {
        let w = w.clamp(self.min.0, self.max.0);
        let h = h.clamp(self.min.1, self.max.1);
        let snap = |v: i32, base: i32, inc: i32| {
            if inc <= 1 {
                v
            } else {
                base + ((v - base).max(0) / inc) * inc
            }
        };
        (
            snap(w, self.base.0, self.increment.0).max(self.min.0),
            snap(h, self.base.1, self.increment.1).max(self.min.1),
        )
    }
}

/// WM_NORMAL_HINTS gravity, used to anchor the client rect within the
/// frame when the decoration is (re)sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
    Static,
}

/// _MOTIF_WM_HINTS subset the core cares about (decoration + functions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MotifHints {
    pub decorations: bool,
    pub resize: bool,
    pub close: bool,
}

/// X11 sync counter/alarm state for the geometry-sync round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncCounter {
    pub counter_xid: u32,
    pub alarm_xid: u32,
    /// Last counter value the client confirmed via the alarm.
    pub last_confirmed_value: i64,
}

#[derive(Debug, Clone)]
pub struct X11State {
    pub window_xid: u32,
    pub frame_xid: Option<u32>,
    pub size_hints: SizeHints,
    pub gravity: Gravity,
    pub motif_hints: MotifHints,
    pub strut: Option<Edges>,
    pub sync: Option<SyncCounter>,
    pub supports_delete: bool,
    pub pid: Option<u32>,
    pub accepts_input: bool,
    pub override_redirect: bool,
}

impl X11State {
    pub fn new(window_xid: u32) -> Self {
        Self {
            window_xid,
            frame_xid: None,
            size_hints: SizeHints::default(),
            gravity: Gravity::default(),
            motif_hints: MotifHints::default(),
            strut: None,
            sync: None,
            supports_delete: true,
            pid: None,
            accepts_input: true,
            override_redirect: false,
        }
    }

    /// Programs (or re-programs) the sync counter with a new target value,
    /// per `geometry_sync::set_frame_geometry` step 4.
    pub fn program_sync_alarm(&mut self, target_value: i64) -> Option<(u32, i64)> {
        self.sync.map(|s| (s.alarm_xid, target_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_hints_clamp_and_snap_to_increment() {
        let hints = SizeHints {
            min: (50, 50),
            max: (800, 600),
            base: (10, 10),
            increment: (8, 8),
            aspect_min: None,
            aspect_max: None,
        };
        assert_eq!(hints.clamp(1000, 1000), (800, 600));
        // 10 + floor((123-10)/8)*8 = 10 + 14*8 = 122
        assert_eq!(hints.clamp(123, 123), (122, 122));
    }
}
