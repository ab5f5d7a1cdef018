//! The seam where painted frames would leave the process. `RenderSink` is the
//! trait the adapter drives after every `core::Space` mutation; a real
//! backend (DRM/KMS, winit) implements it elsewhere, outside this crate's
//! scope, and tests use `RecordingSink`.

use crate::core::geometry::Rect;
use crate::core::ids::WindowId;

/// One observable effect of a `core::Space` change that a renderer needs to
/// know about. Intentionally coarse: the sink decides how to turn a damaged
/// rectangle into actual GPU work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    WindowDamaged { window: WindowId, frame: Rect },
    WindowRemoved { window: WindowId },
    OutputDamaged { output_id: u32 },
}

pub trait RenderSink {
    fn handle(&mut self, event: SinkEvent);
}

/// Test double: records events instead of drawing anything.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RenderSink for RecordingSink {
    fn handle(&mut self, event: SinkEvent) {
        self.events.push(event);
    }
}
