//! The protocol-agnostic window-management core.
//!
//! Nothing under this module tree depends on `smithay`: it is driven purely
//! by plain typed calls from whatever talks to it. The `adapter` module
//! tree is the only thing that talks to Wayland/X11/the renderer and is the
//! only place a `smithay` type and a `core` type ever appear in the same
//! function signature.

pub mod activation;
pub mod cursor;
pub mod events;
pub mod focus_chain;
pub mod geometry;
pub mod geometry_sync;
pub mod gesture_recognizer;
pub mod global_shortcuts;
pub mod ids;
pub mod input_router;
pub mod output_set;
pub mod rules_engine;
pub mod session;
pub mod space;
pub mod stacking_order;
pub mod timer_wheel;
pub mod transient_graph;
pub mod window;
pub mod xkb_keyboard;

pub use space::Space;
pub use window::{Window, WindowKind};
