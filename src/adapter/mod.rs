//! Bridges the protocol-agnostic `core` to `smithay`.
//!
//! Everything in this tree is allowed to name both a `core` type and a
//! `smithay` type in the same signature; nothing under `core` is allowed to
//! do that (see `core::mod`). This is where Wayland/X11 wire events become
//! typed `core` calls, and where `core` outcomes become configure events,
//! DnD grabs, and so on sent back to clients.

pub mod config;
pub mod input;
pub mod registry;
pub mod render_sink;
pub mod state;
pub mod wayland_handlers;
#[cfg(feature = "xwayland")]
pub mod xwayland_handlers;

pub use state::{ClientState, State};
