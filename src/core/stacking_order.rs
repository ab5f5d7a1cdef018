//! Layered z-order.

use crate::core::events::{Broadcaster, TopChanged};
use crate::core::ids::WindowId;
use crate::core::window::Layer;

/// Inputs to the pure layer-assignment function.
#[derive(Debug, Clone, Copy)]
pub struct LayerInputs {
    pub keep_above: bool,
    pub keep_below: bool,
    pub is_active_fullscreen: bool,
    pub window_type: WindowType,
    pub dock_panel_behaviour: DockBehaviour,
    pub modal_descendant_of_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowType {
    Normal,
    Desktop,
    Dock,
    Notification,
    CriticalNotification,
    OnScreenDisplay,
    Popup,
    Unmanaged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DockBehaviour {
    Normal,
    AlwaysVisible,
    WindowsGoAbove,
}

/// Pure function: `layer == compute_layer(window)` must hold at all times.
pub fn compute_layer(inputs: LayerInputs) -> Layer {
    let base = match inputs.window_type {
        WindowType::Desktop => Layer::Desktop,
        WindowType::Notification => Layer::Notification,
        WindowType::CriticalNotification => Layer::CriticalNotification,
        WindowType::OnScreenDisplay => Layer::OnScreenDisplay,
        WindowType::Popup => Layer::Popup,
        WindowType::Unmanaged => Layer::Unmanaged,
        WindowType::Dock => match inputs.dock_panel_behaviour {
            DockBehaviour::AlwaysVisible => Layer::Dock,
            DockBehaviour::Normal => Layer::Normal,
            DockBehaviour::WindowsGoAbove => Layer::Above,
        },
        WindowType::Normal => {
            if inputs.keep_below {
                Layer::Below
            } else if inputs.is_active_fullscreen {
                Layer::ActiveFullscreen
            } else if inputs.keep_above {
                Layer::Above
            } else {
                Layer::Normal
            }
        }
    };
    if inputs.modal_descendant_of_active && base < Layer::ActiveFullscreen {
        // "Modal transients inherit their lead's layer (never lower)".
        Layer::ActiveFullscreen
    } else {
        base
    }
}

/// RAII batching scope: while one or more `Blocker`s are alive, `update()`
/// calls are deferred to a single recompute when the last one drops.
pub struct Blocker<'a> {
    order: &'a mut StackingOrder,
}

impl Drop for Blocker<'_> {
    fn drop(&mut self) {
        self.order.blocked -= 1;
        if self.order.blocked == 0 && self.order.dirty {
            self.order.recompute();
        }
    }
}

#[derive(Debug, Default)]
pub struct StackingOrder {
    /// User-visible z-order intent, bottom to top.
    pre_stack: Vec<WindowId>,
    /// Effective z-order, layer-partitioned, bottom to top.
    win_stack: Vec<WindowId>,
    layers: std::collections::HashMap<WindowId, Layer>,
    blocked: u32,
    dirty: bool,
    top: Option<WindowId>,
    pub top_changed: Broadcaster<TopChanged>,
}

impl StackingOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pre_stack(&self) -> &[WindowId] {
        &self.pre_stack
    }

    pub fn win_stack(&self) -> &[WindowId] {
        &self.win_stack
    }

    pub fn layer_of(&self, window: WindowId) -> Option<Layer> {
        self.layers.get(&window).copied()
    }

    pub fn insert(&mut self, window: WindowId, layer: Layer) {
        if !self.pre_stack.contains(&window) {
            self.pre_stack.push(window);
        }
        self.layers.insert(window, layer);
        self.mark_dirty();
    }

    pub fn remove(&mut self, window: WindowId) {
        self.pre_stack.retain(|&w| w != window);
        self.layers.remove(&window);
        self.mark_dirty();
    }

    pub fn set_layer(&mut self, window: WindowId, layer: Layer) {
        self.layers.insert(window, layer);
        self.mark_dirty();
    }

    pub fn raise(&mut self, window: WindowId) {
        if let Some(pos) = self.pre_stack.iter().position(|&w| w == window) {
            self.pre_stack.remove(pos);
        }
        self.pre_stack.push(window);
        self.mark_dirty();
    }

    pub fn lower(&mut self, window: WindowId) {
        if let Some(pos) = self.pre_stack.iter().position(|&w| w == window) {
            self.pre_stack.remove(pos);
        }
        self.pre_stack.insert(0, window);
        self.mark_dirty();
    }

    /// Restacks `window` to sit directly below `reference` in `pre_stack`.
    pub fn restack_below(&mut self, window: WindowId, reference: WindowId) {
        if window == reference {
            return;
        }
        self.pre_stack.retain(|&w| w != window);
        if let Some(pos) = self.pre_stack.iter().position(|&w| w == reference) {
            self.pre_stack.insert(pos, window);
        } else {
            self.pre_stack.push(window);
        }
        self.mark_dirty();
    }

    #[must_use]
    pub fn block(&mut self) -> Blocker<'_> {
        self.blocked += 1;
        Blocker { order: self }
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        if self.blocked == 0 {
            self.recompute();
        }
    }

    /// Idempotent: partitions `pre_stack` by layer and concatenates
    /// layers bottom-to-top, re-emitting "top changed" only when the top
    /// actually changes.
    pub fn update(&mut self) {
        self.recompute();
    }

    fn recompute(&mut self) {
        self.dirty = false;
        let mut layered: Vec<(Layer, WindowId)> = self
            .pre_stack
            .iter()
            .map(|&w| (self.layers.get(&w).copied().unwrap_or(Layer::Normal), w))
            .collect();
        layered.sort_by(|a, b| a.0.cmp(&b.0));
        self.win_stack = layered.into_iter().map(|(_, w)| w).collect();

        let new_top = self.win_stack.last().copied();
        if new_top != self.top {
            self.top = new_top;
            self.top_changed.emit(&TopChanged { top: new_top });
        }
    }

    pub fn top(&self) -> Option<WindowId> {
        self.top
    }
}
