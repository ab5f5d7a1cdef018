//! Multi-finger swipe/pinch gesture matching, the touchpad-gesture
//! companion to `global_shortcuts`'s keyboard/pointer shortcuts.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwipeGesture {
    pub finger_count: u8,
    pub direction: SwipeDirection,
}

#[derive(Debug, Clone, Copy)]
struct InProgress {
    finger_count: u8,
    start_dx: f64,
    start_dy: f64,
    dx: f64,
    dy: f64,
}

/// Matches an in-progress multi-finger swipe to one of the registered
/// `SwipeGesture`s once it clears a minimum distance threshold.
#[derive(Debug, Default)]
pub struct GestureRecognizer {
    registered: Vec<SwipeGesture>,
    active: Option<InProgress>,
}

const MIN_DISTANCE: f64 = 30.0;

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, gesture: SwipeGesture) {
        if !self.registered.contains(&gesture) {
            self.registered.push(gesture);
        }
    }

    pub fn begin(&mut self, finger_count: u8) {
        self.active = Some(InProgress {
            finger_count,
            start_dx: 0.0,
            start_dy: 0.0,
            dx: 0.0,
            dy: 0.0,
        });
    }

    pub fn update(&mut self, dx: f64, dy: f64) {
        if let Some(state) = &mut self.active {
            state.dx += dx;
            state.dy += dy;
        }
    }

    /// Ends the in-progress gesture and returns the matching registered
    /// gesture, if the travelled distance and finger count matched one.
    pub fn end(&mut self) -> Option<SwipeGesture> {
        let state = self.active.take()?;
        let distance = (state.dx * state.dx + state.dy * state.dy).sqrt();
        if distance < MIN_DISTANCE {
            return None;
        }
        let direction = if state.dx.abs() >= state.dy.abs() {
            if state.dx >= 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        } else if state.dy >= 0.0 {
            SwipeDirection::Down
        } else {
            SwipeDirection::Up
        };
        self.registered
            .iter()
            .find(|g| g.finger_count == state.finger_count && g.direction == direction)
            .copied()
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_registered_four_finger_swipe() {
        let mut rec = GestureRecognizer::new();
        rec.register(SwipeGesture {
            finger_count: 4,
            direction: SwipeDirection::Left,
        });

        rec.begin(4);
        rec.update(-50.0, 2.0);
        assert_eq!(
            rec.end(),
            Some(SwipeGesture {
                finger_count: 4,
                direction: SwipeDirection::Left
            })
        );
    }

    #[test]
    fn short_swipe_below_threshold_does_not_match() {
        let mut rec = GestureRecognizer::new();
        rec.register(SwipeGesture {
            finger_count: 3,
            direction: SwipeDirection::Up,
        });
        rec.begin(3);
        rec.update(0.0, -5.0);
        assert_eq!(rec.end(), None);
    }
}
