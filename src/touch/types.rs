/// Identifier assigned to a contact by the platform touch delivery.
pub type TouchId = u64;

/// Position or displacement in the host's local pointer space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(a: Point, b: Point) -> Point {
        Point {
            x: (a.x + b.x) * 0.5,
            y: (a.y + b.y) * 0.5,
        }
    }

    /// Displacement of `self` from `origin`.
    pub fn offset_from(self, origin: Point) -> Point {
        Point {
            x: self.x - origin.x,
            y: self.y - origin.y,
        }
    }
}

/// The first two active contacts in insertion order, captured per event.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ContactSnapshot {
    pub(crate) count: u8,
    pub(crate) points: [Point; 2],
}

/// Classifier state. Exactly one value at any instant; changed only by
/// the transition handlers of the recognizer state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    Idle,
    TapPending,
    Dragging,
    LongPressPending,
    TwoFingerPan,
    PinchZoom,
}

/// Latest classified results, valid until the host consumes them with
/// `clear_pending_events`. Written only by the state machine; clearing
/// zeroes every field but leaves the gesture phase untouched, so an
/// in-progress drag or pinch keeps reporting on later frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct PendingOutput {
    pub pending_click: bool,
    pub pending_right_click: bool,
    pub pending_double_tap: bool,
    pub click_position: Point,
    pub drag_delta: Point,
    pub pinch_scale: f32,
    pub pinch_center: Point,
}

impl PendingOutput {
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
