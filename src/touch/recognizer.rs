use log::debug;
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::{
    config::GestureConfig,
    tracker::ContactTracker,
    types::{ContactSnapshot, GesturePhase, PendingOutput, Point, TouchId},
};

#[derive(Clone, Copy, Debug)]
enum GestureHsmEvent {
    /// A contact was inserted into the tracker; snapshot taken after.
    Began {
        point: Point,
        now_ms: u64,
        snapshot: ContactSnapshot,
    },
    /// A tracked contact changed position; snapshot taken after.
    Moved {
        point: Point,
        now_ms: u64,
        snapshot: ContactSnapshot,
    },
    /// A tracked contact was removed; snapshot taken after removal.
    Ended {
        point: Point,
        now_ms: u64,
        snapshot: ContactSnapshot,
    },
    /// Per-frame tick; the only trigger for time-based transitions.
    Frame { now_ms: u64 },
}

/// Converts raw touch events plus frame ticks into tap, long-press,
/// drag, two-finger pan and pinch-zoom output.
///
/// All entry points are synchronous and expect delivery on one logical
/// thread. Results are readable only through the query accessors and are
/// consumed with [`clear_pending_events`](Self::clear_pending_events);
/// the touch entry points never return gesture results.
pub struct GestureRecognizer {
    config: GestureConfig,
    contacts: ContactTracker,
    machine: statig::blocking::StateMachine<GestureHsm>,
    pending: PendingOutput,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self::with_config(GestureConfig::default())
    }

    pub fn with_config(config: GestureConfig) -> Self {
        Self {
            config,
            contacts: ContactTracker::new(),
            machine: GestureHsm::new(config).state_machine(),
            pending: PendingOutput::default(),
        }
    }

    pub fn touch_began(&mut self, id: TouchId, x: f32, y: f32, now_ms: u64) {
        let point = Point::new(x, y);
        if !self.contacts.begin(id, point, now_ms) {
            return;
        }
        let snapshot = self.contacts.snapshot();
        self.dispatch(GestureHsmEvent::Began {
            point,
            now_ms,
            snapshot,
        });
    }

    pub fn touch_moved(&mut self, id: TouchId, x: f32, y: f32, now_ms: u64) {
        let point = Point::new(x, y);
        if !self.contacts.move_to(id, point) {
            // A move can race a begin that was dropped at the platform
            // boundary; nothing to classify.
            debug!("move for unknown touch {id} ignored");
            return;
        }
        let snapshot = self.contacts.snapshot();
        self.dispatch(GestureHsmEvent::Moved {
            point,
            now_ms,
            snapshot,
        });
    }

    pub fn touch_ended(&mut self, id: TouchId, x: f32, y: f32, now_ms: u64) {
        let point = Point::new(x, y);
        if !self.contacts.end(id, point) {
            debug!("end for unknown touch {id} ignored");
            return;
        }
        let snapshot = self.contacts.snapshot();
        self.dispatch(GestureHsmEvent::Ended {
            point,
            now_ms,
            snapshot,
        });
    }

    /// Called once per rendering frame. Sole evaluation point for the
    /// long-press transition and double-tap memory expiry; a host that
    /// stops calling this misses long-press detection until the next call.
    pub fn update(&mut self, now_ms: u64) {
        self.dispatch(GestureHsmEvent::Frame { now_ms });
    }

    fn dispatch(&mut self, event: GestureHsmEvent) {
        self.machine.handle_with_context(&event, &mut self.pending);
    }

    pub fn has_pending_click(&self) -> bool {
        self.pending.pending_click
    }

    pub fn has_pending_right_click(&self) -> bool {
        self.pending.pending_right_click
    }

    pub fn has_pending_double_tap(&self) -> bool {
        self.pending.pending_double_tap
    }

    pub fn click_position(&self) -> Point {
        self.pending.click_position
    }

    /// True while a single-finger drag or a two-finger pan is in
    /// progress; both report their displacement through `drag_delta`.
    pub fn is_dragging(&self) -> bool {
        matches!(
            self.phase(),
            GesturePhase::Dragging | GesturePhase::TwoFingerPan
        )
    }

    pub fn drag_delta(&self) -> Point {
        self.pending.drag_delta
    }

    pub fn is_pinching(&self) -> bool {
        self.phase() == GesturePhase::PinchZoom
    }

    pub fn pinch_scale(&self) -> f32 {
        self.pending.pinch_scale
    }

    pub fn pinch_center(&self) -> Point {
        self.pending.pinch_center
    }

    pub fn phase(&self) -> GesturePhase {
        self.machine.inner().phase
    }

    pub fn active_contacts(&self) -> usize {
        self.contacts.len()
    }

    /// Consumes one frame's notifications. Zeroes every pending field
    /// but leaves the gesture phase alone: an in-progress drag or pinch
    /// keeps reporting on the next update/query cycle.
    pub fn clear_pending_events(&mut self) {
        self.pending.clear();
    }

    /// Drops all contacts, pending output and double-tap memory and
    /// returns the machine to idle.
    pub fn reset(&mut self) {
        self.contacts.clear();
        self.pending.clear();
        self.machine = GestureHsm::new(self.config).state_machine();
    }
}

struct GestureHsm {
    config: GestureConfig,
    phase: GesturePhase,
    press_origin: Point,
    press_last_point: Point,
    press_started_ms: u64,
    // Squared two-finger baseline; zero means not captured or coincident
    // touches, in which case scale reads 1.0 and the baseline re-anchors
    // on the first non-zero distance.
    initial_pinch_distance_sq: f32,
    pinch_origin_mid: Point,
    last_tap_ms: Option<u64>,
    last_tap_position: Point,
}

impl GestureHsm {
    fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: GesturePhase::Idle,
            press_origin: Point::default(),
            press_last_point: Point::default(),
            press_started_ms: 0,
            initial_pinch_distance_sq: 0.0,
            pinch_origin_mid: Point::default(),
            last_tap_ms: None,
            last_tap_position: Point::default(),
        }
    }

    fn to(&mut self, phase: GesturePhase, state: State) -> Outcome<State> {
        self.phase = phase;
        Transition(state)
    }

    fn anchor_press(&mut self, point: Point, now_ms: u64) {
        self.press_origin = point;
        self.press_last_point = point;
        self.press_started_ms = now_ms;
    }

    fn tap_threshold_sq(&self) -> f32 {
        self.config.tap_movement_threshold * self.config.tap_movement_threshold
    }

    fn capture_two_finger_baseline(&mut self, snapshot: &ContactSnapshot) {
        self.initial_pinch_distance_sq = squared_distance(snapshot.points[0], snapshot.points[1]);
        self.pinch_origin_mid = Point::midpoint(snapshot.points[0], snapshot.points[1]);
    }

    fn pinch_ratio_crossed(&self, distance_sq: f32) -> bool {
        let base = self.initial_pinch_distance_sq;
        if base <= f32::EPSILON {
            return false;
        }
        let in_sq = self.config.pinch_zoom_in_ratio * self.config.pinch_zoom_in_ratio;
        let out_sq = self.config.pinch_zoom_out_ratio * self.config.pinch_zoom_out_ratio;
        distance_sq >= base * in_sq || distance_sq <= base * out_sq
    }

    fn update_pinch(
        &mut self,
        context: &mut PendingOutput,
        distance_sq: f32,
        snapshot: &ContactSnapshot,
    ) {
        if self.initial_pinch_distance_sq <= f32::EPSILON {
            // Coincident touches at capture time; report identity until
            // the fingers separate, then anchor the baseline there.
            if distance_sq > f32::EPSILON {
                self.initial_pinch_distance_sq = distance_sq;
            }
            context.pinch_scale = 1.0;
        } else {
            context.pinch_scale = (distance_sq / self.initial_pinch_distance_sq).sqrt();
        }
        context.pinch_center = Point::midpoint(snapshot.points[0], snapshot.points[1]);
    }

    fn finalize_tap(&mut self, context: &mut PendingOutput, point: Point, now_ms: u64) {
        context.pending_click = true;
        context.click_position = point;

        if let Some(last_ms) = self.last_tap_ms {
            let tolerance_sq = self.config.double_tap_tolerance * self.config.double_tap_tolerance;
            let within_window =
                now_ms.saturating_sub(last_ms) <= self.config.double_tap_window_ms;
            let within_tolerance =
                squared_distance(point, self.last_tap_position) <= tolerance_sq;
            if within_window && within_tolerance && self.config.report_double_tap {
                context.pending_double_tap = true;
            }
        }
        self.last_tap_ms = Some(now_ms);
        self.last_tap_position = point;
    }

    fn expire_tap_memory(&mut self, now_ms: u64) {
        if let Some(last_ms) = self.last_tap_ms {
            if now_ms.saturating_sub(last_ms) > self.config.double_tap_window_ms {
                self.last_tap_ms = None;
            }
        }
    }

    /// A contact ended while classifying two fingers. With two or more
    /// remaining the pair changed, so the baseline re-anchors; with one
    /// remaining the machine re-anchors a fresh tap candidate on the
    /// survivor; with none it goes idle.
    fn leave_two_finger(&mut self, snapshot: &ContactSnapshot, now_ms: u64) -> Outcome<State> {
        if snapshot.count >= 2 {
            self.capture_two_finger_baseline(snapshot);
            return Handled;
        }
        self.initial_pinch_distance_sq = 0.0;
        if snapshot.count == 1 {
            self.anchor_press(snapshot.points[0], now_ms);
            self.to(GesturePhase::TapPending, State::tap_pending())
        } else {
            self.to(GesturePhase::Idle, State::idle())
        }
    }
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    #[state(superstate = "session")]
    fn idle(&mut self, context: &mut PendingOutput, event: &GestureHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Began {
                point,
                now_ms,
                snapshot,
            } => {
                if snapshot.count >= 2 {
                    self.capture_two_finger_baseline(snapshot);
                    return self.to(GesturePhase::TwoFingerPan, State::two_finger_pan());
                }
                self.anchor_press(*point, *now_ms);
                self.to(GesturePhase::TapPending, State::tap_pending())
            }
            _ => Super,
        }
    }

    #[state(superstate = "session")]
    fn tap_pending(
        &mut self,
        context: &mut PendingOutput,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Began { snapshot, .. } => {
                if snapshot.count >= 2 {
                    self.capture_two_finger_baseline(snapshot);
                    return self.to(GesturePhase::TwoFingerPan, State::two_finger_pan());
                }
                Handled
            }
            GestureHsmEvent::Moved { point, .. } => {
                self.press_last_point = *point;
                if squared_distance(*point, self.press_origin) > self.tap_threshold_sq() {
                    context.drag_delta = point.offset_from(self.press_origin);
                    return self.to(GesturePhase::Dragging, State::dragging());
                }
                Handled
            }
            GestureHsmEvent::Ended { point, now_ms, .. } => {
                // Moves beyond the threshold already reclassified to
                // dragging; the release position gets the same check
                // since an end can jump without an intermediate move.
                if squared_distance(*point, self.press_origin) <= self.tap_threshold_sq() {
                    self.finalize_tap(context, *point, *now_ms);
                }
                self.to(GesturePhase::Idle, State::idle())
            }
            GestureHsmEvent::Frame { now_ms } => {
                if now_ms.saturating_sub(self.press_started_ms) >= self.config.long_press_ms {
                    // Emulated secondary click pends as soon as the
                    // threshold expires, not at release.
                    context.pending_right_click = true;
                    context.click_position = self.press_last_point;
                    return self.to(GesturePhase::LongPressPending, State::long_press_pending());
                }
                Super
            }
        }
    }

    #[state(superstate = "session")]
    fn long_press_pending(
        &mut self,
        context: &mut PendingOutput,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Began { snapshot, .. } => {
                if snapshot.count >= 2 {
                    self.capture_two_finger_baseline(snapshot);
                    return self.to(GesturePhase::TwoFingerPan, State::two_finger_pan());
                }
                Handled
            }
            GestureHsmEvent::Moved { point, .. } => {
                self.press_last_point = *point;
                Handled
            }
            GestureHsmEvent::Ended { .. } => self.to(GesturePhase::Idle, State::idle()),
            GestureHsmEvent::Frame { .. } => Super,
        }
    }

    #[state(superstate = "session")]
    fn dragging(&mut self, context: &mut PendingOutput, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Began { snapshot, .. } => {
                if snapshot.count >= 2 {
                    self.capture_two_finger_baseline(snapshot);
                    return self.to(GesturePhase::TwoFingerPan, State::two_finger_pan());
                }
                Handled
            }
            GestureHsmEvent::Moved { point, .. } => {
                self.press_last_point = *point;
                context.drag_delta = point.offset_from(self.press_origin);
                Handled
            }
            GestureHsmEvent::Ended { .. } => {
                // The final delta stays pending until the host clears it.
                self.to(GesturePhase::Idle, State::idle())
            }
            GestureHsmEvent::Frame { .. } => Super,
        }
    }

    #[state(superstate = "session")]
    fn two_finger_pan(
        &mut self,
        context: &mut PendingOutput,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Moved { snapshot, .. } => {
                if snapshot.count < 2 {
                    return Handled;
                }
                let distance_sq = squared_distance(snapshot.points[0], snapshot.points[1]);
                if self.initial_pinch_distance_sq <= f32::EPSILON && distance_sq > f32::EPSILON {
                    // Coincident at capture; anchor on first separation.
                    self.initial_pinch_distance_sq = distance_sq;
                }
                if self.pinch_ratio_crossed(distance_sq) {
                    self.update_pinch(context, distance_sq, snapshot);
                    return self.to(GesturePhase::PinchZoom, State::pinch_zoom());
                }
                let mid = Point::midpoint(snapshot.points[0], snapshot.points[1]);
                context.drag_delta = mid.offset_from(self.pinch_origin_mid);
                Handled
            }
            GestureHsmEvent::Ended {
                snapshot, now_ms, ..
            } => self.leave_two_finger(snapshot, *now_ms),
            // A third contact is not classified; the first two keep
            // driving the gesture.
            GestureHsmEvent::Began { .. } => Handled,
            GestureHsmEvent::Frame { .. } => Super,
        }
    }

    #[state(superstate = "session")]
    fn pinch_zoom(
        &mut self,
        context: &mut PendingOutput,
        event: &GestureHsmEvent,
    ) -> Outcome<State> {
        match event {
            GestureHsmEvent::Moved { snapshot, .. } => {
                if snapshot.count < 2 {
                    return Handled;
                }
                // No downgrade back to pan within the same two-finger
                // session, even when the ratio returns toward 1.0.
                let distance_sq = squared_distance(snapshot.points[0], snapshot.points[1]);
                self.update_pinch(context, distance_sq, snapshot);
                Handled
            }
            GestureHsmEvent::Ended {
                snapshot, now_ms, ..
            } => self.leave_two_finger(snapshot, *now_ms),
            GestureHsmEvent::Began { .. } => Handled,
            GestureHsmEvent::Frame { .. } => Super,
        }
    }

    #[superstate]
    fn session(&mut self, context: &mut PendingOutput, event: &GestureHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Frame { now_ms } => {
                self.expire_tap_memory(*now_ms);
                Handled
            }
            // Touch events that the current state has no use for.
            _ => Handled,
        }
    }
}

fn squared_distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}
