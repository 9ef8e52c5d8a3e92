const TAP_MOVEMENT_THRESHOLD: f32 = 15.0;
const LONG_PRESS_MS: u64 = 500;
const DOUBLE_TAP_WINDOW_MS: u64 = 300;
const PINCH_ZOOM_IN_RATIO: f32 = 1.5;
const PINCH_ZOOM_OUT_RATIO: f32 = 0.67;

/// Recognition thresholds. The defaults define conformance; tests and
/// hosts with unusual input hardware can override per instance.
#[derive(Clone, Copy, Debug)]
pub struct GestureConfig {
    /// Max travel before a tap candidate reclassifies as a drag.
    pub tap_movement_threshold: f32,
    /// Stationary duration before an emulated secondary click.
    pub long_press_ms: u64,
    /// Max gap between two completed taps to count as a double tap.
    pub double_tap_window_ms: u64,
    /// Position tolerance between two completed taps.
    pub double_tap_tolerance: f32,
    /// Two-finger distance ratio at or above which pinch classification starts.
    pub pinch_zoom_in_ratio: f32,
    /// Two-finger distance ratio at or below which pinch classification starts.
    pub pinch_zoom_out_ratio: f32,
    /// Raise `pending_double_tap` when a second tap lands inside the
    /// window and tolerance. Off by default: the double-tap memory is
    /// always maintained, but the gesture mapping is host policy.
    pub report_double_tap: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            tap_movement_threshold: TAP_MOVEMENT_THRESHOLD,
            long_press_ms: LONG_PRESS_MS,
            double_tap_window_ms: DOUBLE_TAP_WINDOW_MS,
            double_tap_tolerance: TAP_MOVEMENT_THRESHOLD,
            pinch_zoom_in_ratio: PINCH_ZOOM_IN_RATIO,
            pinch_zoom_out_ratio: PINCH_ZOOM_OUT_RATIO,
            report_double_tap: false,
        }
    }
}
