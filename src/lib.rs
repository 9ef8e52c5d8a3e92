//! Touch gesture recognition for pointer-oriented applications.
//!
//! Raw per-contact touch events (begin/move/end with position and a
//! monotonic millisecond timestamp) plus one frame tick per rendering
//! frame go in; pending click / right-click / drag / pinch output comes
//! out through query accessors that the host polls after each tick and
//! consumes with [`GestureRecognizer::clear_pending_events`].

pub mod touch;

pub use touch::{GestureConfig, GesturePhase, GestureRecognizer, PendingOutput, Point, TouchId};
