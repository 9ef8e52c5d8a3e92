pub mod config;
pub mod recognizer;
pub mod tracker;
pub mod types;

pub use config::GestureConfig;
pub use recognizer::GestureRecognizer;
pub use tracker::{Contact, ContactTracker};
pub use types::{GesturePhase, PendingOutput, Point, TouchId};
