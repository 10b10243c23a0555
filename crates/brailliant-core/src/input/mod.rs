//! Key input handling
//!
//! Turns raw press/release telemetry from the display into debounced
//! [`KeyCombination`] events: the tracker collapses overlapping presses and
//! releases into exactly one combination per physical gesture, and the
//! gesture builder classifies the finalized key set.

mod gesture;
mod keys;
mod tracker;

pub use gesture::{GestureConsumer, GestureOutcome, KeyCombination};
pub use keys::{KeyNameTable, DOT1_KEY, DOT8_KEY, FIRST_ROUTING_KEY, SPACE_KEY};
pub use tracker::KeyTracker;
