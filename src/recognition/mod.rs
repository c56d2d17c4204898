// Capture and recognition: controller state machine and result rendering.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod controller;
pub mod render;
pub mod state;

pub use controller::{CaptureController, CaptureOutcome, CaptureStatus};
