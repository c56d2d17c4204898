//! Seams between the controllers and whatever draws the UI.
//!
//! Controllers never touch widgets directly; they hand finished view models
//! to these traits. The desktop shell forwards them to the webview as events,
//! tests record them.

use async_trait::async_trait;
use serde::Serialize;

use crate::recognition::render::{CameraErrorView, CaptureControlView, RecognitionView};

/// Colour/intent of a banner, badge or button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Info,
}

/// A transient message for the user (the toggle flow's alerts).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub tone: Tone,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tone: Tone::Danger,
            message: message.into(),
        }
    }
}

/// Receives the capture view's state changes.
pub trait CaptureView: Send + Sync {
    /// The capture button's enabled state and label.
    fn capture_control(&self, control: &CaptureControlView);

    /// Replace the recognition results panel.
    fn show_result(&self, view: &RecognitionView);

    /// The camera is live; hide any camera error.
    fn camera_ready(&self, device_name: &str);

    /// The camera could not be acquired or has stopped.
    fn camera_error(&self, view: &CameraErrorView);
}

/// Asks the user things and tells them things.
#[async_trait]
pub trait UserPrompt: Send + Sync {
    /// Ask a yes/no question. `false` means the user declined.
    async fn confirm(&self, message: &str) -> bool;

    fn notify(&self, notice: &Notice);
}
