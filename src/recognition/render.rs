//! Turns recognition outcomes into view models. No I/O, no state.

use serde::Serialize;

use crate::camera::error::CameraError;
use crate::error::AttendanceError;
use crate::model::RecognitionResult;
use crate::view::Tone;

const CAPTURE_LABEL: &str = "Capture Attendance";
const PROCESSING_LABEL: &str = "Processing...";
const DEFAULT_FAILURE: &str = "Failed to process attendance";
const NETWORK_FAILURE: &str = "Network error occurred";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Banner {
    pub tone: Tone,
    pub message: String,
}

/// One row of the recognized-students list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedEntry {
    pub name: String,
    pub roll_number: String,
    /// Confidence text, or "Present" when the server sent none.
    pub badge: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAction {
    /// Take another still with the current session.
    Capture,
    /// Acquire the camera again before capturing.
    ReacquireCamera,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RetryControl {
    pub label: String,
    pub action: RetryAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedImage {
    pub title: String,
    /// Data URL as supplied by the server.
    pub src: String,
}

/// Everything the results panel shows after one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionView {
    pub banner: Banner,
    pub entries: Vec<RecognizedEntry>,
    pub retry: RetryControl,
    pub annotated_image: Option<AnnotatedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraErrorView {
    pub message: String,
    pub detail: String,
    pub retry: RetryControl,
}

/// State of the capture button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaptureControlView {
    pub enabled: bool,
    pub busy: bool,
    pub label: String,
}

pub fn render_recognition(result: &RecognitionResult) -> RecognitionView {
    if !result.success {
        let message = result
            .message
            .clone()
            .unwrap_or_else(|| DEFAULT_FAILURE.to_string());
        return failure_view(message, RetryAction::Capture);
    }

    let count = result.students.len();
    let (tone, default_message) = if count > 0 {
        (
            Tone::Success,
            format!("Successfully recognized {count} students"),
        )
    } else {
        (
            Tone::Warning,
            "No students recognized in the image".to_string(),
        )
    };

    let entries = result
        .students
        .iter()
        .map(|student| RecognizedEntry {
            name: student.name.clone(),
            roll_number: student.roll_number.clone(),
            badge: student
                .confidence
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "Present".to_string()),
        })
        .collect();

    RecognitionView {
        banner: Banner {
            tone,
            message: result.message.clone().unwrap_or(default_message),
        },
        entries,
        retry: RetryControl {
            label: if count > 0 { "Capture Again" } else { "Try Again" }.to_string(),
            action: RetryAction::Capture,
        },
        annotated_image: result.annotated_image.as_ref().map(|src| AnnotatedImage {
            title: "Processed Image".to_string(),
            src: src.clone(),
        }),
    }
}

pub fn render_failure(error: &AttendanceError) -> RecognitionView {
    match error {
        AttendanceError::Application { message } if message.trim().is_empty() => {
            failure_view(DEFAULT_FAILURE.to_string(), RetryAction::Capture)
        }
        AttendanceError::Application { message } => {
            failure_view(message.clone(), RetryAction::Capture)
        }
        AttendanceError::Transport(_) => {
            failure_view(NETWORK_FAILURE.to_string(), RetryAction::Capture)
        }
        AttendanceError::DeviceUnavailable(camera) => {
            let action = if camera.is_device_unavailable() {
                RetryAction::ReacquireCamera
            } else {
                RetryAction::Capture
            };
            failure_view(camera.user_message(), action)
        }
    }
}

pub fn render_camera_error(error: &CameraError) -> CameraErrorView {
    CameraErrorView {
        message: error.user_message(),
        detail: error.to_string(),
        retry: RetryControl {
            label: "Try Again".to_string(),
            action: RetryAction::ReacquireCamera,
        },
    }
}

pub fn capture_control(busy: bool) -> CaptureControlView {
    CaptureControlView {
        enabled: !busy,
        busy,
        label: if busy { PROCESSING_LABEL } else { CAPTURE_LABEL }.to_string(),
    }
}

fn failure_view(message: String, action: RetryAction) -> RecognitionView {
    RecognitionView {
        banner: Banner {
            tone: Tone::Danger,
            message,
        },
        entries: Vec::new(),
        retry: RetryControl {
            label: "Try Again".to_string(),
            action,
        },
        annotated_image: None,
    }
}
