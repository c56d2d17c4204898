use thiserror::Error;

use crate::camera::error::CameraError;

/// Errors surfaced by the attendance workflows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    /// Camera acquisition failed or the device stopped. Capture stays
    /// unavailable until the camera is reacquired.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(#[from] CameraError),

    /// The endpoint answered with `success: false`.
    #[error("{message}")]
    Application { message: String },

    /// Network failure, timeout, HTTP error status or malformed body.
    #[error("transport error: {0}")]
    Transport(String),
}

impl AttendanceError {
    pub fn application(message: impl Into<String>) -> Self {
        Self::Application {
            message: message.into(),
        }
    }

    /// Application and transport failures leave the workflow retriable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::DeviceUnavailable(_))
    }
}

impl From<reqwest::Error> for AttendanceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::Transport(format!("malformed response: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, AttendanceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_error_displays_server_message() {
        let err = AttendanceError::application("No image data received");
        assert_eq!(err.to_string(), "No image data received");
        assert!(err.is_recoverable());
    }

    #[test]
    fn camera_errors_convert_to_device_unavailable() {
        let err: AttendanceError = CameraError::NoDevice.into();
        assert!(matches!(err, AttendanceError::DeviceUnavailable(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn transport_errors_are_recoverable() {
        assert!(AttendanceError::Transport("connection refused".into()).is_recoverable());
    }
}
