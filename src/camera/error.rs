use std::time::Duration;

use thiserror::Error;

/// Camera subsystem errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("no camera device found")]
    NoDevice,

    #[error("camera access is not supported: {0}")]
    Unsupported(String),

    #[error("camera did not start within {0:?}")]
    StartupTimeout(Duration),

    #[error("camera produces no frames ({0:?} timeout)")]
    NoFrames(Duration),

    #[error("camera session has been released")]
    Released,

    #[error("frame read failed: {0}")]
    FrameRead(String),

    #[error("still image encoding failed: {0}")]
    Encode(String),
}

impl CameraError {
    /// Whether the device itself could not be acquired or has stopped
    /// delivering frames, as opposed to a one-off sampling failure.
    pub fn is_device_unavailable(&self) -> bool {
        !matches!(self, Self::Encode(_))
    }

    /// Short message for the camera error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::PermissionDenied(_) => {
                "Could not access the camera. Please check permissions.".to_string()
            }
            Self::NoDevice => "No camera was found on this device.".to_string(),
            Self::Unsupported(_) => "This environment doesn't support camera access".to_string(),
            Self::Encode(_) => "Could not capture an image from the camera.".to_string(),
            other => format!("Camera error occurred: {other}"),
        }
    }
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CameraError>;
