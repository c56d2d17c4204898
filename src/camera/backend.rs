use crate::camera::error::Result;
use crate::camera::types::{CaptureConstraints, Frame};

/// Platform-agnostic camera backend trait.
///
/// `open` is always called on the session's capture thread, so the returned
/// source does not need to be `Send`. Native webcam APIs frequently hand out
/// thread-bound handles.
pub trait CameraBackend: Send + Sync {
    /// Human-readable backend name for logs.
    fn name(&self) -> &str;

    /// Open the device that best matches `constraints`.
    fn open(&self, constraints: &CaptureConstraints) -> Result<Box<dyn FrameSource>>;
}

/// A live, opened capture device.
pub trait FrameSource {
    /// Friendly device name.
    fn device_name(&self) -> String;

    /// Block until the next frame is available and return it as RGB24.
    fn read_frame(&mut self) -> Result<Frame>;

    /// Stop the underlying device track. Called once when the capture loop
    /// exits.
    fn close(&mut self) {}
}

/// Backend used where no camera API is available.
pub struct NullBackend;

impl CameraBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn open(&self, _constraints: &CaptureConstraints) -> Result<Box<dyn FrameSource>> {
        Err(crate::camera::error::CameraError::Unsupported(
            "no camera backend for this platform".to_string(),
        ))
    }
}
