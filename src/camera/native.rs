//! Native webcam backend using nokhwa.

use std::time::Instant;

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::Camera;

use crate::camera::backend::{CameraBackend, FrameSource};
use crate::camera::error::{CameraError, Result};
use crate::camera::types::{CaptureConstraints, FacingMode, Frame};

/// Webcam access through the operating system's native capture API.
pub struct NativeBackend;

impl CameraBackend for NativeBackend {
    fn name(&self) -> &str {
        "native"
    }

    fn open(&self, constraints: &CaptureConstraints) -> Result<Box<dyn FrameSource>> {
        let devices = nokhwa::query(ApiBackend::Auto).map_err(map_nokhwa_error)?;
        if devices.is_empty() {
            return Err(CameraError::NoDevice);
        }

        // Facing mode is only a naming hint on desktop webcams.
        let wanted = match constraints.facing_mode {
            FacingMode::Environment => devices.iter().find(|d| {
                let name = d.human_name().to_lowercase();
                name.contains("back") || name.contains("rear")
            }),
            FacingMode::User => None,
        };
        let info = wanted.unwrap_or(&devices[0]);
        let name = info.human_name().to_string();
        let index = info.index().clone();

        let format = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(
            CameraFormat::new(
                Resolution::new(constraints.width, constraints.height),
                FrameFormat::MJPEG,
                constraints.fps,
            ),
        ));

        let mut camera = Camera::new(index, format).map_err(map_nokhwa_error)?;
        camera.open_stream().map_err(map_nokhwa_error)?;
        tracing::info!("opened webcam '{name}'");

        Ok(Box::new(NativeSource {
            name,
            camera,
            started: Instant::now(),
        }))
    }
}

struct NativeSource {
    name: String,
    camera: Camera,
    started: Instant,
}

impl FrameSource for NativeSource {
    fn device_name(&self) -> String {
        self.name.clone()
    }

    fn read_frame(&mut self) -> Result<Frame> {
        let buffer = self
            .camera
            .frame()
            .map_err(|e| CameraError::FrameRead(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::FrameRead(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());

        Ok(Frame {
            data: decoded.into_raw(),
            width,
            height,
            timestamp_us: self.started.elapsed().as_micros() as u64,
        })
    }

    fn close(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            tracing::warn!("failed to stop webcam '{}': {e}", self.name);
        }
    }
}

fn map_nokhwa_error(err: nokhwa::NokhwaError) -> CameraError {
    let text = err.to_string();
    let lower = text.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not authorized")
    {
        CameraError::PermissionDenied(text)
    } else if lower.contains("not found") || lower.contains("no device") {
        CameraError::NoDevice
    } else {
        CameraError::Unsupported(text)
    }
}
