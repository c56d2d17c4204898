use std::time::{Duration, Instant};

use crate::camera::backend::{CameraBackend, FrameSource};
use crate::camera::error::{CameraError, Result};
use crate::camera::types::{CaptureConstraints, Frame};

const DUMMY_DEVICE_NAME: &str = "Dummy Test Camera";

/// A fake camera backend for running without real hardware.
///
/// Produces a moving RGB gradient at the requested resolution and frame
/// rate. Can also be told to fail acquisition, which is how the permission
/// and missing-device paths are exercised.
///
/// Enable via `DUMMY_CAMERA=1` environment variable.
pub struct DummyBackend {
    failure: Option<CameraError>,
}

impl DummyBackend {
    /// Create a backend whose device opens successfully.
    pub fn new() -> Self {
        Self { failure: None }
    }

    /// Create a backend whose `open` always fails with `error`.
    pub fn failing(error: CameraError) -> Self {
        Self {
            failure: Some(error),
        }
    }

    /// Whether the dummy camera is enabled via environment variable.
    pub fn is_enabled() -> bool {
        std::env::var("DUMMY_CAMERA").is_ok_and(|v| v == "1" || v == "true")
    }
}

impl Default for DummyBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraBackend for DummyBackend {
    fn name(&self) -> &str {
        "dummy"
    }

    fn open(&self, constraints: &CaptureConstraints) -> Result<Box<dyn FrameSource>> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        if constraints.width == 0 || constraints.height == 0 {
            return Err(CameraError::Unsupported(format!(
                "resolution {}x{}",
                constraints.width, constraints.height
            )));
        }

        let fps = constraints.fps.max(1);
        Ok(Box::new(GradientSource {
            width: constraints.width,
            height: constraints.height,
            interval: Duration::from_micros(1_000_000 / u64::from(fps)),
            started: Instant::now(),
            frame_index: 0,
        }))
    }
}

/// Synthetic source: a gradient that shifts by one pixel per frame.
struct GradientSource {
    width: u32,
    height: u32,
    interval: Duration,
    started: Instant,
    frame_index: u32,
}

impl FrameSource for GradientSource {
    fn device_name(&self) -> String {
        DUMMY_DEVICE_NAME.to_string()
    }

    fn read_frame(&mut self) -> Result<Frame> {
        if self.frame_index > 0 {
            std::thread::sleep(self.interval);
        }
        let shift = self.frame_index;
        self.frame_index = self.frame_index.wrapping_add(1);

        Ok(Frame {
            data: gradient(self.width, self.height, shift),
            width: self.width,
            height: self.height,
            timestamp_us: self.started.elapsed().as_micros() as u64,
        })
    }
}

fn gradient(width: u32, height: u32, shift: u32) -> Vec<u8> {
    let mut data = Vec::with_capacity((width * height * 3) as usize);
    for y in 0..height {
        for x in 0..width {
            data.push((x.wrapping_add(shift) % 256) as u8); // R
            data.push((y % 256) as u8); // G
            data.push(128); // B
        }
    }
    data
}
