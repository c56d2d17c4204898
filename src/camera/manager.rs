use std::sync::Arc;

use crate::camera::backend::{CameraBackend, NullBackend};
use crate::camera::dummy::DummyBackend;
use crate::camera::error::{CameraError, Result};
use crate::camera::session::{CaptureSession, SessionTimeouts, StillOptions};
use crate::camera::types::CaptureConstraints;

/// Acquires capture sessions from a backend.
#[derive(Clone)]
pub struct CameraManager {
    backend: Arc<dyn CameraBackend>,
    still: StillOptions,
    timeouts: SessionTimeouts,
}

impl CameraManager {
    pub fn new(
        backend: Arc<dyn CameraBackend>,
        still: StillOptions,
        timeouts: SessionTimeouts,
    ) -> Self {
        Self {
            backend,
            still,
            timeouts,
        }
    }

    /// Pick the camera backend for the current build.
    ///
    /// When `DUMMY_CAMERA=1` is set, a simulated camera is used instead.
    pub fn platform_backend() -> Arc<dyn CameraBackend> {
        if DummyBackend::is_enabled() {
            return Arc::new(DummyBackend::new());
        }

        #[cfg(feature = "native-camera")]
        {
            Arc::new(crate::camera::native::NativeBackend)
        }

        #[cfg(not(feature = "native-camera"))]
        {
            Arc::new(NullBackend)
        }
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Acquire a device matching `constraints`. Blocks until the first frame
    /// arrives or a timeout expires.
    pub fn acquire(&self, constraints: &CaptureConstraints) -> Result<CaptureSession> {
        CaptureSession::start(
            Arc::clone(&self.backend),
            constraints.clone(),
            self.still,
            self.timeouts,
        )
        .inspect_err(|e| tracing::warn!("camera acquisition failed: {e}"))
    }

    /// [`acquire`](Self::acquire) on the blocking pool, for async callers.
    pub async fn acquire_async(&self, constraints: CaptureConstraints) -> Result<CaptureSession> {
        let manager = self.clone();
        tokio::task::spawn_blocking(move || manager.acquire(&constraints))
            .await
            .map_err(|e| CameraError::Unsupported(format!("acquisition task failed: {e}")))?
    }
}

impl Default for CameraManager {
    fn default() -> Self {
        Self::new(
            Arc::new(NullBackend),
            StillOptions::default(),
            SessionTimeouts::default(),
        )
    }
}
