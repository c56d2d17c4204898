use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::api::AttendanceApi;
use crate::camera::compress;
use crate::camera::error::CameraError;
use crate::camera::manager::CameraManager;
use crate::camera::session::CaptureSession;
use crate::camera::types::{CaptureConstraints, StillImage};
use crate::error::{AttendanceError, Result};
use crate::model::{RecognitionResult, SessionKey};
use crate::recognition::render::{
    capture_control, render_camera_error, render_failure, render_recognition,
};
use crate::recognition::state::CapturePhase;
use crate::view::CaptureView;

/// Snapshot of a capture view for the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureStatus {
    pub session_key: SessionKey,
    pub phase: CapturePhase,
    pub busy: bool,
    pub camera_active: bool,
}

/// How one call to [`CaptureController::capture`] ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureOutcome {
    /// A submission was already outstanding; nothing was sent.
    Ignored,
    Recognized(RecognitionResult),
    Failed(AttendanceError),
}

/// Drives the capture → submit → render cycle for one open camera view.
///
/// Owns the view's [`CaptureSession`]. At most one submission is in flight
/// at a time; a second trigger while one is outstanding is dropped.
pub struct CaptureController {
    api: Arc<dyn AttendanceApi>,
    view: Arc<dyn CaptureView>,
    camera: CameraManager,
    constraints: CaptureConstraints,
    session_key: SessionKey,
    session: Mutex<Option<CaptureSession>>,
    busy: AtomicBool,
    phase: Mutex<CapturePhase>,
}

impl CaptureController {
    pub fn new(
        api: Arc<dyn AttendanceApi>,
        view: Arc<dyn CaptureView>,
        camera: CameraManager,
        constraints: CaptureConstraints,
        session_key: SessionKey,
    ) -> Self {
        Self {
            api,
            view,
            camera,
            constraints,
            session_key,
            session: Mutex::new(None),
            busy: AtomicBool::new(false),
            phase: Mutex::new(CapturePhase::Idle),
        }
    }

    pub fn session_key(&self) -> &SessionKey {
        &self.session_key
    }

    pub fn phase(&self) -> CapturePhase {
        *self.phase.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    pub fn has_camera(&self) -> bool {
        self.session.lock().as_ref().is_some_and(|s| s.is_active())
    }

    pub fn status(&self) -> CaptureStatus {
        CaptureStatus {
            session_key: self.session_key.clone(),
            phase: self.phase(),
            busy: self.is_busy(),
            camera_active: self.has_camera(),
        }
    }

    /// Hand an already acquired session to the controller, releasing any
    /// previous one.
    pub fn attach(&self, session: CaptureSession) {
        self.view.camera_ready(session.device_name());
        let previous = self.session.lock().replace(session);
        drop(previous);
    }

    /// Acquire the camera and attach it. Failures are shown as a camera
    /// error and returned.
    pub async fn start_camera(&self) -> Result<()> {
        match self.camera.acquire_async(self.constraints.clone()).await {
            Ok(session) => {
                self.attach(session);
                Ok(())
            }
            Err(e) => {
                self.view.camera_error(&render_camera_error(&e));
                Err(e.into())
            }
        }
    }

    /// Release the current camera and acquire it again.
    pub async fn reacquire(&self) -> Result<()> {
        self.stop();
        self.start_camera().await
    }

    /// Release the camera. Safe to call at any time, including while a
    /// submission is outstanding, and more than once.
    pub fn stop(&self) {
        let session = self.session.lock().take();
        if let Some(mut session) = session {
            session.release_all();
        }
    }

    /// Run one capture cycle.
    pub async fn capture(&self) -> CaptureOutcome {
        let Some(_guard) = BusyGuard::acquire(self) else {
            debug!("capture ignored: a submission is already outstanding");
            return CaptureOutcome::Ignored;
        };

        self.set_phase(CapturePhase::Capturing);
        let still = match self.sample_still().await {
            Ok(still) => still,
            Err(e) => {
                if e.is_device_unavailable() {
                    self.view.camera_error(&render_camera_error(&e));
                }
                return self.fail(e.into());
            }
        };

        self.set_phase(CapturePhase::AwaitingResponse);
        info!(
            "submitting {}x{} still for session {}",
            still.width, still.height, self.session_key
        );
        let response = self
            .api
            .submit_capture(&self.session_key, still.to_data_url())
            .await;

        match response {
            Ok(response) if response.success => {
                let result = RecognitionResult::from(response);
                self.set_phase(CapturePhase::Success);
                info!(
                    "recognized {} students in session {}",
                    result.students.len(),
                    self.session_key
                );
                self.view.show_result(&render_recognition(&result));
                CaptureOutcome::Recognized(result)
            }
            Ok(response) => self.fail(AttendanceError::application(
                response.message.unwrap_or_default(),
            )),
            Err(e) => self.fail(e),
        }
    }

    /// Take the newest frame under the session lock, then encode it on the
    /// blocking pool with the lock released.
    async fn sample_still(&self) -> std::result::Result<StillImage, CameraError> {
        let (frame, options) = {
            let session = self.session.lock();
            let session = session.as_ref().ok_or(CameraError::Released)?;
            (session.latest_frame()?, session.still_options())
        };
        tokio::task::spawn_blocking(move || {
            compress::encode_still(&frame, options.jpeg_quality, options.max_width)
        })
        .await
        .map_err(|e| CameraError::Encode(format!("encoder task failed: {e}")))?
    }

    fn fail(&self, error: AttendanceError) -> CaptureOutcome {
        self.set_phase(CapturePhase::Failure);
        if error.is_recoverable() {
            warn!("capture failed for session {}: {error}", self.session_key);
        } else {
            error!("capture failed for session {}: {error}", self.session_key);
        }
        self.view.show_result(&render_failure(&error));
        CaptureOutcome::Failed(error)
    }

    fn set_phase(&self, next: CapturePhase) {
        let mut phase = self.phase.lock();
        if !phase.can_transition_to(next) {
            warn!("unexpected capture transition {:?} -> {next:?}", *phase);
        }
        *phase = next;
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Holds the busy flag for one capture cycle.
///
/// Dropping it returns the controller to `Idle` and re-enables the capture
/// control, whichever way the cycle ended (including cancellation).
struct BusyGuard<'a> {
    controller: &'a CaptureController,
}

impl<'a> BusyGuard<'a> {
    fn acquire(controller: &'a CaptureController) -> Option<Self> {
        controller
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        controller.view.capture_control(&capture_control(true));
        Some(Self { controller })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.controller.set_phase(CapturePhase::Idle);
        self.controller.busy.store(false, Ordering::Release);
        self.controller.view.capture_control(&capture_control(false));
    }
}
