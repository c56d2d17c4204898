use serde::Serialize;
use tracing::info;

use crate::camera::error::Result;
use crate::camera::session::CaptureSession;
use crate::camera::types::StillImage;

/// What the registration form's camera panel shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentView {
    /// Live video is showing (no still pending).
    pub live: bool,
    /// Data URL of the pending still.
    pub preview: Option<String>,
    pub capture_visible: bool,
    pub retake_visible: bool,
}

/// Holds a captured face still until the registration form is submitted.
pub struct FaceEnrollment {
    session: CaptureSession,
    pending: Option<StillImage>,
}

impl FaceEnrollment {
    pub fn new(session: CaptureSession) -> Self {
        Self {
            session,
            pending: None,
        }
    }

    /// Freeze the current frame as the pending face image.
    pub fn capture(&mut self) -> Result<EnrollmentView> {
        let still = self.session.capture_still_frame()?;
        info!(
            "face still captured ({}x{}, {} bytes)",
            still.width,
            still.height,
            still.jpeg.len()
        );
        self.pending = Some(still);
        Ok(self.view())
    }

    /// Discard the pending image and go back to live video.
    pub fn retake(&mut self) -> EnrollmentView {
        self.pending = None;
        self.view()
    }

    /// Value for the form's face data field.
    pub fn face_data(&self) -> Option<String> {
        self.pending.as_ref().map(StillImage::to_data_url)
    }

    pub fn view(&self) -> EnrollmentView {
        let preview = self.face_data();
        EnrollmentView {
            live: preview.is_none(),
            capture_visible: preview.is_none(),
            retake_visible: preview.is_some(),
            preview,
        }
    }

    pub fn release(&mut self) {
        self.pending = None;
        self.session.release_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::dummy::DummyBackend;
    use crate::camera::error::CameraError;
    use crate::camera::manager::CameraManager;
    use crate::camera::session::{SessionTimeouts, StillOptions};
    use crate::camera::types::CaptureConstraints;
    use std::sync::Arc;
    use std::time::Duration;

    fn enrollment() -> FaceEnrollment {
        let manager = CameraManager::new(
            Arc::new(DummyBackend::new()),
            StillOptions::default(),
            SessionTimeouts {
                startup: Duration::from_millis(500),
                first_frame: Duration::from_millis(500),
                poll_interval: Duration::from_millis(5),
            },
        );
        let session = manager
            .acquire(&CaptureConstraints {
                width: 32,
                height: 24,
                fps: 200,
                ..CaptureConstraints::default()
            })
            .unwrap();
        FaceEnrollment::new(session)
    }

    #[test]
    fn starts_live_with_capture_button() {
        let face = enrollment();
        let view = face.view();
        assert!(view.live);
        assert!(view.capture_visible);
        assert!(!view.retake_visible);
        assert_eq!(face.face_data(), None);
    }

    #[test]
    fn capture_holds_still_and_swaps_buttons() {
        let mut face = enrollment();
        let view = face.capture().unwrap();
        assert!(!view.live);
        assert!(!view.capture_visible);
        assert!(view.retake_visible);
        let data = face.face_data().unwrap();
        assert!(data.starts_with("data:image/jpeg;base64,"));
        assert_eq!(view.preview.as_deref(), Some(data.as_str()));
    }

    #[test]
    fn retake_clears_face_data() {
        let mut face = enrollment();
        face.capture().unwrap();
        let view = face.retake();
        assert!(view.live);
        assert!(view.capture_visible);
        assert_eq!(face.face_data(), None);
    }

    #[test]
    fn capture_after_release_fails() {
        let mut face = enrollment();
        face.release();
        assert_eq!(face.capture().unwrap_err(), CameraError::Released);
        assert_eq!(face.face_data(), None);
    }
}
