use parking_lot::Mutex;
use tauri::State;

use crate::desktop::AppState;
use crate::enrollment::{EnrollmentView, FaceEnrollment};

#[derive(Default)]
pub struct EnrollmentState {
    pub enrollment: Mutex<Option<FaceEnrollment>>,
}

impl EnrollmentState {
    pub fn close(&self) {
        let previous = self.enrollment.lock().take();
        if let Some(mut enrollment) = previous {
            enrollment.release();
        }
    }
}

/// Acquire the camera for the registration form.
#[tauri::command]
pub async fn open_face_capture(
    state: State<'_, AppState>,
    enrollment: State<'_, EnrollmentState>,
) -> Result<EnrollmentView, String> {
    enrollment.close();
    let constraints = state.config.get().camera.constraints;
    let session = state
        .camera()
        .acquire_async(constraints)
        .await
        .map_err(|e| e.user_message())?;
    let face = FaceEnrollment::new(session);
    let view = face.view();
    *enrollment.enrollment.lock() = Some(face);
    Ok(view)
}

/// Freeze the current frame as the student's face image.
#[tauri::command]
pub async fn capture_face(
    enrollment: State<'_, EnrollmentState>,
) -> Result<EnrollmentView, String> {
    let mut guard = enrollment.enrollment.lock();
    let face = guard.as_mut().ok_or("Camera is not started")?;
    face.capture().map_err(|e| e.user_message())
}

/// Discard the captured face image and return to live video.
#[tauri::command]
pub async fn retake_face(
    enrollment: State<'_, EnrollmentState>,
) -> Result<EnrollmentView, String> {
    let mut guard = enrollment.enrollment.lock();
    let face = guard.as_mut().ok_or("Camera is not started")?;
    Ok(face.retake())
}

/// The pending face image as a data URL, for the registration form.
#[tauri::command]
pub async fn get_face_data(
    enrollment: State<'_, EnrollmentState>,
) -> Result<Option<String>, String> {
    Ok(enrollment
        .enrollment
        .lock()
        .as_ref()
        .and_then(FaceEnrollment::face_data))
}

#[tauri::command]
pub async fn close_face_capture(enrollment: State<'_, EnrollmentState>) -> Result<(), String> {
    enrollment.close();
    Ok(())
}
