use tauri::State;

use crate::camera::commands::CaptureState;
use crate::model::RecognitionResult;
use crate::recognition::{CaptureOutcome, CaptureStatus};

/// Capture a still and submit it for recognition.
///
/// Returns `None` when a submission was already outstanding. The rendered
/// result reaches the frontend through the `recognition-result` event either
/// way.
#[tauri::command]
pub async fn capture_attendance(
    capture: State<'_, CaptureState>,
) -> Result<Option<RecognitionResult>, String> {
    let controller = capture.current()?;
    match controller.capture().await {
        CaptureOutcome::Ignored => Ok(None),
        CaptureOutcome::Recognized(result) => Ok(Some(result)),
        CaptureOutcome::Failed(e) => Err(e.to_string()),
    }
}

/// Phase and camera state of the open capture view, if any.
#[tauri::command]
pub async fn get_capture_status(
    capture: State<'_, CaptureState>,
) -> Result<Option<CaptureStatus>, String> {
    Ok(capture
        .controller
        .lock()
        .as_ref()
        .map(|controller| controller.status()))
}
