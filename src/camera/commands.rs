use std::sync::Arc;

use parking_lot::Mutex;
use tauri::{AppHandle, State};

use crate::desktop::{AppState, EventCaptureView};
use crate::model::SessionKey;
use crate::recognition::CaptureController;

/// The open capture view's controller, if any.
#[derive(Default)]
pub struct CaptureState {
    pub controller: Mutex<Option<Arc<CaptureController>>>,
}

impl CaptureState {
    pub fn current(&self) -> Result<Arc<CaptureController>, String> {
        self.controller
            .lock()
            .clone()
            .ok_or_else(|| "Camera is not started".to_string())
    }

    /// Release the camera of the open view, if any.
    pub fn close(&self) {
        let previous = self.controller.lock().take();
        if let Some(controller) = previous {
            controller.stop();
        }
    }
}

/// Open the capture view for a session: acquire the camera and make it the
/// target of `capture_attendance`.
#[tauri::command]
pub async fn start_camera(
    app: AppHandle,
    state: State<'_, AppState>,
    capture: State<'_, CaptureState>,
    session_key: String,
) -> Result<(), String> {
    capture.close();

    let constraints = state.config.get().camera.constraints;
    let controller = Arc::new(CaptureController::new(
        state.api(),
        Arc::new(EventCaptureView::new(app)),
        state.camera(),
        constraints,
        SessionKey::new(session_key),
    ));
    *capture.controller.lock() = Some(Arc::clone(&controller));

    controller.start_camera().await.map_err(|e| e.to_string())
}

/// Release the camera of the open capture view.
#[tauri::command]
pub async fn stop_camera(capture: State<'_, CaptureState>) -> Result<(), String> {
    capture.close();
    Ok(())
}

/// Release and re-acquire the camera after a device failure.
#[tauri::command]
pub async fn reacquire_camera(capture: State<'_, CaptureState>) -> Result<(), String> {
    let controller = capture.current()?;
    controller.reacquire().await.map_err(|e| e.to_string())
}
