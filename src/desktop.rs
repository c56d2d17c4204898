//! Tauri bindings for the view seams: view models go to the webview as
//! events, confirmations go through native dialogs.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::Serialize;
use tauri::{AppHandle, Emitter};
use tauri_plugin_dialog::{DialogExt, MessageDialogButtons, MessageDialogKind};

use crate::api::{AttendanceApi, HttpAttendanceApi};
use crate::camera::manager::CameraManager;
use crate::config::{ClientConfig, ConfigStore};
use crate::error::Result;
use crate::recognition::render::{CameraErrorView, CaptureControlView, RecognitionView};
use crate::view::{CaptureView, Notice, UserPrompt};

/// Services shared by every command.
///
/// The HTTP client and camera manager are rebuilt when the configuration
/// changes. Commands take a handle for the duration of one call, so a
/// reload never waits on an outstanding request.
pub struct AppState {
    pub config: Arc<ConfigStore>,
    api: RwLock<Arc<dyn AttendanceApi>>,
    camera: RwLock<CameraManager>,
}

impl AppState {
    pub fn new(config: Arc<ConfigStore>) -> Result<Self> {
        let current = config.get();
        let (api, camera) = services(&current)?;
        tracing::info!(
            "Attendance server {} (camera backend: {})",
            current.base_url,
            camera.backend_name()
        );
        Ok(Self {
            config,
            api: RwLock::new(api),
            camera: RwLock::new(camera),
        })
    }

    pub fn api(&self) -> Arc<dyn AttendanceApi> {
        Arc::clone(&self.api.read())
    }

    pub fn camera(&self) -> CameraManager {
        self.camera.read().clone()
    }

    /// Rebuild the services from `config`. Views already open keep the
    /// services they started with.
    pub fn reload(&self, config: &ClientConfig) -> Result<()> {
        let (api, camera) = services(config)?;
        *self.api.write() = api;
        *self.camera.write() = camera;
        tracing::info!("Attendance server is now {}", config.base_url);
        Ok(())
    }
}

fn services(config: &ClientConfig) -> Result<(Arc<dyn AttendanceApi>, CameraManager)> {
    let api = HttpAttendanceApi::new(config)?;
    let camera = CameraManager::new(
        CameraManager::platform_backend(),
        config.camera.still_options(),
        config.camera.timeouts(),
    );
    Ok((Arc::new(api), camera))
}

/// Emit `payload` as event `name`, logging delivery failures.
pub fn emit<S: Serialize + Clone>(app: &AppHandle, name: &str, payload: S) {
    if let Err(e) = app.emit(name, payload) {
        tracing::warn!("Failed to emit {name} event: {e}");
    }
}

/// Forwards capture view updates to the frontend.
pub struct EventCaptureView {
    app: AppHandle,
}

impl EventCaptureView {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

impl CaptureView for EventCaptureView {
    fn capture_control(&self, control: &CaptureControlView) {
        emit(&self.app, "capture-control", control);
    }

    fn show_result(&self, view: &RecognitionView) {
        emit(&self.app, "recognition-result", view);
    }

    fn camera_ready(&self, device_name: &str) {
        emit(&self.app, "camera-ready", device_name);
    }

    fn camera_error(&self, view: &CameraErrorView) {
        emit(&self.app, "camera-error", view);
    }
}

/// Native confirm dialogs; notices go to the frontend as events.
pub struct DialogPrompt {
    app: AppHandle,
}

impl DialogPrompt {
    pub fn new(app: AppHandle) -> Self {
        Self { app }
    }
}

#[async_trait]
impl UserPrompt for DialogPrompt {
    async fn confirm(&self, message: &str) -> bool {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.app
            .dialog()
            .message(message)
            .title("Confirm")
            .kind(MessageDialogKind::Warning)
            .buttons(MessageDialogButtons::OkCancel)
            .show(move |accepted| {
                let _ = tx.send(accepted);
            });
        rx.await.unwrap_or(false)
    }

    fn notify(&self, notice: &Notice) {
        emit(&self.app, "notice", notice);
    }
}
