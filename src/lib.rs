pub mod api;
pub mod camera;
pub mod config;
#[cfg(feature = "desktop")]
pub mod desktop;
pub mod enrollment;
pub mod error;
pub mod model;
pub mod recognition;
pub mod roster;
pub mod view;

#[cfg(feature = "desktop")]
pub use app::run;

#[cfg(feature = "desktop")]
mod app {
    use std::sync::Arc;

    use tauri::Manager;

    use crate::camera::commands::{reacquire_camera, start_camera, stop_camera, CaptureState};
    use crate::config::commands::{get_config, set_config};
    use crate::config::ConfigStore;
    use crate::desktop::AppState;
    use crate::enrollment::commands::{
        capture_face, close_face_capture, get_face_data, open_face_capture, retake_face,
        EnrollmentState,
    };
    use crate::recognition::commands::{capture_attendance, get_capture_status};
    use crate::roster::commands::{load_roster, toggle_attendance};
    use crate::roster::RosterBook;

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        tauri::Builder::default()
            .plugin(tauri_plugin_dialog::init())
            .manage(CaptureState::default())
            .manage(EnrollmentState::default())
            .manage(RosterBook::default())
            .invoke_handler(tauri::generate_handler![
                start_camera,
                stop_camera,
                reacquire_camera,
                capture_attendance,
                get_capture_status,
                load_roster,
                toggle_attendance,
                open_face_capture,
                capture_face,
                retake_face,
                get_face_data,
                close_face_capture,
                get_config,
                set_config,
            ])
            .setup(|app| {
                if cfg!(debug_assertions) {
                    app.handle().plugin(
                        tauri_plugin_log::Builder::new()
                            .targets([
                                tauri_plugin_log::Target::new(tauri_plugin_log::TargetKind::Stdout),
                                tauri_plugin_log::Target::new(
                                    tauri_plugin_log::TargetKind::Webview,
                                ),
                                tauri_plugin_log::Target::new(
                                    tauri_plugin_log::TargetKind::LogDir { file_name: None },
                                ),
                            ])
                            .level(log::LevelFilter::Debug)
                            .build(),
                    )?;
                }

                let config_path = app.path().app_data_dir()?.join("attendance.json");
                let config = Arc::new(ConfigStore::new(config_path));
                app.manage(AppState::new(config)?);
                Ok(())
            })
            .on_window_event(|window, event| {
                // The camera belongs to the main window's views.
                if window.label() == "main" {
                    if let tauri::WindowEvent::Destroyed = event {
                        window.state::<CaptureState>().close();
                        window.state::<EnrollmentState>().close();
                    }
                }
            })
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}
