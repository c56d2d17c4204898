use tauri::State;

use crate::config::ClientConfig;
use crate::desktop::AppState;

/// Current client configuration, after environment overrides.
#[tauri::command]
pub async fn get_config(state: State<'_, AppState>) -> Result<ClientConfig, String> {
    Ok(state.config.get())
}

/// Validate, persist and apply a new configuration.
///
/// Views opened after this call use the new server and camera settings.
#[tauri::command]
pub async fn set_config(
    state: State<'_, AppState>,
    config: ClientConfig,
) -> Result<ClientConfig, String> {
    let saved = state
        .config
        .update(|current| *current = config)
        .map_err(|e| e.to_string())?;
    state.reload(&saved).map_err(|e| e.to_string())?;
    Ok(saved)
}
