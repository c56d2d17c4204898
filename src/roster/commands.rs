use std::sync::Arc;

use tauri::{AppHandle, State};

use crate::desktop::{emit, AppState, DialogPrompt};
use crate::model::{AttendanceId, SessionKey};
use crate::roster::{RosterBook, RosterRow, RosterTable, ToggleController};

/// Fetch a session's roster, replacing any table already shown for it.
#[tauri::command]
pub async fn load_roster(
    app: AppHandle,
    state: State<'_, AppState>,
    rosters: State<'_, RosterBook>,
    session_key: String,
    show_time: Option<bool>,
) -> Result<RosterTable, String> {
    let key = SessionKey::new(session_key);
    let show_time = show_time.unwrap_or(true);
    emit(&app, "roster-updated", RosterTable::loading(key.clone(), show_time));

    let api = state.api();
    let table = rosters.load(api.as_ref(), key, show_time).await;
    emit(&app, "roster-updated", &table);
    Ok(table)
}

/// Ask for confirmation and flip one record's presence.
#[tauri::command]
pub async fn toggle_attendance(
    app: AppHandle,
    state: State<'_, AppState>,
    rosters: State<'_, RosterBook>,
    session_key: String,
    attendance_id: String,
) -> Result<RosterRow, String> {
    let key = SessionKey::new(session_key);
    let id = AttendanceId::new(attendance_id);
    let controller = ToggleController::new(state.api(), Arc::new(DialogPrompt::new(app.clone())));

    let (_, row) = rosters
        .toggle(&controller, &key, &id)
        .await
        .ok_or_else(|| format!("No attendance record {id} in session {key}"))?;

    if let Some(table) = rosters.table(&key) {
        emit(&app, "roster-updated", table);
    }
    Ok(row)
}
