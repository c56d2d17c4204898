//! The roster table: rows, their toggle buttons, and loading a session's
//! roster from the server.

use serde::Serialize;
use tracing::{info, warn};

use crate::api::AttendanceApi;
use crate::model::{AttendanceId, AttendanceRecord, SessionKey};
use crate::view::Tone;

const EMPTY_TITLE: &str = "No students found for this course";
const EMPTY_HINT: &str = "Students must be enrolled in the course to appear here";
const LOAD_FAILED_TITLE: &str = "Error loading students";
const UNKNOWN_ERROR: &str = "An unknown error occurred";
const UNREACHABLE: &str = "Could not connect to the server. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    pub label: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleButton {
    pub label: String,
    pub icon: String,
    pub tone: Tone,
    /// State a click on this button asks the server for.
    pub target_state: bool,
}

/// One displayed attendance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRow {
    pub record: AttendanceRecord,
    pub status: StatusBadge,
    /// Text of the time-in cell, `None` when the table has no such column.
    pub time_cell: Option<String>,
    pub toggle: ToggleButton,
}

impl RosterRow {
    /// Build a row with its toggle wired. Static and loaded rows both go
    /// through here.
    pub fn new(record: AttendanceRecord, show_time: bool) -> Self {
        let mut row = Self {
            status: status_badge(record.is_present),
            time_cell: None,
            toggle: toggle_button(record.is_present),
            record,
        };
        row.refresh_time_cell(show_time);
        row
    }

    pub fn id(&self) -> &AttendanceId {
        &self.record.id
    }

    /// Apply a server-confirmed state.
    pub fn apply_confirmed(&mut self, is_present: bool, time_in: Option<String>) {
        let show_time = self.time_cell.is_some();
        self.record.is_present = is_present;
        self.record.time_in = time_in;
        self.status = status_badge(is_present);
        self.toggle = toggle_button(is_present);
        self.refresh_time_cell(show_time);
    }

    fn refresh_time_cell(&mut self, show_time: bool) {
        self.time_cell = show_time.then(|| {
            self.record
                .time_in
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "-".to_string())
        });
    }
}

fn status_badge(is_present: bool) -> StatusBadge {
    if is_present {
        StatusBadge {
            label: "Present".to_string(),
            tone: Tone::Success,
        }
    } else {
        StatusBadge {
            label: "Absent".to_string(),
            tone: Tone::Danger,
        }
    }
}

fn toggle_button(is_present: bool) -> ToggleButton {
    if is_present {
        ToggleButton {
            label: "Mark Absent".to_string(),
            icon: "times".to_string(),
            tone: Tone::Danger,
            target_state: false,
        }
    } else {
        ToggleButton {
            label: "Mark Present".to_string(),
            icon: "check".to_string(),
            tone: Tone::Success,
            target_state: true,
        }
    }
}

/// What the table body shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RosterState {
    Loading,
    Loaded,
    Empty { title: String, hint: String },
    Failed { title: String, message: String },
}

/// A session's attendance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterTable {
    pub session_key: SessionKey,
    pub show_time: bool,
    pub state: RosterState,
    pub rows: Vec<RosterRow>,
}

impl RosterTable {
    /// A table waiting for its first load.
    pub fn loading(session_key: SessionKey, show_time: bool) -> Self {
        Self {
            session_key,
            show_time,
            state: RosterState::Loading,
            rows: Vec::new(),
        }
    }

    pub fn row(&self, id: &AttendanceId) -> Option<&RosterRow> {
        self.rows.iter().find(|r| r.id() == id)
    }

    pub fn row_mut(&mut self, id: &AttendanceId) -> Option<&mut RosterRow> {
        self.rows.iter_mut().find(|r| r.id() == id)
    }

    /// Fetch the roster and replace the table body.
    pub async fn load(&mut self, api: &dyn AttendanceApi) {
        self.state = RosterState::Loading;
        match api.fetch_roster(&self.session_key).await {
            Ok(response) if response.success => {
                info!(
                    "loaded {} students for session {}",
                    response.students.len(),
                    self.session_key
                );
                self.replace_rows(response.students.into_iter().map(Into::into).collect());
            }
            Ok(response) => {
                let message = response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
                warn!("roster load for session {} rejected: {message}", self.session_key);
                self.fail(message);
            }
            Err(e) => {
                warn!("roster load for session {} failed: {e}", self.session_key);
                self.fail(UNREACHABLE.to_string());
            }
        }
    }

    fn replace_rows(&mut self, records: Vec<AttendanceRecord>) {
        let show_time = self.show_time;
        self.rows = records
            .into_iter()
            .map(|record| RosterRow::new(record, show_time))
            .collect();
        self.state = if self.rows.is_empty() {
            RosterState::Empty {
                title: EMPTY_TITLE.to_string(),
                hint: EMPTY_HINT.to_string(),
            }
        } else {
            RosterState::Loaded
        };
    }

    fn fail(&mut self, message: String) {
        self.rows.clear();
        self.state = RosterState::Failed {
            title: LOAD_FAILED_TITLE.to_string(),
            message,
        };
    }
}
