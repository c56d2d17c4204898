use std::sync::Arc;

use tracing::{info, warn};

use crate::api::AttendanceApi;
use crate::roster::table::RosterRow;
use crate::view::{Notice, UserPrompt};

const GENERIC_FAILURE: &str = "An error occurred. Please try again.";
const DEFAULT_REJECTION: &str = "Attendance could not be updated";

/// How one toggle click ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
    /// The server confirmed; the row now shows this state.
    Confirmed { is_present: bool },
    /// The server answered `success: false`; the row is unchanged.
    Rejected { message: String },
    /// The request never produced an answer; the row is unchanged.
    Unreachable,
    /// The server claimed success without saying which state it stored;
    /// the row is unchanged.
    Malformed,
}

/// Flips one record's presence through the server.
///
/// The row is only ever updated from the server's response, never
/// optimistically.
pub struct ToggleController {
    api: Arc<dyn AttendanceApi>,
    prompt: Arc<dyn UserPrompt>,
}

impl ToggleController {
    pub fn new(api: Arc<dyn AttendanceApi>, prompt: Arc<dyn UserPrompt>) -> Self {
        Self { api, prompt }
    }

    pub async fn toggle(&self, row: &mut RosterRow) -> ToggleOutcome {
        let desired = row.toggle.target_state;
        let question = format!(
            "Are you sure you want to mark {} as {}?",
            row.record.student_name,
            if desired { "present" } else { "absent" }
        );
        if !self.prompt.confirm(&question).await {
            return ToggleOutcome::Cancelled;
        }

        match self.api.toggle_attendance(row.id(), desired).await {
            Ok(response) if response.success => {
                let Some(is_present) = response.is_present else {
                    warn!(
                        "toggle of record {} succeeded without a confirmed state",
                        row.id()
                    );
                    self.prompt.notify(&Notice::error(GENERIC_FAILURE));
                    return ToggleOutcome::Malformed;
                };
                let state = if is_present { "present" } else { "absent" };
                info!("record {} confirmed {state}", row.id());
                row.apply_confirmed(is_present, response.time_in);
                let message = response
                    .message
                    .unwrap_or_else(|| format!("{} marked {state}", row.record.student_name));
                self.prompt.notify(&Notice::success(message));
                ToggleOutcome::Confirmed { is_present }
            }
            Ok(response) => {
                let message = response
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_REJECTION.to_string());
                warn!("toggle of record {} rejected: {message}", row.id());
                self.prompt.notify(&Notice::error(format!("Error: {message}")));
                ToggleOutcome::Rejected { message }
            }
            Err(e) => {
                warn!("toggle of record {} failed: {e}", row.id());
                self.prompt.notify(&Notice::error(GENERIC_FAILURE));
                ToggleOutcome::Unreachable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockApi;
    use crate::api::types::ToggleResponse;
    use crate::error::AttendanceError;
    use crate::model::{AttendanceId, AttendanceRecord};
    use crate::view::recording::ScriptedPrompt;
    use crate::view::Tone;

    fn row(id: &str, present: bool) -> RosterRow {
        RosterRow::new(
            AttendanceRecord {
                id: AttendanceId::new(id),
                student_name: "Asha".to_string(),
                roll_number: "CS-01".to_string(),
                is_present: present,
                time_in: present.then(|| "09:00:12".to_string()),
            },
            true,
        )
    }

    fn confirmed(is_present: bool, message: &str) -> ToggleResponse {
        ToggleResponse {
            success: true,
            message: Some(message.to_string()),
            is_present: Some(is_present),
            time_in: is_present.then(|| "10:15:00".to_string()),
        }
    }

    fn setup(prompt: ScriptedPrompt) -> (Arc<MockApi>, Arc<ScriptedPrompt>, ToggleController) {
        let api = Arc::new(MockApi::new());
        let prompt = Arc::new(prompt);
        let controller = ToggleController::new(api.clone(), prompt.clone());
        (api, prompt, controller)
    }

    #[tokio::test]
    async fn present_to_absent_updates_from_response() {
        let (api, prompt, controller) = setup(ScriptedPrompt::default());
        api.push_toggle(Ok(confirmed(false, "Marked absent")));
        let mut row = row("42", true);

        let outcome = controller.toggle(&mut row).await;
        assert_eq!(outcome, ToggleOutcome::Confirmed { is_present: false });
        assert_eq!(row.status.label, "Absent");
        assert_eq!(row.toggle.label, "Mark Present");
        assert_eq!(row.time_cell.as_deref(), Some("-"));

        assert_eq!(
            api.toggle_calls.lock().as_slice(),
            &[(AttendanceId::new("42"), false)]
        );
        assert_eq!(
            prompt.questions.lock().as_slice(),
            &["Are you sure you want to mark Asha as absent?".to_string()]
        );
        let notice = prompt.last_notice().unwrap();
        assert_eq!(notice.tone, Tone::Success);
        assert_eq!(notice.message, "Marked absent");
    }

    #[tokio::test]
    async fn declining_sends_nothing() {
        let (api, _prompt, controller) = setup(ScriptedPrompt::answering(&[false]));
        let mut row = row("42", true);
        let before = row.clone();

        assert_eq!(controller.toggle(&mut row).await, ToggleOutcome::Cancelled);
        assert!(api.toggle_calls.lock().is_empty());
        assert_eq!(row, before);
    }

    #[tokio::test]
    async fn alternating_toggles_show_last_response() {
        let (api, _prompt, controller) = setup(ScriptedPrompt::default());
        let n = 7;
        for i in 0..n {
            // Server alternates absent, present, absent...
            api.push_toggle(Ok(confirmed(i % 2 == 1, "ok")));
        }
        let mut row = row("7", true);

        for _ in 0..n {
            controller.toggle(&mut row).await;
        }

        let last_present = (n - 1) % 2 == 1;
        assert_eq!(row.record.is_present, last_present);
        assert_eq!(
            row.status.label,
            if last_present { "Present" } else { "Absent" }
        );
        let calls = api.toggle_calls.lock();
        assert_eq!(calls.len(), n);
        // Each request asks for the opposite of the previous confirmation.
        assert!(calls.iter().enumerate().all(|(i, (_, want))| *want == (i % 2 == 1)));
    }

    #[tokio::test]
    async fn row_follows_server_not_request() {
        let (api, _prompt, controller) = setup(ScriptedPrompt::default());
        // Asked for absent, server says still present.
        api.push_toggle(Ok(confirmed(true, "Already marked")));
        let mut row = row("42", true);

        controller.toggle(&mut row).await;
        assert_eq!(row.status.label, "Present");
        assert_eq!(row.time_cell.as_deref(), Some("10:15:00"));
    }

    #[tokio::test]
    async fn rejection_leaves_row_unchanged() {
        let (api, prompt, controller) = setup(ScriptedPrompt::default());
        api.push_toggle(Ok(ToggleResponse {
            success: false,
            message: Some("You do not have permission".into()),
            is_present: None,
            time_in: None,
        }));
        let mut row = row("42", true);
        let before = row.clone();

        let outcome = controller.toggle(&mut row).await;
        assert_eq!(
            outcome,
            ToggleOutcome::Rejected {
                message: "You do not have permission".into()
            }
        );
        assert_eq!(row, before);
        let notice = prompt.last_notice().unwrap();
        assert_eq!(notice.tone, Tone::Danger);
        assert_eq!(notice.message, "Error: You do not have permission");
    }

    #[tokio::test]
    async fn transport_failure_leaves_row_unchanged() {
        let (api, prompt, controller) = setup(ScriptedPrompt::default());
        api.push_toggle(Err(AttendanceError::Transport("timed out".into())));
        let mut row = row("42", false);
        let before = row.clone();

        assert_eq!(controller.toggle(&mut row).await, ToggleOutcome::Unreachable);
        assert_eq!(row, before);
        assert_eq!(
            prompt.last_notice().unwrap().message,
            "An error occurred. Please try again."
        );
    }

    #[tokio::test]
    async fn success_without_state_is_not_a_confirmation() {
        let (api, prompt, controller) = setup(ScriptedPrompt::default());
        let response: ToggleResponse =
            serde_json::from_str(r#"{"success":true,"message":"ok"}"#).unwrap();
        api.push_toggle(Ok(response));
        let mut row = row("42", false);
        let before = row.clone();

        assert_eq!(controller.toggle(&mut row).await, ToggleOutcome::Malformed);
        assert_eq!(row, before);
        assert_eq!(row.status.label, "Absent");
        let notice = prompt.last_notice().unwrap();
        assert_eq!(notice.tone, Tone::Danger);
        assert_eq!(notice.message, "An error occurred. Please try again.");
    }

    #[tokio::test]
    async fn rejection_without_message_uses_default_text() {
        let (api, prompt, controller) = setup(ScriptedPrompt::default());
        api.push_toggle(Ok(ToggleResponse {
            success: false,
            message: None,
            is_present: None,
            time_in: None,
        }));
        let mut row = row("42", true);

        let outcome = controller.toggle(&mut row).await;
        assert_eq!(
            outcome,
            ToggleOutcome::Rejected {
                message: "Attendance could not be updated".into()
            }
        );
        assert_eq!(
            prompt.last_notice().unwrap().message,
            "Error: Attendance could not be updated"
        );
    }
}
