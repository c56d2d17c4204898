//! Scripted in-memory `AttendanceApi` for controller tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::api::client::AttendanceApi;
use crate::api::types::{RecognitionResponse, RosterResponse, ToggleResponse};
use crate::error::{AttendanceError, Result};
use crate::model::{AttendanceId, SessionKey};

#[derive(Default)]
pub struct MockApi {
    pub toggles: Mutex<VecDeque<Result<ToggleResponse>>>,
    pub rosters: Mutex<VecDeque<Result<RosterResponse>>>,
    pub recognitions: Mutex<VecDeque<Result<RecognitionResponse>>>,
    /// Every toggle request as `(id, desired_state)`.
    pub toggle_calls: Mutex<Vec<(AttendanceId, bool)>>,
    /// Every submitted image data URL.
    pub submitted: Mutex<Vec<(SessionKey, String)>>,
    pub roster_calls: AtomicUsize,
    /// When set, `submit_capture` waits for a permit before answering.
    pub submit_gate: Option<Arc<Semaphore>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `submit_capture` block until a permit is added to the gate.
    pub fn gated() -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        (
            Self {
                submit_gate: Some(Arc::clone(&gate)),
                ..Self::default()
            },
            gate,
        )
    }

    pub fn push_toggle(&self, response: Result<ToggleResponse>) {
        self.toggles.lock().push_back(response);
    }

    pub fn push_roster(&self, response: Result<RosterResponse>) {
        self.rosters.lock().push_back(response);
    }

    pub fn push_recognition(&self, response: Result<RecognitionResponse>) {
        self.recognitions.lock().push_back(response);
    }

    pub fn submit_count(&self) -> usize {
        self.submitted.lock().len()
    }
}

fn exhausted<T>(what: &str) -> Result<T> {
    Err(AttendanceError::Transport(format!("no scripted {what} response")))
}

#[async_trait]
impl AttendanceApi for MockApi {
    async fn toggle_attendance(
        &self,
        id: &AttendanceId,
        present: bool,
    ) -> Result<ToggleResponse> {
        self.toggle_calls.lock().push((id.clone(), present));
        let next = self.toggles.lock().pop_front();
        next.unwrap_or_else(|| exhausted("toggle"))
    }

    async fn fetch_roster(&self, _session: &SessionKey) -> Result<RosterResponse> {
        self.roster_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.rosters.lock().pop_front();
        next.unwrap_or_else(|| exhausted("roster"))
    }

    async fn submit_capture(
        &self,
        session: &SessionKey,
        image_data: String,
    ) -> Result<RecognitionResponse> {
        self.submitted.lock().push((session.clone(), image_data));
        if let Some(gate) = &self.submit_gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| AttendanceError::Transport(e.to_string()))?;
            permit.forget();
        }
        let next = self.recognitions.lock().pop_front();
        next.unwrap_or_else(|| exhausted("recognition"))
    }
}
