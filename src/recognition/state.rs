use serde::Serialize;

/// Where the capture controller is in one capture cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    #[default]
    Idle,
    Capturing,
    AwaitingResponse,
    Success,
    Failure,
}

impl CapturePhase {
    /// Legal edges of the cycle. Every phase may fall back to `Idle`.
    pub fn can_transition_to(self, next: CapturePhase) -> bool {
        use CapturePhase::*;
        matches!(
            (self, next),
            (Idle, Capturing)
                | (Capturing, AwaitingResponse)
                | (Capturing, Failure)
                | (AwaitingResponse, Success)
                | (AwaitingResponse, Failure)
                | (_, Idle)
        )
    }
}
