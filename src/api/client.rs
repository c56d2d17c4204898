use async_trait::async_trait;

use crate::api::types::{RecognitionResponse, RosterResponse, ToggleResponse};
use crate::error::Result;
use crate::model::{AttendanceId, SessionKey};

/// The three server endpoints the client talks to.
///
/// Implementations return `Err` only for transport problems (connection,
/// timeout, HTTP status, undecodable body). A decoded `success: false` is
/// returned as `Ok` and interpreted by the calling controller.
#[async_trait]
pub trait AttendanceApi: Send + Sync {
    /// Set one record's presence flag.
    async fn toggle_attendance(&self, id: &AttendanceId, present: bool)
        -> Result<ToggleResponse>;

    /// Fetch every record of a session.
    async fn fetch_roster(&self, session: &SessionKey) -> Result<RosterResponse>;

    /// Submit a still (as a data URL) for recognition.
    async fn submit_capture(
        &self,
        session: &SessionKey,
        image_data: String,
    ) -> Result<RecognitionResponse>;
}
