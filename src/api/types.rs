//! Request and response bodies of the attendance endpoints.
//!
//! Field names match the server's JSON exactly. Everything except `success`
//! is optional on the wire so that failure responses, which usually carry
//! only `success` and `message`, still decode.

use serde::{Deserialize, Serialize};

use crate::model::{
    string_or_number, AttendanceId, AttendanceRecord, Confidence, RecognitionResult,
    RecognizedStudent,
};

/// Response of `POST /toggle-attendance/{recordId}/{newState}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Confirmed presence. Failure responses usually omit it.
    #[serde(default)]
    pub is_present: Option<bool>,
    #[serde(default)]
    pub time_in: Option<String>,
}

/// One roster row as sent by `GET /roster/{sessionKey}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterStudent {
    #[serde(deserialize_with = "string_or_number")]
    pub roll_number: String,
    pub name: String,
    pub is_present: bool,
    pub attendance_id: AttendanceId,
    #[serde(default)]
    pub time_in: Option<String>,
}

impl From<RosterStudent> for AttendanceRecord {
    fn from(s: RosterStudent) -> Self {
        Self {
            id: s.attendance_id,
            student_name: s.name,
            roll_number: s.roll_number,
            is_present: s.is_present,
            time_in: s.time_in,
        }
    }
}

/// Response of `GET /roster/{sessionKey}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RosterResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub students: Vec<RosterStudent>,
}

/// Body of `POST /auto-attendance/{sessionKey}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionRequest {
    /// Still image as a `data:image/jpeg;base64,...` URL.
    pub image_data: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecognizedStudentWire {
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub roll_number: String,
    #[serde(default)]
    pub confidence: Option<Confidence>,
}

/// Response of `POST /auto-attendance/{sessionKey}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecognitionResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub recognized_students: Vec<RecognizedStudentWire>,
    #[serde(default)]
    pub annotated_image: Option<String>,
}

impl From<RecognitionResponse> for RecognitionResult {
    fn from(r: RecognitionResponse) -> Self {
        Self {
            success: r.success,
            message: r.message.filter(|m| !m.trim().is_empty()),
            students: r
                .recognized_students
                .into_iter()
                .map(|s| RecognizedStudent {
                    name: s.name,
                    roll_number: s.roll_number,
                    confidence: s.confidence,
                })
                .collect(),
            annotated_image: r.annotated_image.filter(|img| !img.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_response_decodes_success() {
        let json = r#"{"success":true,"message":"Marked absent","is_present":false,"time_in":null}"#;
        let resp: ToggleResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.is_present, Some(false));
        assert_eq!(resp.message.as_deref(), Some("Marked absent"));
        assert_eq!(resp.time_in, None);
    }

    #[test]
    fn toggle_failure_without_state_fields_decodes() {
        let json = r#"{"success":false,"message":"You do not have permission"}"#;
        let resp: ToggleResponse = serde_json::from_str(json).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.is_present, None);
    }

    #[test]
    fn roster_student_converts_to_record() {
        let json = r#"{"success":true,"students":[
            {"roll_number":"CS-01","name":"Asha","is_present":true,"attendance_id":7,"time_in":"09:01:44"}
        ]}"#;
        let resp: RosterResponse = serde_json::from_str(json).unwrap();
        let record = AttendanceRecord::from(resp.students[0].clone());
        assert_eq!(record.id.as_str(), "7");
        assert_eq!(record.student_name, "Asha");
        assert_eq!(record.time_in.as_deref(), Some("09:01:44"));
    }

    #[test]
    fn roster_failure_without_students_decodes_empty() {
        let resp: RosterResponse =
            serde_json::from_str(r#"{"success":false,"message":"no access"}"#).unwrap();
        assert!(resp.students.is_empty());
    }

    #[test]
    fn recognition_request_uses_image_data_field() {
        let req = RecognitionRequest {
            image_data: "data:image/jpeg;base64,AAAA".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["image_data"], "data:image/jpeg;base64,AAAA");
    }

    #[test]
    fn recognition_response_converts_mixed_confidence() {
        let json = r#"{
            "success": true,
            "message": "Successfully recognized 2 students",
            "recognized_students": [
                {"name": "A", "roll_number": "1", "confidence": "0.93"},
                {"name": "B", "roll_number": 2}
            ],
            "annotated_image": "data:image/jpeg;base64,BBBB"
        }"#;
        let resp: RecognitionResponse = serde_json::from_str(json).unwrap();
        let result = RecognitionResult::from(resp);
        assert_eq!(result.students.len(), 2);
        assert_eq!(
            result.students[0].confidence,
            Some(Confidence::Label("0.93".into()))
        );
        assert_eq!(result.students[1].roll_number, "2");
        assert_eq!(result.students[1].confidence, None);
        assert!(result.annotated_image.is_some());
    }

    #[test]
    fn blank_message_is_treated_as_absent() {
        let resp: RecognitionResponse =
            serde_json::from_str(r#"{"success":true,"message":"  ","recognized_students":[]}"#)
                .unwrap();
        assert_eq!(RecognitionResult::from(resp).message, None);
    }
}
