use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize a field that servers send either as a string or a number.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Repr::deserialize(deserializer)? {
        Repr::Text(s) => s,
        Repr::Int(i) => i.to_string(),
        Repr::Float(f) => f.to_string(),
    })
}

/// Opaque key of one attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AttendanceId(String);

impl<'de> Deserialize<'de> for AttendanceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(Self)
    }
}

impl AttendanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AttendanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies a scheduled class (timetable entry). Scopes roster and
/// recognition requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl<'de> Deserialize<'de> for SessionKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_number(deserializer).map(Self)
    }
}

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One student's attendance for a session. Only the server mutates it; the
/// client mirrors whatever the last confirmed response said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: AttendanceId,
    pub student_name: String,
    pub roll_number: String,
    pub is_present: bool,
    /// Time of marking, `HH:MM:SS`.
    pub time_in: Option<String>,
}

/// Recognition confidence as reported by the server.
///
/// Some deployments send a preformatted string (`"0.87"`), others a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Confidence {
    Score(f64),
    Label(String),
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Score(v) => write!(f, "{v:.2}"),
            Self::Label(s) => f.write_str(s),
        }
    }
}

/// One student the recognition service matched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedStudent {
    pub name: String,
    pub roll_number: String,
    pub confidence: Option<Confidence>,
}

/// Outcome of one capture submission. Replaced wholesale by the next one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionResult {
    pub success: bool,
    pub message: Option<String>,
    pub students: Vec<RecognizedStudent>,
    /// Data URL of the server's annotated copy of the submitted still.
    pub annotated_image: Option<String>,
}
