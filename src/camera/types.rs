use base64::Engine;
use serde::{Deserialize, Serialize};

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Front camera, pointed at the operator.
    #[default]
    User,
    /// Rear camera, pointed at the room.
    Environment,
}

/// Requested capture parameters. Backends treat these as ideals and pick the
/// closest mode the device supports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureConstraints {
    pub width: u32,
    pub height: u32,
    pub facing_mode: FacingMode,
    pub fps: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            facing_mode: FacingMode::User,
            fps: 30,
        }
    }
}

/// A single captured frame from the camera.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data (RGB24).
    pub data: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Capture timestamp in microseconds since the session started.
    pub timestamp_us: u64,
}

impl Frame {
    /// Whether the buffer length matches `width * height * 3`.
    pub fn is_well_formed(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * 3
    }
}

/// A JPEG snapshot of one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StillImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl StillImage {
    /// Encode as a `data:image/jpeg;base64,...` URL, the form the recognition
    /// endpoint expects in `image_data`.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:image/jpeg;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.jpeg)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_constraints_request_720p_user_camera() {
        let c = CaptureConstraints::default();
        assert_eq!((c.width, c.height), (1280, 720));
        assert_eq!(c.facing_mode, FacingMode::User);
    }

    #[test]
    fn constraints_deserialise_with_missing_fields() {
        let c: CaptureConstraints =
            serde_json::from_str(r#"{"facingMode":"environment"}"#).unwrap();
        assert_eq!(c.facing_mode, FacingMode::Environment);
        assert_eq!(c.width, 1280);
    }

    #[test]
    fn still_image_data_url_has_jpeg_prefix() {
        let still = StillImage {
            jpeg: vec![0xFF, 0xD8, 0xFF, 0xD9],
            width: 1,
            height: 1,
        };
        assert_eq!(still.to_data_url(), "data:image/jpeg;base64,/9j/2Q==");
    }

    #[test]
    fn frame_well_formed_checks_rgb_length() {
        let frame = Frame {
            data: vec![0; 12],
            width: 2,
            height: 2,
            timestamp_us: 0,
        };
        assert!(frame.is_well_formed());
        let short = Frame {
            data: vec![0; 11],
            ..frame
        };
        assert!(!short.is_well_formed());
    }
}
