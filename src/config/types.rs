use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::camera::session::{SessionTimeouts, StillOptions};
use crate::camera::types::CaptureConstraints;
use crate::config::error::{ConfigError, Result};

/// Path templates of the three endpoints. Placeholders are substituted with
/// URL-encoded values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointConfig {
    /// `{record_id}` and `{state}` (0 or 1).
    pub toggle: String,
    /// `{session_key}`.
    pub roster: String,
    /// `{session_key}`.
    pub recognize: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            toggle: "/toggle-attendance/{record_id}/{state}".to_string(),
            roster: "/roster/{session_key}".to_string(),
            recognize: "/auto-attendance/{session_key}".to_string(),
        }
    }
}

/// Camera and still-encoding settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraConfig {
    pub constraints: CaptureConstraints,
    pub jpeg_quality: u8,
    /// Stills wider than this are downscaled before upload; 0 disables.
    pub max_upload_width: u32,
    pub startup_timeout_secs: u64,
    pub first_frame_timeout_secs: u64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            constraints: CaptureConstraints::default(),
            jpeg_quality: 85,
            max_upload_width: 1280,
            startup_timeout_secs: 30,
            first_frame_timeout_secs: 5,
        }
    }
}

impl CameraConfig {
    pub fn still_options(&self) -> StillOptions {
        StillOptions {
            jpeg_quality: self.jpeg_quality,
            max_width: self.max_upload_width,
        }
    }

    pub fn timeouts(&self) -> SessionTimeouts {
        SessionTimeouts {
            startup: Duration::from_secs(self.startup_timeout_secs),
            first_frame: Duration::from_secs(self.first_frame_timeout_secs),
            ..SessionTimeouts::default()
        }
    }
}

/// Top-level client configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Scheme, host and optional path prefix of the attendance server.
    pub base_url: String,
    pub endpoints: EndpointConfig,
    pub request_timeout_secs: u64,
    pub camera: CameraConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            endpoints: EndpointConfig::default(),
            request_timeout_secs: 30,
            camera: CameraConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Reject values that would make every request or capture fail.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "baseUrl must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "requestTimeoutSecs must be positive".to_string(),
            ));
        }
        if !(1..=100).contains(&self.camera.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "camera.jpegQuality must be 1-100, got {}",
                self.camera.jpeg_quality
            )));
        }
        let c = &self.camera.constraints;
        if c.width == 0 || c.height == 0 || c.fps == 0 {
            return Err(ConfigError::Invalid(format!(
                "camera constraints must be non-zero, got {}x{}@{}",
                c.width, c.height, c.fps
            )));
        }
        for (name, template) in [
            ("toggle", &self.endpoints.toggle),
            ("roster", &self.endpoints.roster),
            ("recognize", &self.endpoints.recognize),
        ] {
            if !template.starts_with('/') {
                return Err(ConfigError::Invalid(format!(
                    "endpoints.{name} must start with '/', got '{template}'"
                )));
            }
        }
        Ok(())
    }
}
