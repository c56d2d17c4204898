// Client configuration: file-backed with environment overrides.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod error;
pub mod store;
pub mod types;

pub use store::ConfigStore;
pub use types::{CameraConfig, ClientConfig, EndpointConfig};
