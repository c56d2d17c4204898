// Camera domain: acquisition, live frames, and still capture.

pub mod backend;
#[cfg(feature = "desktop")]
pub mod commands;
pub mod compress;
pub mod dummy;
pub mod error;
pub mod manager;
#[cfg(feature = "native-camera")]
pub mod native;
pub mod session;
pub mod types;
