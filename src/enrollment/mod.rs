// Face capture for student registration.

#[cfg(feature = "desktop")]
pub mod commands;
pub mod face;

pub use face::{EnrollmentView, FaceEnrollment};
