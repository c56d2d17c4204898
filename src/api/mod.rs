// Attendance server API: wire types, trait seam, and HTTP client.

pub mod client;
pub mod http;
#[cfg(test)]
pub mod mock;
pub mod types;

pub use client::AttendanceApi;
pub use http::HttpAttendanceApi;
