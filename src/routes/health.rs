//! Health check endpoint for container orchestration.
//!
//! Provides a simple liveness probe that returns 200 OK when the process is running.
//! Mounted on `/` and as the router fallback, so any path other than `/sum` lands here.

/// Health check handler.
///
/// Answers every method with a plain-text confirmation. This is a liveness
/// probe: it only checks that the process can respond to HTTP.
pub async fn health() -> &'static str {
    "Service is running"
}
