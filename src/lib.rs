//! Sum Service - a minimal HTTP service.
//!
//! Exposes a health check on every path and `POST /sum`, which adds up a JSON
//! array of integers. The binary in `main.rs` wires configuration, tracing and
//! the server together; everything it needs lives in these modules.

pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;

pub use config::AppConfig;
pub use error::AppError;
pub use routes::create_router;
