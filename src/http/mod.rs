//! HTTP server module.
//!
//! Binds the TCP listener and serves the router until a shutdown signal arrives.
//! - Plain HTTP on the configured host and port
//! - Graceful shutdown on SIGTERM/SIGINT

mod server;
mod shutdown;

pub use server::{bind, serve, start_server, ServerError};
pub use shutdown::shutdown_signal;
