//! HTTP server startup logic.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::{AppConfig, ConfigError, HttpServerConfig};

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to bind server to {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind the TCP listener for the configured host and port.
pub async fn bind(config: &HttpServerConfig) -> Result<TcpListener, ServerError> {
    let addr = config.socket_addr()?;
    TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Serve requests on an already bound listener until a shutdown signal arrives.
///
/// Each connection is driven on its own task by hyper; handlers share no state.
pub async fn serve(listener: TcpListener, app: Router) -> Result<(), ServerError> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::shutdown_signal())
        .await
        .map_err(ServerError::Serve)?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Start the HTTP server based on configuration.
///
/// This function blocks until the server shuts down.
pub async fn start_server(app: Router, config: &AppConfig) -> Result<(), ServerError> {
    let listener = bind(&config.http).await?;
    let port = listener
        .local_addr()
        .map(|addr| addr.port())
        .unwrap_or(config.http.port);
    tracing::info!(host = %config.http.host, port, "Server running on port {}", port);

    serve(listener, app).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let config = HttpServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let listener = bind(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_bind_port_in_use() {
        let config = HttpServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };
        let first = bind(&config).await.unwrap();
        let taken = HttpServerConfig {
            host: "127.0.0.1".to_string(),
            port: first.local_addr().unwrap().port(),
        };
        assert!(matches!(bind(&taken).await, Err(ServerError::Bind { .. })));
    }

    #[tokio::test]
    async fn test_bind_invalid_host() {
        let config = HttpServerConfig {
            host: "not a host".to_string(),
            port: 0,
        };
        assert!(matches!(bind(&config).await, Err(ServerError::Config(_))));
    }
}
