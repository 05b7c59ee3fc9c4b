//! HTTP route handlers.
//!
//! Two routes: `/sum` computes the sum of a JSON integer array, and everything
//! else, `/` included, is the health check. No response is cacheable.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod sum;

use axum::{extract::DefaultBodyLimit, middleware, routing::any, Router};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::{AppConfig, CACHE_CONTROL_NO_STORE, MAX_REQUEST_BODY_BYTES};
use crate::middleware::{request_id_layer, request_logger_layer, RequestLogSettings};

/// Creates the Axum router with both routes and the configured middleware.
pub fn create_router(config: &AppConfig) -> Router {
    let mut router = Router::new()
        // Method checking happens in the handler so 405 carries the JSON error body
        .route("/sum", any(sum::sum))
        .route("/", any(health::health))
        .fallback(health::health)
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ));

    if config.logging.log_requests {
        router = router.layer(middleware::from_fn_with_state(
            RequestLogSettings {
                max_body_bytes: config.logging.max_logged_body_bytes,
            },
            request_logger_layer,
        ));
    }

    // Request ID middleware - creates root span with request_id for correlation
    router.layer(middleware::from_fn(request_id_layer))
}
