//! Request middleware: correlation IDs and request logging.
//!
//! `request_id_layer` generates a UUID v4 for each incoming request, creates a
//! tracing span that wraps the entire request lifecycle so every log line emitted
//! while handling a request carries its request_id, and echoes the ID back in the
//! `x-request-id` response header.
//!
//! `request_logger_layer` logs method, URI, headers and body of each request. The
//! body is read once and the handler gets a body that yields exactly the same bytes,
//! so logging never changes what the handler sees.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use futures::{stream, StreamExt};
use http_body_util::BodyExt;
use tracing::Instrument;
use uuid::Uuid;

/// Response header carrying the request's correlation ID
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Settings for the request logger, taken from `LoggingConfig` at router construction.
#[derive(Clone, Copy, Debug)]
pub struct RequestLogSettings {
    /// Bytes of body held back for logging; the rest streams through untouched
    pub max_body_bytes: usize,
}

/// Middleware that generates a request ID and creates a request span.
///
/// This should be the outermost middleware layer so the span wraps
/// all request processing, including other middleware and handlers.
pub async fn request_id_layer(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }
        response
    }
    .instrument(span)
    .await
}

/// What the logger managed to read before handing the body on.
enum BodyPrefix {
    /// The whole body fit in the logging budget
    Complete(Bytes),
    /// The budget was exceeded; `rest` still holds the unread remainder
    Truncated { prefix: Bytes, rest: Body },
    /// The body stream failed after `prefix` had been read
    Failed { prefix: Bytes, error: axum::Error },
}

/// Read frames until the body ends, errors, or grows past `limit` bytes.
async fn read_prefix(mut body: Body, limit: usize) -> BodyPrefix {
    let mut buf = Vec::new();
    loop {
        match body.frame().await {
            None => return BodyPrefix::Complete(Bytes::from(buf)),
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    buf.extend_from_slice(&data);
                    if buf.len() > limit {
                        return BodyPrefix::Truncated {
                            prefix: Bytes::from(buf),
                            rest: body,
                        };
                    }
                }
            }
            Some(Err(error)) => {
                return BodyPrefix::Failed {
                    prefix: Bytes::from(buf),
                    error,
                }
            }
        }
    }
}

/// Middleware that logs the full request, body included.
///
/// Logging is best effort. Only the first `max_body_bytes` of the body are held
/// in memory for the log line; whatever was read is replayed in front of the
/// unread remainder, and a read error is replayed at the same position, so the
/// handler answers exactly as it would without this layer.
pub async fn request_logger_layer(
    State(settings): State<RequestLogSettings>,
    request: Request,
    next: Next,
) -> Response {
    tracing::info!("--- New Request ---");
    tracing::info!(method = %request.method(), "Method");
    tracing::info!(url = %request.uri(), "URL");
    for (name, value) in request.headers() {
        tracing::info!(
            name = %name,
            value = %String::from_utf8_lossy(value.as_bytes()),
            "Header"
        );
    }

    let (parts, body) = request.into_parts();
    let limit = settings.max_body_bytes;

    let body = match read_prefix(body, limit).await {
        BodyPrefix::Complete(bytes) => {
            tracing::info!(body = %String::from_utf8_lossy(&bytes), "Body");
            Body::from(bytes)
        }
        BodyPrefix::Truncated { prefix, rest } => {
            tracing::info!(
                body = %String::from_utf8_lossy(&prefix[..limit]),
                truncated = true,
                "Body"
            );
            let head = stream::once(async move { Ok::<_, axum::Error>(prefix) });
            Body::from_stream(head.chain(rest.into_data_stream()))
        }
        BodyPrefix::Failed { prefix, error } => {
            tracing::warn!(error = %error, "Error reading body");
            Body::from_stream(stream::iter([Ok(prefix), Err(error)]))
        }
    };

    next.run(Request::from_parts(parts, body)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, middleware, routing::post, Router};
    use tower::ServiceExt;
    use tracing_test::traced_test;

    async fn echo(request: Request) -> String {
        match to_bytes(request.into_body(), usize::MAX).await {
            Ok(bytes) => format!("ok|{}", String::from_utf8_lossy(&bytes)),
            Err(_) => "error".to_string(),
        }
    }

    fn app(logger: Option<usize>) -> Router {
        let router = Router::new().route("/echo", post(echo));
        let router = match logger {
            Some(max_body_bytes) => router.layer(middleware::from_fn_with_state(
                RequestLogSettings { max_body_bytes },
                request_logger_layer,
            )),
            None => router,
        };
        router.layer(middleware::from_fn(request_id_layer))
    }

    async fn send(app: Router, body: Body) -> (Response, String) {
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/echo?x=1")
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let (parts, body) = response.into_parts();
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        (
            Response::from_parts(parts, Body::empty()),
            String::from_utf8(bytes.to_vec()).unwrap(),
        )
    }

    fn failing_body() -> Body {
        Body::from_stream(stream::iter([
            Ok(Bytes::from_static(b"abc")),
            Err(std::io::Error::other("connection reset")),
        ]))
    }

    #[tokio::test]
    async fn test_logger_restores_body_for_handler() {
        let (_, body) = send(app(Some(1024)), Body::from(r#"{"numbers":[1,2]}"#)).await;
        assert_eq!(body, r#"ok|{"numbers":[1,2]}"#);
    }

    #[tokio::test]
    async fn test_body_over_log_budget_reaches_handler_intact() {
        let chunks = stream::iter(["0123", "4567", "89"].map(|c| Ok::<_, std::io::Error>(c)));
        for request_body in [Body::from("0123456789"), Body::from_stream(chunks)] {
            let (_, body) = send(app(Some(4)), request_body).await;
            assert_eq!(body, "ok|0123456789");
        }
    }

    #[tokio::test]
    async fn test_read_error_matches_unlogged_request() {
        let (_, with_logger) = send(app(Some(1024)), failing_body()).await;
        let (_, without_logger) = send(app(None), failing_body()).await;
        assert_eq!(with_logger, "error");
        assert_eq!(with_logger, without_logger);
    }

    #[tokio::test]
    async fn test_request_id_header_is_a_uuid() {
        let (first, _) = send(app(None), Body::empty()).await;
        let (second, _) = send(app(None), Body::empty()).await;

        let first = first.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
        let second = second.headers()[REQUEST_ID_HEADER].to_str().unwrap().to_string();
        assert!(Uuid::parse_str(&first).is_ok());
        assert_ne!(first, second);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_logger_emits_request_lines() {
        send(app(Some(1024)), Body::from(r#"{"numbers":[1,2]}"#)).await;

        assert!(logs_contain("--- New Request ---"));
        assert!(logs_contain("method=POST"));
        assert!(logs_contain("url=/echo?x=1"));
        assert!(logs_contain("name=content-type value=application/json"));
        assert!(logs_contain(r#"body={"numbers":[1,2]}"#));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_logger_marks_truncated_body() {
        send(app(Some(4)), Body::from("0123456789")).await;

        assert!(logs_contain("body=0123 truncated=true"));
        assert!(!logs_contain("0123456789"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_logger_reports_read_error() {
        send(app(Some(1024)), failing_body()).await;

        assert!(logs_contain("Error reading body"));
        assert!(logs_contain("connection reset"));
    }
}
