use axum::{
    extract::rejection::BytesRejection,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Client-facing failures of the sum endpoint.
///
/// Every variant renders as a JSON `{"error": "..."}` body, including the
/// method check, so callers only ever parse one error shape.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed(Method),

    #[error("Invalid input. Unable to parse JSON.")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid input. Please provide an array of integers in the \"numbers\" field.")]
    EmptyNumbers,

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Unable to read request body")]
    UnreadableBody(#[source] BytesRejection),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidJson(_) | AppError::EmptyNumbers => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::UnreadableBody(rejection) => rejection.status(),
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::UnreadableBody(rejection)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::MethodNotAllowed(method) => {
                tracing::warn!(method = %method, "Method not allowed");
            }
            AppError::InvalidJson(e) => {
                tracing::warn!(error = %e, "Error decoding JSON");
            }
            AppError::EmptyNumbers => {
                tracing::warn!("Empty numbers array");
            }
            AppError::PayloadTooLarge => {
                tracing::warn!("Request body too large");
            }
            AppError::UnreadableBody(rejection) => {
                tracing::warn!(error = %rejection.body_text(), "Error reading body");
            }
        }

        let status = self.status();
        let body = Json(ErrorBody {
            error: self.to_string(),
        });

        let mut response = (status, body).into_response();
        if matches!(self, AppError::MethodNotAllowed(_)) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::MethodNotAllowed(Method::GET).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(AppError::EmptyNumbers.status(), StatusCode::BAD_REQUEST);

        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(AppError::InvalidJson(parse_err).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_messages_are_client_facing() {
        assert_eq!(
            AppError::EmptyNumbers.to_string(),
            "Invalid input. Please provide an array of integers in the \"numbers\" field."
        );
        let parse_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            AppError::InvalidJson(parse_err).to_string(),
            "Invalid input. Unable to parse JSON."
        );
    }

    #[test]
    fn test_payload_too_large_is_json() {
        let response = AppError::PayloadTooLarge.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(AppError::PayloadTooLarge.to_string(), "Request body too large");
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let response = AppError::MethodNotAllowed(Method::PUT).into_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }
}
