use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use gemcart_core::DomainError;
use gemcart_infra::lifecycle::LifecycleError;

/// Which envelope key carries failure text. Admin routes use `error`, the
/// storefront registration route uses `message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    Error,
    Message,
}

impl Envelope {
    fn key(self) -> &'static str {
        match self {
            Envelope::Error => "error",
            Envelope::Message => "message",
        }
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    json_failure(Envelope::Error, status, message)
}

pub fn json_failure(envelope: Envelope, status: StatusCode, message: impl Into<String>) -> Response {
    (status, axum::Json(json!({ envelope.key(): message.into() }))).into_response()
}

pub fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
    }
}

/// Domain failures keep their message; storage and internal failures are
/// logged and answered with `fallback` only.
pub fn lifecycle_error_to_response(err: LifecycleError, fallback: &str) -> Response {
    lifecycle_failure(Envelope::Error, err, fallback)
}

pub fn lifecycle_failure(envelope: Envelope, err: LifecycleError, fallback: &str) -> Response {
    match err {
        LifecycleError::Domain(e) => json_failure(envelope, domain_status(&e), e.to_string()),
        LifecycleError::Store(e) => {
            tracing::error!(error = %e, "{fallback}");
            json_failure(envelope, StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
        LifecycleError::Internal(e) => {
            tracing::error!(error = %e, "{fallback}");
            json_failure(envelope, StatusCode::INTERNAL_SERVER_ERROR, fallback)
        }
    }
}

/// 413 for bodies over the size limit, 400 for every other unreadable body.
pub fn bad_json(envelope: Envelope, rejection: JsonRejection) -> Response {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return json_failure(envelope, StatusCode::PAYLOAD_TOO_LARGE, "Request body too large");
    }
    json_failure(
        envelope,
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}
