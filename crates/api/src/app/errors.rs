use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::StoreError;
use stockroom_session::SessionError;

pub fn session_error_to_response(err: SessionError) -> axum::response::Response {
    match err {
        SessionError::Domain(e) => domain_error_to_response(e),
        SessionError::Store(e) => store_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    tracing::warn!(error = %err, "inventory store call failed");
    match err {
        StoreError::Network(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "store_unavailable", msg)
        }
        StoreError::PermissionDenied(msg) => {
            json_error(StatusCode::FORBIDDEN, "permission_denied", msg)
        }
        StoreError::Backend(msg) => json_error(StatusCode::BAD_GATEWAY, "store_error", msg),
        StoreError::Decode(msg) => json_error(StatusCode::BAD_GATEWAY, "malformed_record", msg),
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
