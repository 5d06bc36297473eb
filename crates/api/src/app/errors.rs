use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use shopfloor_infra::ServiceError;

/// HTTP status for a service error code.
pub fn status_for(kind: &str) -> StatusCode {
    match kind {
        "not_found" | "product_not_found" => StatusCode::NOT_FOUND,
        "validation_error" | "invalid_id" => StatusCode::BAD_REQUEST,
        "invalid_transition" | "already_consumed" | "conflict" => StatusCode::CONFLICT,
        "forbidden" => StatusCode::FORBIDDEN,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    let kind = err.kind();
    let status = status_for(kind);
    if status.is_server_error() {
        tracing::error!(kind, error = %err, "request failed");
    }
    json_error(status, kind, err.to_string())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_map_to_statuses() {
        assert_eq!(status_for("not_found"), StatusCode::NOT_FOUND);
        assert_eq!(status_for("product_not_found"), StatusCode::NOT_FOUND);
        assert_eq!(status_for("invalid_id"), StatusCode::BAD_REQUEST);
        assert_eq!(status_for("already_consumed"), StatusCode::CONFLICT);
        assert_eq!(status_for("invalid_transition"), StatusCode::CONFLICT);
        assert_eq!(status_for("forbidden"), StatusCode::FORBIDDEN);
        assert_eq!(status_for("store_error"), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
