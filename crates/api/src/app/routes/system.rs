use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::app::{errors, services::AppServices};
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": principal.user_id().to_string(),
        "name": principal.name(),
        "role": principal.role().as_str(),
    }))
}

pub async fn order_report(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.order_summary() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Seed the demo scenario, owned by the caller.
pub async fn seed_sample(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    let scenario = match shopfloor_infra::seed_sample(
        &services.catalog,
        &services.production,
        Some(principal.user_id()),
        Utc::now(),
    ) {
        Ok(s) => s,
        Err(e) => return errors::service_error_to_response(e),
    };

    let component_stock = services
        .catalog
        .get_product(scenario.component_id)
        .map(|p| p.stock_qty())
        .ok();

    (
        StatusCode::CREATED,
        Json(serde_json::json!({
            "scenario": scenario,
            "component_stock": component_stock,
        })),
    )
        .into_response()
}
