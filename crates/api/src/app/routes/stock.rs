use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use shopfloor_core::ProductId;
use shopfloor_infra::{ManualMovement, RECENT_LEDGER_LIMIT};
use shopfloor_inventory::MovementDirection;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(ledger).post(record_movement))
        .route("/:product_id/check", get(check))
}

/// Recent ledger entries, newest first.
pub async fn ledger(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::LedgerQuery>,
) -> axum::response::Response {
    let product_id = match dto::parse_opt::<ProductId>(query.product_id.as_deref()) {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let limit = query.limit.unwrap_or(RECENT_LEDGER_LIMIT);

    match services.stock.recent(product_id, limit) {
        Ok(entries) => (StatusCode::OK, Json(entries)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn record_movement(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::StockMovementRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match dto::parse(&body.product_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let direction: MovementDirection = match dto::parse(&body.direction) {
        Ok(d) => d,
        Err(resp) => return resp,
    };

    let movement = ManualMovement {
        product_id,
        direction,
        quantity: body.quantity,
        reference: body.reference,
    };

    match services.stock.record_movement(movement, Utc::now()) {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn check(
    Extension(services): Extension<Arc<AppServices>>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match dto::parse(&product_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.stock.check(product_id) {
        Ok(check) => (StatusCode::OK, Json(check)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
