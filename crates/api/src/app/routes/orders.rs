use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;

use shopfloor_core::{ManufacturingOrderId, ProductId};
use shopfloor_manufacturing::{NewManufacturingOrder, OrderPatch, OrderSchedule, OrderStatus};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
        .route("/:id/status", put(transition_order))
        .route("/:id/consume", post(consume_order))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match dto::parse(&body.product_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status = match dto::parse_opt::<OrderStatus>(body.status.as_deref()) {
        Ok(s) => s.unwrap_or(OrderStatus::Planned),
        Err(resp) => return resp,
    };

    let input = NewManufacturingOrder {
        product_id,
        quantity: body.quantity,
        status,
        schedule: OrderSchedule {
            start_date: body.start_date,
            deadline: body.deadline,
            assignee: body.assignee,
        },
    };

    match services.production.create_order(input, Utc::now()) {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::StatusQuery>,
) -> axum::response::Response {
    let status = match dto::parse_opt::<OrderStatus>(query.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.production.list_orders(status) {
        Ok(orders) => (StatusCode::OK, Json(orders)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// The order together with its work orders.
pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ManufacturingOrderId = match dto::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let order = match services.production.get_order(id) {
        Ok(o) => o,
        Err(e) => return errors::service_error_to_response(e),
    };
    match services.production.work_orders_for(id) {
        Ok(work_orders) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "order": order,
                "work_orders": work_orders,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderRequest>,
) -> axum::response::Response {
    let id: ManufacturingOrderId = match dto::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let patch = OrderPatch {
        quantity: body.quantity,
        start_date: body.start_date,
        deadline: body.deadline,
        assignee: body.assignee,
    };

    match services.production.update_order(id, patch) {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn transition_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::StatusRequest>,
) -> axum::response::Response {
    let id: ManufacturingOrderId = match dto::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status: OrderStatus = match dto::parse(&body.status) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.production.transition_order(id, status, Utc::now()) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ManufacturingOrderId = match dto::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.production.delete_order(id) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Consume components for the order outside a status change.
pub async fn consume_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ManufacturingOrderId = match dto::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.production.consume_order(id, Utc::now()) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
