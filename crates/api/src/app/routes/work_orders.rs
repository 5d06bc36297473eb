use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;

use shopfloor_core::{ManufacturingOrderId, WorkOrderId};
use shopfloor_manufacturing::{NewWorkOrder, WorkOrderStatus, WorkOrderTransition};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_work_orders).post(create_work_order))
        .route("/:id", get(get_work_order))
        .route("/:id/status", put(transition_work_order))
}

pub async fn create_work_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateWorkOrderRequest>,
) -> axum::response::Response {
    let mo_id: ManufacturingOrderId = match dto::parse(&body.mo_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let input = NewWorkOrder {
        mo_id,
        operation: body.operation,
        work_center: body.work_center,
        planned_minutes: body.planned_minutes,
    };

    match services.production.create_work_order(input) {
        Ok(wo) => (StatusCode::CREATED, Json(wo)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_work_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::StatusQuery>,
) -> axum::response::Response {
    let status = match dto::parse_opt::<WorkOrderStatus>(query.status.as_deref()) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match services.production.list_work_orders(status) {
        Ok(wos) => (StatusCode::OK, Json(wos)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_work_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: WorkOrderId = match dto::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.production.get_work_order(id) {
        Ok(wo) => (StatusCode::OK, Json(wo)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Start, complete or cancel a work order. Completing it consumes stock.
pub async fn transition_work_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::WorkOrderStatusRequest>,
) -> axum::response::Response {
    let id: WorkOrderId = match dto::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let status: WorkOrderStatus = match dto::parse(&body.status) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let change = WorkOrderTransition {
        status,
        operator: body.operator,
        comments: body.comments,
    };

    match services.production.transition_work_order(id, change, Utc::now()) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
