use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use shopfloor_core::ProductId;
use shopfloor_manufacturing::BomDraft;

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_boms).post(create_bom))
        .route("/product/:product_id", get(resolve_bom))
}

pub async fn create_bom(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateBomRequest>,
) -> axum::response::Response {
    let product_id: ProductId = match dto::parse(&body.product_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let components = match dto::bom_components(body.components) {
        Ok(c) => c,
        Err(resp) => return resp,
    };

    let draft = BomDraft {
        product_id,
        components,
        operations: dto::bom_operations(body.operations),
    };

    match services.catalog.create_bom(draft, Utc::now()) {
        Ok(bom) => (StatusCode::CREATED, Json(bom)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_boms(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.list_boms() {
        Ok(boms) => (StatusCode::OK, Json(boms)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// The BOM that builds a product. A product without one is a 404 here.
pub async fn resolve_bom(
    Extension(services): Extension<Arc<AppServices>>,
    Path(product_id): Path<String>,
) -> axum::response::Response {
    let product_id: ProductId = match dto::parse(&product_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.resolve_bom(product_id) {
        Ok(Some(bom)) => (StatusCode::OK, Json(bom)).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no bom for product {product_id}"),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}
