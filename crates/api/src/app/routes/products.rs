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
use shopfloor_inventory::{NewProduct, ProductKind};

use crate::app::{dto, errors, services::AppServices};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/:id", get(get_product).delete(delete_product))
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Json(body): Json<dto::CreateProductRequest>,
) -> axum::response::Response {
    let kind = match dto::parse_opt::<ProductKind>(body.kind.as_deref()) {
        Ok(k) => k.unwrap_or(ProductKind::Raw),
        Err(resp) => return resp,
    };

    let input = NewProduct {
        name: body.name,
        kind,
        opening_stock: body.stock_qty,
        created_by: Some(principal.user_id()),
    };

    match services.catalog.create_product(input, Utc::now()) {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list_products(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.catalog.list_products() {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match dto::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.get_product(id) {
        Ok(product) => (StatusCode::OK, Json(product)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ProductId = match dto::parse(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.delete_product(id, principal.user_id()) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
