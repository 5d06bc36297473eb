use axum::{
    routing::{get, post},
    Router,
};

pub mod bom;
pub mod orders;
pub mod products;
pub mod stock;
pub mod system;
pub mod work_orders;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/reports/orders", get(system::order_report))
        .route("/sample", post(system::seed_sample))
        .nest("/products", products::router())
        .nest("/bom", bom::router())
        .nest("/orders", orders::router())
        .nest("/work-orders", work_orders::router())
        .nest("/stock", stock::router())
}
