//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and application services shared by all handlers
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and parsing helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use shopfloor_auth::TokenValidator;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Every call gets a fresh, empty store.
pub fn build_app(tokens: Arc<dyn TokenValidator>) -> Router {
    let auth_state = middleware::AuthState { tokens };
    let services = Arc::new(services::AppServices::in_memory());

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(Extension(services))
            .layer(axum::middleware::from_fn_with_state(
                auth_state,
                middleware::auth_middleware,
            )),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
}
