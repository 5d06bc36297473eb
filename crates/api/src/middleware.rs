use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use shopfloor_auth::{TokenError, TokenValidator};

use crate::app::errors;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<dyn TokenValidator>,
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let principal = match extract_bearer(req.headers()).and_then(|t| state.tokens.validate(t)) {
        Ok(p) => p,
        Err(e) => {
            tracing::debug!(error = %e, "rejected request");
            return errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", e.to_string());
        }
    };

    req.extensions_mut().insert(PrincipalContext::new(principal));
    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, TokenError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(TokenError::Missing)?;

    let header = header.to_str().map_err(|_| TokenError::Unknown)?;

    let header = header.strip_prefix("Bearer ").ok_or(TokenError::Missing)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(TokenError::Missing);
    }

    Ok(token)
}
