//! Bearer token middleware

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Authenticated identity attached to the request after token verification
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub admin: bool,
}

/// Extract the bearer token from the `Authorization` header, if present
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Require a valid, non-revoked bearer token
///
/// A missing or malformed `Authorization` header yields 401 with no further
/// processing. Signature/expiry are checked by the JWT manager; revocation is
/// a separate blacklist check composed here, so a freshly logged-out token is
/// rejected on every protected route even though it still verifies.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or(ApiError::Unauthorized)?
        .to_string();

    let claims = state.jwt_manager.verify(&token).map_err(|e| {
        tracing::debug!(error = %e, "require_auth: Token verification failed");
        ApiError::Unauthorized
    })?;

    if state.blacklist.has(&token).await {
        tracing::debug!(user_id = %claims.sub, "require_auth: Token is revoked");
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        username: claims.username,
        admin: claims.admin,
    });

    Ok(next.run(req).await)
}
