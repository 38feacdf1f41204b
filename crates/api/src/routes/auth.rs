//! Authentication routes

use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{
    auth::{bearer_token, hash_password, verify_password, AuthUser},
    error::{ApiError, ApiResult},
    state::AppState,
};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct CredentialsResponse {
    pub message: String,
    pub credentials: Credentials,
}

#[derive(Debug, Serialize)]
pub struct Credentials {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub username: String,
    pub admin: bool,
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct UserAuthRow {
    id: Uuid,
    username: String,
    password_hash: String,
    admin: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let password_hash = hash_password(&req.password).map_err(|e| {
        tracing::error!(error = %e, "register: Password hashing failed");
        ApiError::Internal
    })?;

    // Uniqueness is enforced by the UNIQUE constraint on username; a
    // concurrent duplicate insert surfaces here as DuplicateUser rather
    // than slipping through a check-then-insert window
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO users (id, username, password_hash, admin) VALUES ($1, $2, $3, $4)")
        .bind(user_id)
        .bind(&req.username)
        .bind(&password_hash)
        .bind(req.admin)
        .execute(&state.pool)
        .await?;

    tracing::info!(user_id = %user_id, username = %req.username, admin = req.admin, "register: User created");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("{} registered", req.username),
        }),
    ))
}

/// Login with username and password
///
/// An unknown username and a wrong password both fail with the identical
/// user-facing message, so responses cannot be used for username enumeration.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user: UserAuthRow = sqlx::query_as(
        "SELECT id, username, password_hash, admin FROM users WHERE username = $1",
    )
    .bind(&req.username)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| {
        tracing::warn!(username = %req.username, "login: User not found");
        ApiError::InvalidCredentials
    })?;

    let valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        tracing::error!(error = %e, "login: Password verification failed with error");
        ApiError::Internal
    })?;

    if !valid {
        tracing::warn!(user_id = %user.id, "login: Invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = state
        .jwt_manager
        .issue(user.id, &user.username, user.admin)
        .map_err(|e| {
            tracing::error!(error = %e, "login: JWT generation failed");
            ApiError::Internal
        })?;

    tracing::info!(user_id = %user.id, "login: Login successful");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
    }))
}

/// Revoke the presented token until its natural expiry
///
/// Idempotent: logging out twice with the same token is harmless. For that
/// reason this handler sits outside the shared auth layer (which rejects
/// blacklisted tokens) and verifies the bearer itself.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<MessageResponse>> {
    let token = bearer_token(&headers).ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt_manager.verify(token).map_err(|e| {
        tracing::debug!(error = %e, "logout: Token verification failed");
        ApiError::Unauthorized
    })?;

    state
        .blacklist
        .add(token)
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    tracing::info!(user_id = %claims.sub, "logout: Token revoked");

    Ok(Json(MessageResponse {
        message: "Successfully logged out".to_string(),
    }))
}

/// Decode the presented token and return its credentials
pub async fn is_admin(
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<CredentialsResponse>> {
    Ok(Json(CredentialsResponse {
        message: "Credentials decoded".to_string(),
        credentials: Credentials {
            user_id: user.user_id,
            username: user.username,
            admin: user.admin,
        },
    }))
}

/// Delete the caller's own account
///
/// The caller's lessons are reassigned to unassigned before the user row is
/// removed, in one transaction: either both steps land or neither does, and a
/// lesson can never reference a deleted instructor.
pub async fn self_delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<MessageResponse>> {
    let mut tx = state.pool.begin().await?;

    let reassigned = sqlx::query("UPDATE lessons SET assigned_to = NULL WHERE assigned_to = $1")
        .bind(user.user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    let deleted = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(&user.username)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        // Token outlived the account (e.g. a previous delete on another
        // session); nothing to roll back, but the request is a 400
        return Err(ApiError::BadRequest("Account no longer exists".to_string()));
    }

    tx.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        username = %user.username,
        lessons_unassigned = reassigned,
        "self_delete: Account deleted"
    );

    Ok(Json(MessageResponse {
        message: format!("{} deleted", user.username),
    }))
}
