//! API routes

pub mod auth;
pub mod health;
pub mod lessons;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{auth::require_auth, state::AppState};

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness));

    // Public API routes (no auth required). Logout lives here and verifies
    // the bearer itself: the shared auth layer rejects blacklisted tokens,
    // which would turn a repeated logout into a 401 instead of a no-op.
    let public_api_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    // Protected API routes (bearer token required)
    let protected_api_routes = Router::new()
        .route("/is-admin", get(auth::is_admin))
        .route("/self-delete", delete(auth::self_delete))
        .route("/lessons", get(lessons::list_lessons))
        .route("/lessons", post(lessons::create_lesson))
        .route("/lessons/:lesson_id/assign", patch(lessons::assign_lesson))
        .route("/lessons/:lesson_id", delete(lessons::delete_lesson))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Combine API routes under /api prefix
    let api_routes = Router::new()
        .merge(public_api_routes)
        .merge(protected_api_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        // Request body size limit to prevent DoS via large payloads
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
