use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Derived data
        .route("/users/:user_id/stats", get(handlers::get_stats))
        .route(
            "/users/:user_id/recommendations",
            get(handlers::get_recommendations),
        )
        .route(
            "/users/:user_id/cache/refresh",
            post(handlers::refresh_cache),
        )
        // Preference records
        .route(
            "/users/:user_id/preferences",
            get(handlers::get_preference_ids),
        )
        .route(
            "/users/:user_id/preferences",
            put(handlers::upsert_preference),
        )
        .route(
            "/users/:user_id/preferences",
            delete(handlers::delete_preference),
        )
}
