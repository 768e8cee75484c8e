//! Route definitions for the Sparks API.

use axum::{
    Json, Router, middleware,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::auth::auth_middleware;
use crate::handlers;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Creates the router. `/health`, `/metrics` and `/openapi.json` are public;
/// everything else sits behind the access gate.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/categories",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route("/categories/{id}", delete(handlers::delete_category))
        .route(
            "/ideas",
            get(handlers::list_ideas).post(handlers::create_idea),
        )
        .route("/ideas/process", post(handlers::process_idea))
        .route(
            "/ideas/{id}",
            patch(handlers::update_idea).delete(handlers::delete_idea),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
