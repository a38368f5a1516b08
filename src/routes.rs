//! Router assembly

use crate::{
    handlers::{auth, health, products},
    state::AppState,
};
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/products",
            get(products::get_all).post(products::create),
        )
        .route(
            "/api/products/:id",
            get(products::get_by_id)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh_token))
        .route("/api/auth/validate", post(auth::validate_token))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
