use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::inline::InlineService;

pub mod handlers;
pub mod models;

pub struct AppState {
    pub inline: InlineService,
    pub bot_username: String,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/inline", post(handlers::inline_handler))
        .route("/api/start", get(handlers::start_handler))
        .route("/api/help", get(handlers::help_handler))
        .route("/api/health", get(handlers::health_handler))
        .with_state(state)
        .layer(cors)
}
