use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use super::handlers;
use super::health;
use super::state::AppState;
use crate::config::ServerConfig;

/// Create the full router with application state
pub fn create_router(state: AppState, server: &ServerConfig) -> Router {
    let audio = ServeDir::new(&state.media.audio);
    let videos = ServeDir::new(&state.media.videos);

    let router = Router::new()
        .route("/health", get(health::health_check))
        .route("/live", get(health::live_check))
        .nest("/api", handlers::create_api_router())
        .nest_service("/audio", audio)
        .nest_service("/videos", videos);

    let router = if server.public_dir.is_dir() {
        router.fallback_service(ServeDir::new(&server.public_dir))
    } else {
        router
    };

    router
        .with_state(state)
        .layer(DefaultBodyLimit::max(server.body_limit_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
