//! Axum router construction for the Observer API.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// CORS allows any origin so a dashboard served elsewhere can connect.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/picture", get(ws::ws_picture))
        // Picture reads
        .route("/api/picture", get(handlers::get_picture))
        .route("/api/entities/{uid}", get(handlers::get_entity))
        .route("/api/map_state", get(handlers::get_map_state))
        // CoT
        .route("/api/detections", post(handlers::post_detections))
        .route("/api/cot/preview", post(handlers::post_cot_preview))
        .route("/api/cot/sensor", post(handlers::post_sensor_preview))
        // Symbology
        .route("/api/style", post(handlers::post_style))
        // Geometry
        .route("/api/measure", post(handlers::post_measure))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
