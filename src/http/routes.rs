//! Axum router configuration

use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

use super::handlers::{
    create_source, debug_sources, delete_source, get_source, health_check, list_sources,
    source_decision, source_metadata, source_profile, source_profiles, source_tracks,
    version_check,
};

/// Create the Axum router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Health and version endpoints
        .route("/health", get(health_check))
        .route("/version", get(version_check))
        // Source management
        .route("/sources", post(create_source).get(list_sources))
        .route("/sources/{id}", get(get_source).delete(delete_source))
        // Planning
        .route("/sources/{id}/metadata", get(source_metadata))
        .route("/sources/{id}/tracks", get(source_tracks))
        .route("/sources/{id}/profiles", get(source_profiles))
        .route("/sources/{id}/profiles/{profile_id}", get(source_profile))
        .route("/sources/{id}/decision", post(source_decision))
        // Debug endpoints
        .route("/debug/sources", get(debug_sources))
        .layer(TraceLayer::new_for_http());

    let router = if state.config.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::ACCEPT, header::CONTENT_TYPE, header::ORIGIN])
            .max_age(Duration::from_secs(3600));
        router.layer(cors)
    } else {
        router
    };

    router.with_state(state)
}
