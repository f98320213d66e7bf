//! HTTP request handlers
//!
//! Implements handlers for all planner endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::compat::CompatibilityMap;
use crate::decision::Decision;
use crate::encoder::ProfileSettings;
use crate::error::PlannerError;
use crate::ladder::Profile;
use crate::media::MediaMetadata;
use crate::planner::TrackListing;
use crate::state::{AppState, SourceEntry};

/// HTTP error type
#[derive(Debug)]
pub enum HttpError {
    NotFound { kind: &'static str, message: String },
    BadRequest(String),
    Unprocessable { kind: &'static str, message: String },
    BadGateway(String),
    InternalError(String),
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            HttpError::NotFound { kind, message } => (StatusCode::NOT_FOUND, kind, message),
            HttpError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BadRequest", msg),
            HttpError::Unprocessable { kind, message } => {
                (StatusCode::UNPROCESSABLE_ENTITY, kind, message)
            }
            HttpError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, "AnalysisUnavailable", msg),
            HttpError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal", msg)
            }
        };

        let body = serde_json::json!({ "error": kind, "message": message });
        (status, Json(body)).into_response()
    }
}

impl From<PlannerError> for HttpError {
    fn from(err: PlannerError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            PlannerError::SourceNotFound(_) | PlannerError::ProfileNotFound(_) => {
                HttpError::NotFound { kind, message }
            }
            PlannerError::NoViableProtocol | PlannerError::InsufficientBitrate { .. } => {
                HttpError::Unprocessable { kind, message }
            }
            PlannerError::AnalysisUnavailable(_) => HttpError::BadGateway(message),
            _ => HttpError::InternalError(message),
        }
    }
}

/// Extension trait for AppState
pub trait AppStateExt {
    fn get_source_or_error(&self, source_id: &str) -> Result<Arc<SourceEntry>, HttpError>;
}

impl AppStateExt for AppState {
    fn get_source_or_error(&self, source_id: &str) -> Result<Arc<SourceEntry>, HttpError> {
        let entry = self
            .get_source(source_id)
            .ok_or_else(|| PlannerError::SourceNotFound(source_id.to_string()))?;
        entry.touch();
        Ok(entry)
    }
}

/// Request to register a source file
#[derive(Debug, Deserialize)]
pub struct CreateSourceRequest {
    /// Path to the media file
    pub path: String,
}

/// A registered source
#[derive(Debug, Serialize, Deserialize)]
pub struct SourceInfo {
    pub source_id: String,
    pub path: String,
    pub registered_at: DateTime<Utc>,
    /// When the probe completed, if it has
    pub analyzed_at: Option<DateTime<Utc>>,
}

impl SourceInfo {
    fn from_entry(entry: &SourceEntry) -> Self {
        Self {
            source_id: entry.source_id.clone(),
            path: entry.source_path().to_string_lossy().to_string(),
            registered_at: entry.registered_at,
            analyzed_at: entry.planner.analysis().analyzed_at(),
        }
    }
}

/// List of registered sources
#[derive(Debug, Serialize, Deserialize)]
pub struct SourceListResponse {
    pub count: usize,
    pub sources: Vec<SourceInfo>,
}

/// Delivery decision request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// Protocols the client supports and their rules
    pub compatibility: CompatibilityMap,
    /// Ladder entry to deliver
    #[serde(default)]
    pub profile_id: usize,
    #[serde(default)]
    pub video_streams: Vec<usize>,
    #[serde(default)]
    pub audio_streams: Vec<usize>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Version endpoint
pub async fn version_check() -> &'static str {
    concat!("delivery-planner v", env!("CARGO_PKG_VERSION"))
}

/// Register a source file
/// POST /sources
pub async fn create_source(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateSourceRequest>,
) -> Result<Response, HttpError> {
    let path = std::path::Path::new(&request.path);
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        return Err(HttpError::BadRequest(format!(
            "File not found: {}",
            request.path
        )));
    }

    let entry = state.register_source(path);
    Ok((StatusCode::CREATED, Json(SourceInfo::from_entry(&entry))).into_response())
}

/// List registered sources
/// GET /sources
pub async fn list_sources(State(state): State<Arc<AppState>>) -> Json<SourceListResponse> {
    let mut sources: Vec<SourceInfo> = state
        .sources
        .iter()
        .map(|r| SourceInfo::from_entry(r.value()))
        .collect();
    sources.sort_by(|a, b| a.registered_at.cmp(&b.registered_at));

    Json(SourceListResponse {
        count: sources.len(),
        sources,
    })
}

/// GET /sources/{id}
pub async fn get_source(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<String>,
) -> Result<Json<SourceInfo>, HttpError> {
    let entry = state.get_source_or_error(&source_id)?;
    Ok(Json(SourceInfo::from_entry(&entry)))
}

/// DELETE /sources/{id}
pub async fn delete_source(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<String>,
) -> Result<StatusCode, HttpError> {
    state
        .remove_source(&source_id)
        .ok_or(PlannerError::SourceNotFound(source_id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Raw metadata snapshot
/// GET /sources/{id}/metadata
pub async fn source_metadata(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<String>,
) -> Result<Json<MediaMetadata>, HttpError> {
    let entry = state.get_source_or_error(&source_id)?;
    let metadata = entry.planner.metadata().await?;
    Ok(Json(metadata.as_ref().clone()))
}

/// GET /sources/{id}/tracks
pub async fn source_tracks(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<String>,
) -> Result<Json<TrackListing>, HttpError> {
    let entry = state.get_source_or_error(&source_id)?;
    Ok(Json(entry.planner.tracks().await?))
}

/// GET /sources/{id}/profiles
pub async fn source_profiles(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<String>,
) -> Result<Json<Vec<Profile>>, HttpError> {
    let entry = state.get_source_or_error(&source_id)?;
    Ok(Json(entry.planner.profiles().await?))
}

/// GET /sources/{id}/profiles/{profile_id}
pub async fn source_profile(
    State(state): State<Arc<AppState>>,
    Path((source_id, profile_id)): Path<(String, usize)>,
) -> Result<Json<ProfileSettings>, HttpError> {
    let entry = state.get_source_or_error(&source_id)?;
    Ok(Json(entry.planner.profile(profile_id).await?))
}

/// POST /sources/{id}/decision
pub async fn source_decision(
    State(state): State<Arc<AppState>>,
    Path(source_id): Path<String>,
    Json(request): Json<DecisionRequest>,
) -> Result<Json<Decision>, HttpError> {
    let entry = state.get_source_or_error(&source_id)?;
    let decision = entry
        .planner
        .decide(
            &request.compatibility,
            request.profile_id,
            &request.video_streams,
            &request.audio_streams,
        )
        .await?;
    Ok(Json(decision))
}

/// Debug view of registered sources
#[derive(Debug, Serialize)]
pub struct DebugSource {
    pub source_id: String,
    pub path: String,
    pub analyzed: bool,
    pub idle_secs: u64,
}

/// GET /debug/sources
pub async fn debug_sources(State(state): State<Arc<AppState>>) -> Json<Vec<DebugSource>> {
    let sources = state
        .sources
        .iter()
        .map(|r| {
            let entry = r.value();
            DebugSource {
                source_id: entry.source_id.clone(),
                path: entry.source_path().to_string_lossy().to_string(),
                analyzed: entry.planner.analysis().cached().is_some(),
                idle_secs: entry.time_since_last_access(),
            }
        })
        .collect();
    Json(sources)
}
