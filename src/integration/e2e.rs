//! End-to-end tests through the HTTP router

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tower::util::ServiceExt;

use crate::config::ServerConfig;
use crate::http::create_router;
use crate::integration::fixtures::{sample_1080p, StubProber};
use crate::state::AppState;

struct TestServer {
    app: Router,
    prober: Arc<StubProber>,
    // Kept alive so the registered path exists
    _file: NamedTempFile,
    source_id: String,
}

impl TestServer {
    async fn start(prober: StubProber) -> Self {
        let prober = Arc::new(prober);
        let state = Arc::new(AppState::with_prober(
            ServerConfig::default(),
            prober.clone(),
        ));
        let app = create_router(state);
        let file = NamedTempFile::new().unwrap();

        let (status, body) = send(
            &app,
            Method::POST,
            "/sources",
            Some(json!({ "path": file.path().to_string_lossy() })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let source_id = body["source_id"].as_str().unwrap().to_string();

        Self {
            app,
            prober,
            _file: file,
            source_id,
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        send(&self.app, Method::GET, &self.url(path), None).await
    }

    async fn decide(&self, request: Value) -> (StatusCode, Value) {
        send(&self.app, Method::POST, &self.url("/decision"), Some(request)).await
    }

    fn url(&self, path: &str) -> String {
        format!("/sources/{}{}", self.source_id, path)
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_tracks_and_profiles() {
    let server = TestServer::start(StubProber::returning(sample_1080p())).await;

    let (status, tracks) = server.get("/tracks").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tracks["video"].as_array().unwrap().len(), 1);
    assert_eq!(tracks["audio"][0]["codec"], "ac3");
    assert_eq!(tracks["audio"][1]["codec"], "aac");
    assert_eq!(tracks["subtitle"], json!([]));

    let (status, profiles) = server.get("/profiles").await;
    assert_eq!(status, StatusCode::OK);
    let profiles = profiles.as_array().unwrap();
    assert_eq!(profiles.len(), 13);
    let original = profiles.iter().find(|p| p["original"] == true).unwrap();
    assert_eq!(original["bitrate"], 7813);
    assert_eq!(original["height"], 1080);

    let (status, profile) = server.get("/profiles/0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["height"], 160);
    assert_eq!(profile["chunkDuration"], 8);
    assert_eq!(profile["x264preset"], "slow");

    // Every request above was served from one probe
    assert_eq!(server.prober.calls(), 1);
}

#[tokio::test]
async fn test_metadata() {
    let server = TestServer::start(StubProber::returning(sample_1080p())).await;

    let (status, metadata) = server.get("/metadata").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metadata["container"], "matroska,webm");
    assert_eq!(metadata["streams"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_decision_download() {
    let server = TestServer::start(StubProber::returning(sample_1080p())).await;

    let (status, decision) = server
        .decide(json!({
            "compatibility": [
                { "type": "HLS" },
                { "type": "DOWNLOAD", "rules": { "containers": ["matroska"] } }
            ],
            "videoStreams": [0],
            "audioStreams": [0]
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["protocol"], "DOWNLOAD");
    assert_eq!(decision["chunkDuration"], 0);
    assert_eq!(decision["streams"], json!([]));
}

#[tokio::test]
async fn test_decision_hls_with_transcoding() {
    let server = TestServer::start(StubProber::returning(sample_1080p())).await;

    let (status, decision) = server
        .decide(json!({
            "compatibility": [
                { "type": "DOWNLOAD", "rules": { "containers": ["mp4"] } },
                { "type": "HLS", "rules": { "audioCodecs": ["aac"] } }
            ],
            "profileId": 5,
            "videoStreams": [0],
            "audioStreams": [0, 1]
        }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(decision["protocol"], "HLS");
    assert_eq!(decision["chunkDuration"], 8);

    let streams = decision["streams"].as_array().unwrap();
    assert_eq!(streams.len(), 3);
    assert_eq!(streams[0]["kind"], "video");
    assert_eq!(streams[1]["transcode"], true);
    assert_eq!(streams[1]["target"]["codec"], "aac");
    assert_eq!(streams[2]["transcode"], false);
}

#[tokio::test]
async fn test_decision_without_viable_protocol() {
    let server = TestServer::start(StubProber::returning(sample_1080p())).await;

    let (status, body) = server
        .decide(json!({
            "compatibility": [
                { "type": "DOWNLOAD", "rules": { "videoCodecs": ["vp9"] } }
            ]
        }))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NoViableProtocol");
}

#[tokio::test]
async fn test_not_found_errors() {
    let server = TestServer::start(StubProber::returning(sample_1080p())).await;

    let (status, body) = server.get("/profiles/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "ProfileNotFound");

    let (status, body) = send(&server.app, Method::GET, "/sources/nope/tracks", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "SourceNotFound");
}

#[tokio::test]
async fn test_probe_failure_is_bad_gateway() {
    let server = TestServer::start(StubProber::failing()).await;

    let (status, body) = server.get("/tracks").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "AnalysisUnavailable");
}

#[tokio::test]
async fn test_source_lifecycle() {
    let server = TestServer::start(StubProber::returning(sample_1080p())).await;

    let (status, list) = send(&server.app, Method::GET, "/sources", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["count"], 1);
    assert!(list["sources"][0]["analyzed_at"].is_null());

    server.get("/tracks").await;
    let (_, info) = server.get("").await;
    assert!(info["analyzed_at"].is_string());

    let (status, _) = send(&server.app, Method::DELETE, &server.url(""), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = server.get("").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_missing_file() {
    let state = Arc::new(AppState::with_prober(
        ServerConfig::default(),
        Arc::new(StubProber::returning(sample_1080p())),
    ));
    let app = create_router(state);

    let (status, body) = send(
        &app,
        Method::POST,
        "/sources",
        Some(json!({ "path": "/definitely/not/here.mkv" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BadRequest");
}
