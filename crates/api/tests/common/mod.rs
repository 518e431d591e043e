#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use movecheck_api::config::{MediaSource, ServerConfig, StoreBackend};
use movecheck_api::routes;
use movecheck_api::state::AppState;
use movecheck_core::landmarks::{
    FrameRecord, LandmarkPoint, LandmarkSequence, FULL_BODY_LANDMARKS, LEFT_ANKLE, LEFT_HIP,
    LEFT_KNEE, RIGHT_ANKLE, RIGHT_HIP, RIGHT_KNEE,
};
use movecheck_core::types::EntityId;
use movecheck_db::models::video_upload::CreateVideoUpload;
use movecheck_pipeline::media::{MediaError, MediaStore};
use movecheck_pipeline::memory::InMemoryAnalysisStore;
use movecheck_pipeline::pose::{PoseError, PoseExtraction, PoseExtractor};
use movecheck_pipeline::{AnalysisRunner, PipelineConfig};
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Stub collaborators
// ---------------------------------------------------------------------------

/// Serves each stored path's own name as the video bytes.
struct EchoMedia;

#[async_trait]
impl MediaStore for EchoMedia {
    async fn fetch_bytes(&self, storage_path: &str) -> Result<Vec<u8>, MediaError> {
        Ok(storage_path.as_bytes().to_vec())
    }
}

/// Detects three squats in every video except those stored under `empty/`,
/// which yield frames with no body detected.
struct SquatPose;

#[async_trait]
impl PoseExtractor for SquatPose {
    async fn extract(&self, video: Vec<u8>) -> Result<PoseExtraction, PoseError> {
        let frames = if video.starts_with(b"empty/") {
            (0..30u32)
                .map(|i| FrameRecord::no_detection(i, f64::from(i) / 30.0))
                .collect()
        } else {
            squats()
        };
        Ok(PoseExtraction {
            success: true,
            total_frames: frames.len() as u32,
            frames: LandmarkSequence::new(frames).unwrap(),
            video_fps: 30.0,
            video_width: 720,
            video_height: 1280,
            error: None,
        })
    }
}

fn body_frame(index: u32, hip_y: f64) -> FrameRecord {
    let mut points = vec![LandmarkPoint::new(0.5, 0.4, 0.0, 0.9); FULL_BODY_LANDMARKS];
    points[LEFT_HIP] = LandmarkPoint::new(0.45, hip_y, 0.0, 0.9);
    points[RIGHT_HIP] = LandmarkPoint::new(0.55, hip_y, 0.0, 0.9);
    points[LEFT_KNEE] = LandmarkPoint::new(0.47, 0.75, 0.0, 0.9);
    points[RIGHT_KNEE] = LandmarkPoint::new(0.57, 0.75, 0.0, 0.9);
    points[LEFT_ANKLE] = LandmarkPoint::new(0.46, 0.92, 0.0, 0.9);
    points[RIGHT_ANKLE] = LandmarkPoint::new(0.56, 0.92, 0.0, 0.9);
    FrameRecord::detected(index, f64::from(index) / 30.0, points)
}

fn squats() -> Vec<FrameRecord> {
    (0..60u32)
        .map(|i| {
            let y = 0.5 - 0.1 * (2.0 * std::f64::consts::PI * f64::from(i) / 20.0).cos();
            body_frame(i, y)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        store: StoreBackend::Memory,
        media: MediaSource::Local {
            root: "./media".to_string(),
        },
        pose_service_url: "http://localhost:8001".to_string(),
        pose_service_timeout_secs: 5,
    }
}

/// The application router over an in-memory store, plus handles for seeding
/// videos and waiting on background runs.
pub struct TestApp {
    pub store: Arc<InMemoryAnalysisStore>,
    pub runner: AnalysisRunner,
    router: Router,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Register a video at `path` and return its id.
    pub async fn video(&self, video_type: &str, path: &str) -> EntityId {
        self.store
            .insert_video(CreateVideoUpload {
                user_id: Uuid::nil(),
                exercise_type_id: 1,
                video_type: video_type.to_string(),
                file_path: path.to_string(),
                file_size_bytes: None,
                duration_seconds: None,
                width: None,
                height: None,
            })
            .await
            .id
    }

    /// Wait until no analysis run is in flight.
    pub async fn settle(&self) {
        for _ in 0..500 {
            if self.runner.in_flight() == 0 {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("analysis runs did not finish");
    }
}

/// Build the full application router with all middleware layers.
///
/// This mirrors the router construction in `main.rs` so integration tests
/// exercise the same middleware stack that production uses.
pub fn build_test_app() -> TestApp {
    let store = Arc::new(InMemoryAnalysisStore::new());
    let runner = AnalysisRunner::new(
        store.clone(),
        Arc::new(EchoMedia),
        Arc::new(SquatPose),
        PipelineConfig::default(),
    );
    let state = AppState::new(runner.clone(), test_config());

    let cors = CorsLayer::new()
        .allow_origin(["http://localhost:3000".parse().unwrap()])
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state);

    TestApp {
        store,
        runner,
        router,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
