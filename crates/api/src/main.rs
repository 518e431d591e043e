use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use movecheck_api::config::{MediaSource, ServerConfig, StoreBackend};
use movecheck_api::routes;
use movecheck_api::state::AppState;
use movecheck_pipeline::media::{HttpMediaStore, LocalMediaStore, MediaStore};
use movecheck_pipeline::memory::InMemoryAnalysisStore;
use movecheck_pipeline::pose::HttpPoseExtractor;
use movecheck_pipeline::store::{AnalysisStore, PgAnalysisStore};
use movecheck_pipeline::{AnalysisRunner, PipelineConfig};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "movecheck_api=debug,movecheck_pipeline=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let pipeline_config = PipelineConfig::from_env();
    tracing::info!(
        min_cycle_frames = pipeline_config.segmentation.min_cycle_duration,
        strict_segmentation = pipeline_config.strict_segmentation,
        store_skeleton_snapshot = pipeline_config.store_skeleton_snapshot,
        "Loaded pipeline configuration",
    );

    // --- Storage ---
    let store = build_store(&config.store).await;

    // --- Collaborators ---
    let media: Arc<dyn MediaStore> = match &config.media {
        MediaSource::Local { root } => {
            tracing::info!(%root, "Reading videos from local directory");
            Arc::new(LocalMediaStore::new(root.as_str()))
        }
        MediaSource::Http {
            base_url,
            bucket,
            api_key,
        } => {
            tracing::info!(%base_url, %bucket, "Reading videos from object storage");
            Arc::new(HttpMediaStore::new(
                base_url.clone(),
                bucket.clone(),
                api_key.clone(),
            ))
        }
    };

    let pose = Arc::new(
        HttpPoseExtractor::new(
            config.pose_service_url.clone(),
            config.pose_service_timeout(),
        )
        .expect("Failed to build pose service client"),
    );
    tracing::info!(url = %config.pose_service_url, "Pose service client ready");

    // --- Analysis runner ---
    let runner = AnalysisRunner::new(store, media, pose, pipeline_config);

    // --- CORS ---
    let cors = build_cors_layer(&config);

    // --- App state ---
    let state = AppState::new(runner.clone(), config.clone());

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
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

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!(
        in_flight = runner.in_flight(),
        "Server stopped accepting connections, draining analysis runs"
    );
    if runner.shutdown(config.shutdown_timeout()).await {
        tracing::info!("Graceful shutdown complete");
    } else {
        tracing::warn!("Shutdown timeout elapsed with analysis runs unfinished");
    }
}

/// Connect the configured store. Postgres is health-checked and migrated
/// before use.
async fn build_store(backend: &StoreBackend) -> Arc<dyn AnalysisStore> {
    match backend {
        StoreBackend::Postgres { database_url } => {
            let pool = movecheck_db::create_pool(database_url)
                .await
                .expect("Failed to connect to database");
            tracing::info!("Database connection pool created");

            movecheck_db::health_check(&pool)
                .await
                .expect("Database health check failed");

            movecheck_db::run_migrations(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Database migrations applied");

            Arc::new(PgAnalysisStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; tasks and results are lost on restart");
            Arc::new(InMemoryAnalysisStore::new())
        }
    }
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
