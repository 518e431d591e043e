use std::time::Duration;

use movecheck_pipeline::media::DEFAULT_BUCKET;
use movecheck_pipeline::pose::DEFAULT_EXTRACT_TIMEOUT;

/// Where tasks, results and video metadata are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL at `DATABASE_URL`, migrated on startup.
    Postgres { database_url: String },
    /// Process memory. Nothing survives a restart.
    Memory,
}

/// Where video bytes are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Files under a local directory.
    Local { root: String },
    /// An object-storage bucket over HTTP.
    Http {
        base_url: String,
        bucket: String,
        api_key: String,
    },
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except
/// `DATABASE_URL` when the Postgres backend is selected.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long to wait for in-flight analysis runs on shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    pub store: StoreBackend,
    pub media: MediaSource,
    /// Pose service root (default: `http://localhost:8001`).
    pub pose_service_url: String,
    /// Per-extraction request timeout in seconds (default: `300`).
    pub pose_service_timeout_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                    |
    /// |-----------------------------|----------------------------|
    /// | `HOST`                      | `0.0.0.0`                  |
    /// | `PORT`                      | `8000`                     |
    /// | `CORS_ORIGINS`              | `http://localhost:3000`    |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                       |
    /// | `STORE_BACKEND`             | `postgres` (or `memory`)   |
    /// | `DATABASE_URL`              | required for `postgres`    |
    /// | `STORAGE_URL`               | unset: read from `MEDIA_ROOT` |
    /// | `STORAGE_BUCKET`            | `analysis-videos`          |
    /// | `STORAGE_API_KEY`           | empty                      |
    /// | `MEDIA_ROOT`                | `./media`                  |
    /// | `POSE_SERVICE_URL`          | `http://localhost:8001`    |
    /// | `POSE_SERVICE_TIMEOUT_SECS` | `300`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let store = match std::env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".into())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "postgres" => StoreBackend::Postgres {
                database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            },
            "memory" => StoreBackend::Memory,
            other => panic!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        };

        let media = match std::env::var("STORAGE_URL") {
            Ok(base_url) => MediaSource::Http {
                base_url,
                bucket: std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.into()),
                api_key: std::env::var("STORAGE_API_KEY").unwrap_or_default(),
            },
            Err(_) => MediaSource::Local {
                root: std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".into()),
            },
        };

        let pose_service_url =
            std::env::var("POSE_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8001".into());

        let pose_service_timeout_secs: u64 = std::env::var("POSE_SERVICE_TIMEOUT_SECS")
            .map(|v| {
                v.parse()
                    .expect("POSE_SERVICE_TIMEOUT_SECS must be a valid u64")
            })
            .unwrap_or(DEFAULT_EXTRACT_TIMEOUT.as_secs());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            store,
            media,
            pose_service_url,
            pose_service_timeout_secs,
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn pose_service_timeout(&self) -> Duration {
        Duration::from_secs(self.pose_service_timeout_secs)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
