//! Web UI for the Duet demo conversation
//!
//! Serves a single page with the chat panel, plus JSON endpoints for
//! messages and uploads and an SSE endpoint for the timed demo playback.
//! All requests share one [`ChatSession`].

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use duet_core::{
    get_env_bool, get_env_int, get_env_or, ChatSession, Result, SessionSettings, UploadStore,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub mod handlers;
mod page;

pub use handlers::{ApiError, ChatInput, ChatOutput, TranscriptOutput, UploadInput};

#[derive(Clone, Debug)]
pub struct DuetUiConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    /// Root of the `videos/`, `fnirs/` and `eeg/` upload directories
    pub uploads_dir: PathBuf,
    /// Largest accepted request body (uploads arrive base64 encoded)
    pub max_body_bytes: usize,
    pub session: SessionSettings,
}

impl Default for DuetUiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "0.0.0.0".into(),
            port: 7860,
            uploads_dir: PathBuf::from("uploads"),
            max_body_bytes: 64 * 1024 * 1024,
            session: SessionSettings::default(),
        }
    }
}

impl DuetUiConfig {
    /// Build the config from `DUET_UI_*` and `DUET_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: get_env_bool("DUET_UI_ENABLED", defaults.enabled),
            host: get_env_or("DUET_UI_HOST", &defaults.host),
            port: get_env_int("DUET_UI_PORT", defaults.port),
            uploads_dir: PathBuf::from(get_env_or("DUET_UPLOADS_DIR", "uploads")),
            max_body_bytes: get_env_int("DUET_MAX_UPLOAD_MB", 64usize) * 1024 * 1024,
            session: SessionSettings::from_env(),
        }
    }
}

#[derive(Clone)]
pub struct DuetUiServer {
    pub config: Arc<DuetUiConfig>,
    pub session: Arc<RwLock<ChatSession>>,
    pub uploads: UploadStore,
    shutdown_tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl DuetUiServer {
    pub fn new(config: DuetUiConfig) -> Self {
        let session = ChatSession::new(config.session.clone());
        Self::with_session(config, Arc::new(RwLock::new(session)))
    }

    /// Serve an existing session
    pub fn with_session(config: DuetUiConfig, session: Arc<RwLock<ChatSession>>) -> Self {
        let uploads = UploadStore::new(config.uploads_dir.clone());
        Self {
            config: Arc::new(config),
            session,
            uploads,
            shutdown_tx: Arc::new(Mutex::new(None)),
        }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        Router::new()
            .route("/", get(handlers::index))
            .route("/health", get(handlers::health))
            .route("/transcript", get(handlers::transcript))
            .route("/chat", post(handlers::chat))
            .route("/demo", get(handlers::demo))
            .route("/demo/stream", get(handlers::demo_stream))
            .route("/upload/:kind", post(handlers::upload))
            .layer(DefaultBodyLimit::max(self.config.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .with_state(self.clone())
    }

    /// Bind and serve in the background until `stop` or Ctrl-C
    pub async fn start(&self) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        self.uploads.ensure_dirs().await?;

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        info!("Starting Duet UI on http://{}", addr);

        let (tx, rx) = oneshot::channel();
        if let Ok(mut slot) = self.shutdown_tx.lock() {
            *slot = Some(tx);
        }

        let abort = self.abort_handle();
        let router = self.router();
        tokio::spawn(async move {
            let shutdown = async move {
                tokio::select! {
                    _ = rx => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
                // open replay streams would otherwise hold graceful shutdown
                abort.abort();
            };
            if let Err(e) = axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
            {
                error!("Server error: {}", e);
            }
        });
        Ok(())
    }

    /// End the session and shut the server down
    pub async fn stop(&self) -> Result<()> {
        if let Ok(session) = self.session.read() {
            session.end();
        }
        let tx = self.shutdown_tx.lock().ok().and_then(|mut slot| slot.take());
        if let Some(tx) = tx {
            let _ = tx.send(());
            info!("Duet UI stopped");
        }
        Ok(())
    }

    fn abort_handle(&self) -> duet_core::ReplayAbort {
        match self.session.read() {
            Ok(session) => session.abort_handle(),
            Err(poisoned) => poisoned.into_inner().abort_handle(),
        }
    }
}
