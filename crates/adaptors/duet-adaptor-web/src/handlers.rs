//! Request handlers for the Duet web UI

use crate::page::index_page;
use crate::DuetUiServer;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use duet_core::{summarize_tabular, ChatSession, DuetError, ReplayScript, UploadKind};
use futures_util::stream::{self, BoxStream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};
use tracing::{error, info, warn};

#[derive(Deserialize)]
pub struct ChatInput {
    #[serde(default)]
    pub text: String,
}

/// Rendered chat panel returned by every mutating endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatOutput {
    pub success: bool,
    pub html: String,
}

impl ChatOutput {
    fn ok(html: String) -> Json<Self> {
        Json(Self {
            success: true,
            html,
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptOutput {
    pub success: bool,
    pub html: String,
    pub turns: usize,
}

/// Upload payload; binary files arrive base64 encoded
#[derive(Deserialize)]
pub struct UploadInput {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub base64_encoded: bool,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(serde_json::json!({
            "success": false,
            "error": message,
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

impl From<DuetError> for ApiError {
    fn from(err: DuetError) -> Self {
        match err {
            DuetError::Validation(msg) => ApiError::BadRequest(msg),
            other => {
                error!("DuetError: {}", other);
                ApiError::Internal(other.to_string())
            }
        }
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

fn read_session(state: &DuetUiServer) -> ApiResult<RwLockReadGuard<'_, ChatSession>> {
    state
        .session
        .read()
        .map_err(|_| ApiError::Internal("Session lock poisoned".to_string()))
}

fn write_session(state: &DuetUiServer) -> ApiResult<RwLockWriteGuard<'_, ChatSession>> {
    state
        .session
        .write()
        .map_err(|_| ApiError::Internal("Session lock poisoned".to_string()))
}

/// Render the demo, or the "no demo data" notice when the fixture is unusable
fn demo_or_notice(session: &ChatSession, result: duet_core::Result<String>) -> ApiResult<String> {
    match result {
        Ok(html) => Ok(html),
        Err(e) if e.is_fixture() => {
            warn!("DEMO_UNAVAILABLE {}", e);
            Ok(session.render_no_demo()?)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn index(State(state): State<DuetUiServer>) -> ApiResult<Html<String>> {
    let html = read_session(&state)?.render()?;
    Ok(index_page(&html))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn transcript(State(state): State<DuetUiServer>) -> ApiResult<Json<TranscriptOutput>> {
    let session = read_session(&state)?;
    Ok(Json(TranscriptOutput {
        success: true,
        html: session.render()?,
        turns: session.transcript().len(),
    }))
}

/// Read the fixture without blocking a worker or holding the session lock
async fn load_fixture(state: &DuetUiServer) -> ApiResult<duet_core::Result<ReplayScript>> {
    let fixture_path = read_session(state)?.settings().fixture_path.clone();
    Ok(ReplayScript::load_async(&fixture_path).await)
}

pub async fn chat(
    State(state): State<DuetUiServer>,
    Json(input): Json<ChatInput>,
) -> ApiResult<Json<ChatOutput>> {
    let is_trigger = read_session(&state)?.is_trigger(input.text.trim());
    if is_trigger {
        info!("CHAT_TRIGGER demo playback requested");
        let loaded = load_fixture(&state).await?;
        let session = read_session(&state)?;
        let result = loaded.and_then(|script| session.demo_render_script(&script));
        return Ok(ChatOutput::ok(demo_or_notice(&session, result)?));
    }

    let mut session = write_session(&state)?;
    let html = session.send_message(&input.text)?;
    Ok(ChatOutput::ok(html))
}

pub async fn demo(State(state): State<DuetUiServer>) -> ApiResult<Html<String>> {
    let loaded = load_fixture(&state).await?;
    let session = read_session(&state)?;
    let result = loaded.and_then(|script| session.demo_render_script(&script));
    Ok(Html(demo_or_notice(&session, result)?))
}

type EventStream = BoxStream<'static, std::result::Result<Event, Infallible>>;

/// SSE data lines cannot carry carriage returns
fn sse_data(text: String) -> String {
    if text.contains('\r') {
        text.replace('\r', "")
    } else {
        text
    }
}

/// One `snapshot` event per revealed record, then `done`
pub async fn demo_stream(State(state): State<DuetUiServer>) -> ApiResult<Sse<EventStream>> {
    let loaded = load_fixture(&state).await?;

    let session = read_session(&state)?;
    let stream: EventStream = match loaded {
        Ok(script) => {
            info!("DEMO_STREAM_START records={}", script.len());
            session
                .replay_script(&script)
                .map(|snapshot| {
                    Ok(match snapshot {
                        Ok(html) => Event::default().event("snapshot").data(sse_data(html)),
                        Err(e) => {
                            error!("DEMO_STREAM_ERROR {}", e);
                            Event::default().event("error").data(sse_data(e.to_string()))
                        }
                    })
                })
                .chain(stream::once(async {
                    Ok(Event::default().event("done").data("{}"))
                }))
                .boxed()
        }
        Err(e) => {
            warn!("DEMO_UNAVAILABLE {}", e);
            let notice = sse_data(session.render_no_demo()?);
            stream::once(async move { Ok(Event::default().event("error").data(notice)) }).boxed()
        }
    };
    Ok(Sse::new(stream))
}

pub async fn upload(
    State(state): State<DuetUiServer>,
    Path(kind): Path<String>,
    Json(input): Json<UploadInput>,
) -> ApiResult<Json<ChatOutput>> {
    let kind: UploadKind = kind
        .parse()
        .map_err(|_| ApiError::NotFound(format!("Unknown upload kind '{}'", kind)))?;

    if input.filename.trim().is_empty() {
        let session = read_session(&state)?;
        return Ok(ChatOutput::ok(
            session.renderer().render_notice(&kind.missing_notice())?,
        ));
    }

    let bytes = if input.base64_encoded {
        use base64::{engine::general_purpose::STANDARD, Engine};
        STANDARD.decode(input.content.as_bytes()).map_err(|_| {
            error!("UPLOAD_ERROR invalid base64 encoding");
            ApiError::BadRequest("Invalid base64 encoding".to_string())
        })?
    } else {
        input.content.into_bytes()
    };

    info!(
        "UPLOAD_START kind={} filename={} bytes={}",
        kind,
        input.filename,
        bytes.len()
    );
    let stored = state.uploads.save(kind, &input.filename, &bytes).await?;
    let summary = kind
        .is_tabular()
        .then(|| summarize_tabular(&stored.file_name, &bytes));

    let mut session = write_session(&state)?;
    let html = session.record_upload(kind, &stored.file_name, summary)?;
    Ok(ChatOutput::ok(html))
}
