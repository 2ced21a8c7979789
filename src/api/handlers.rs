//! HTTP request handlers

use super::sse::sse_stream;
use super::types::{
    AnswerRequest, ChatRequest, ErrorResponse, ModeInfo, ModeRequest, ModesResponse,
    SettingsRequest, SettingsResponse,
};
use super::AppState;
use crate::chat::{ChatError, ChatTranscript};
use crate::db::DbError;
use crate::practice::Mode;
use crate::runtime::{DispatchError, Intent};
use crate::state_machine::Session;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Practice session
        .route("/api/session", get(get_session))
        .route("/api/session/topic", post(new_topic))
        .route("/api/session/answer", put(edit_answer))
        .route("/api/session/mode", put(select_mode))
        .route("/api/session/submit", post(submit))
        .route("/api/session/stream", get(stream_session))
        .route("/api/modes", get(list_modes))
        // Settings
        .route("/api/settings", get(get_settings).put(save_settings))
        // Free chat
        .route("/api/chat", get(get_chat).post(send_chat))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Practice Session
// ============================================================

async fn get_session(State(state): State<AppState>) -> Json<Session> {
    Json(state.session.snapshot())
}

async fn new_topic(State(state): State<AppState>) -> Result<Json<Session>, AppError> {
    let session = state.session.dispatch(Intent::NewTopic).await?;
    Ok(Json(session))
}

async fn edit_answer(
    State(state): State<AppState>,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let Json(req) = body?;
    let session = state.session.dispatch(Intent::EditAnswer(req.text)).await?;
    Ok(Json(session))
}

async fn select_mode(
    State(state): State<AppState>,
    body: Result<Json<ModeRequest>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let Json(req) = body?;
    let session = state.session.dispatch(Intent::SelectMode(req.mode)).await?;
    Ok(Json(session))
}

async fn submit(State(state): State<AppState>) -> Result<Json<Session>, AppError> {
    let session = state.session.dispatch(Intent::Submit).await?;
    Ok(Json(session))
}

async fn stream_session(State(state): State<AppState>) -> impl IntoResponse {
    // Subscribe before reading the snapshot so nothing falls in between
    let broadcast_rx = state.session.subscribe();
    sse_stream(state.session.snapshot(), broadcast_rx)
}

async fn list_modes() -> Json<ModesResponse> {
    Json(ModesResponse {
        modes: Mode::ALL.into_iter().map(ModeInfo::from).collect(),
        default: Mode::default(),
    })
}

// ============================================================
// Settings
// ============================================================

async fn get_settings(State(state): State<AppState>) -> Json<SettingsResponse> {
    Json(state.settings.get().into())
}

async fn save_settings(
    State(state): State<AppState>,
    body: Result<Json<SettingsRequest>, JsonRejection>,
) -> Result<Json<SettingsResponse>, AppError> {
    let Json(req) = body?;
    let saved = state.settings.save(&req.api_key, &req.model)?;
    Ok(Json(saved.into()))
}

// ============================================================
// Free Chat
// ============================================================

async fn get_chat(State(state): State<AppState>) -> Json<ChatTranscript> {
    Json(state.chat.transcript())
}

async fn send_chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatTranscript>, AppError> {
    let Json(req) = body?;
    let transcript = state.chat.send(&req.text).await?;
    Ok(Json(transcript))
}

async fn get_version() -> &'static str {
    concat!("rephrase-trainer ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<DispatchError> for AppError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::Rejected(rejected) => AppError::Conflict(rejected.to_string()),
            DispatchError::Stopped => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::EmptyMessage => AppError::BadRequest(e.to_string()),
            ChatError::Busy => AppError::Conflict(e.to_string()),
        }
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        tracing::error!(error = %e, "Settings storage failed");
        AppError::Internal(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
