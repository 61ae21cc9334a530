//! REST transport over the session service.
//!
//! Snake_case JSON bodies; chunk uploads arrive as multipart form data.

use crate::error::VoxnoteError;
use crate::service::SessionService;
use crate::session::Session;
use axum::{
    extract::{rejection::JsonRejection, Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

/// Header carrying the caller identity issued by the upstream authenticator.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Build the REST router.
pub fn router(service: Arc<SessionService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/start-session", post(start_session))
        .route("/api/upload-chunk", post(upload_chunk))
        .route("/api/stop-session", post(stop_session))
        .route("/api/generate-summary", post(generate_summary))
        .route("/api/translate", post(translate))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/{session_id}", get(get_session))
        .with_state(service)
}

/// Caller identity from the request headers, if present.
pub fn owner_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// === Request/Response Types ===

#[derive(Serialize)]
struct StartSessionResponse {
    success: bool,
    session_id: String,
    message: String,
}

#[derive(Deserialize, Default)]
struct ChunkQuery {
    session_id: Option<String>,
    chunk_number: Option<String>,
}

#[derive(Serialize)]
struct UploadChunkResponse {
    success: bool,
    chunk_number: String,
    transcription: String,
    complete_text: String,
    deepgram_calls: u64,
    accumulated_size: u64,
}

#[derive(Deserialize)]
struct SessionRequest {
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Serialize)]
struct StopSessionResponse {
    success: bool,
    complete_text: String,
    total_chunks: u64,
    deepgram_calls: u64,
    total_size: u64,
}

#[derive(Deserialize)]
struct SummaryRequest {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    summary_type: Option<String>,
    #[serde(default)]
    summary_language: Option<String>,
}

#[derive(Serialize)]
struct SummaryResponse {
    success: bool,
    summary: String,
    summary_type: String,
    original_text: String,
}

#[derive(Deserialize)]
struct TranslateRequest {
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    target_language: Option<String>,
}

/// Missing, null and blank fields all fall back to `default`.
fn or_default(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[derive(Serialize)]
struct TranslateResponse {
    success: bool,
    translation: String,
    target_language: String,
}

#[derive(Serialize)]
struct SessionListResponse {
    success: bool,
    total: usize,
    sessions: Vec<Session>,
}

#[derive(Serialize)]
struct SessionDetailResponse {
    success: bool,
    session: Session,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: message,
        }),
    )
        .into_response()
}

fn json_rejection(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    error_response(
        StatusCode::BAD_REQUEST,
        format!("Invalid request body: {}", rejection.body_text()),
    )
}

impl IntoResponse for VoxnoteError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            warn!("Request rejected: {}", self);
            StatusCode::BAD_REQUEST
        } else {
            error!("Request failed: {}", self);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        error_response(status, self.to_string())
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn start_session(
    State(service): State<Arc<SessionService>>,
    headers: HeaderMap,
) -> Response {
    match service.start_session(owner_from_headers(&headers)).await {
        Ok(id) => Json(StartSessionResponse {
            success: true,
            session_id: id.to_string(),
            message: "Session started successfully".to_string(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn upload_chunk(
    State(service): State<Arc<SessionService>>,
    Query(query): Query<ChunkQuery>,
    mut multipart: Multipart,
) -> Response {
    let mut session_id = query.session_id;
    let mut chunk_number = query.chunk_number;
    let mut audio: Option<Vec<u8>> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return error_response(StatusCode::BAD_REQUEST, format!("Invalid multipart body: {}", e))
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        let is_file = field.file_name().is_some();

        let result = match name.as_str() {
            "session_id" => field.text().await.map(|v| session_id = Some(v)),
            "chunk_number" => field.text().await.map(|v| chunk_number = Some(v)),
            "audio" | "file" => field.bytes().await.map(|v| audio = Some(v.to_vec())),
            _ if is_file && audio.is_none() => field.bytes().await.map(|v| audio = Some(v.to_vec())),
            _ => Ok(()),
        };

        if let Err(e) = result {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid multipart field '{}': {}", name, e));
        }
    }

    let Some(session_id) = session_id.filter(|s| !s.trim().is_empty()) else {
        return VoxnoteError::InvalidSession(String::new()).into_response();
    };

    let Some(audio) = audio else {
        return error_response(StatusCode::BAD_REQUEST, "No audio file provided".to_string());
    };

    let chunk_number = chunk_number.unwrap_or_else(|| "0".to_string());

    match service.upload_chunk(&session_id, &chunk_number, &audio).await {
        Ok(result) => Json(UploadChunkResponse {
            success: true,
            chunk_number: result.chunk_number,
            transcription: result.transcription,
            complete_text: result.complete_text,
            deepgram_calls: result.transcription_calls,
            accumulated_size: result.accumulated_bytes,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn stop_session(
    State(service): State<Arc<SessionService>>,
    body: std::result::Result<Json<SessionRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(rejection),
    };
    let session_id = req.session_id.unwrap_or_default();

    match service.stop_session(&session_id).await {
        Ok(result) => Json(StopSessionResponse {
            success: true,
            complete_text: result.complete_text,
            total_chunks: result.total_chunks,
            deepgram_calls: result.transcription_calls,
            total_size: result.total_bytes,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn generate_summary(
    State(service): State<Arc<SessionService>>,
    body: std::result::Result<Json<SummaryRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(rejection),
    };
    let session_id = req.session_id.unwrap_or_default();
    let summary_type = or_default(req.summary_type, "medium");
    let summary_language = or_default(req.summary_language, "en");

    match service
        .generate_summary(&session_id, &summary_type, &summary_language)
        .await
    {
        Ok(result) => Json(SummaryResponse {
            success: true,
            summary: result.summary,
            summary_type: result.summary_type,
            original_text: result.original_text,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn translate(
    State(service): State<Arc<SessionService>>,
    body: std::result::Result<Json<TranslateRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return json_rejection(rejection),
    };
    let session_id = req.session_id.unwrap_or_default();
    let target_language = or_default(req.target_language, "ja");

    match service.translate(&session_id, &target_language).await {
        Ok(result) => Json(TranslateResponse {
            success: true,
            translation: result.translation,
            target_language: result.target_language,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn list_sessions(
    State(service): State<Arc<SessionService>>,
    headers: HeaderMap,
) -> Response {
    let owner = owner_from_headers(&headers);
    match service.list_sessions(owner.as_deref()).await {
        Ok(sessions) => Json(SessionListResponse {
            success: true,
            total: sessions.len(),
            sessions,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn get_session(
    State(service): State<Arc<SessionService>>,
    Path(session_id): Path<String>,
) -> Response {
    match service.get_session(&session_id).await {
        Ok(session) => Json(SessionDetailResponse {
            success: true,
            session,
        })
        .into_response(),
        Err(VoxnoteError::InvalidSession(id)) => {
            error_response(StatusCode::NOT_FOUND, format!("Session not found: {}", id))
        }
        Err(e) => e.into_response(),
    }
}
