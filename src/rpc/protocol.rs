//! JSON-RPC 2.0 envelope and the typed `audio.*` params and results.

use crate::error::VoxnoteError;
use crate::service::{ChunkResult, StopResult, SummaryResult, TranslationResult};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const SERVER_ERROR: i32 = -32000;

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i32, message: &str) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.to_string(),
                data: None,
            }),
        }
    }

    /// Domain failure, tagged with the error kind so clients can branch on it.
    pub fn domain_error(id: Option<Value>, err: &VoxnoteError) -> Self {
        let mut response = Self::error(id, SERVER_ERROR, &err.to_string());
        if let Some(error) = response.error.as_mut() {
            error.data = Some(json!({ "kind": err.kind() }));
        }
        response
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// === audio.* params ===

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadChunkParams {
    pub session_id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub chunk_number: String,
    pub audio_data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionParams {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummaryParams {
    pub session_id: String,
    #[serde(default)]
    pub summary_type: Option<String>,
    #[serde(default)]
    pub summary_language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateParams {
    pub session_id: String,
    pub target_language: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetSessionsParams {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Browser clients send chunk counters as numbers; the service keeps them opaque.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

// === audio.* results ===

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResult {
    pub session_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadChunkResult {
    pub chunk_number: String,
    pub transcription: String,
    pub complete_text: String,
    pub deepgram_calls: u64,
    pub accumulated_size: u64,
}

impl From<ChunkResult> for UploadChunkResult {
    fn from(r: ChunkResult) -> Self {
        Self {
            chunk_number: r.chunk_number,
            transcription: r.transcription,
            complete_text: r.complete_text,
            deepgram_calls: r.transcription_calls,
            accumulated_size: r.accumulated_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSessionResult {
    pub complete_text: String,
    pub total_chunks: u64,
    pub deepgram_calls: u64,
    pub total_size: u64,
}

impl From<StopResult> for StopSessionResult {
    fn from(r: StopResult) -> Self {
        Self {
            complete_text: r.complete_text,
            total_chunks: r.total_chunks,
            deepgram_calls: r.transcription_calls,
            total_size: r.total_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSummaryResult {
    pub summary: String,
    pub summary_type: String,
    pub original_text: String,
}

impl From<SummaryResult> for GenerateSummaryResult {
    fn from(r: SummaryResult) -> Self {
        Self {
            summary: r.summary,
            summary_type: r.summary_type,
            original_text: r.original_text,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResult {
    pub translation: String,
    pub target_language: String,
}

impl From<TranslationResult> for TranslateResult {
    fn from(r: TranslationResult) -> Self {
        Self {
            translation: r.translation,
            target_language: r.target_language,
        }
    }
}

/// Session record as seen by RPC clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    pub session_id: String,
    pub user_id: Option<String>,
    pub transcript: String,
    pub deepgram_calls: u64,
    pub accumulated_size: u64,
    pub summary: Option<String>,
    pub summary_type: Option<String>,
    pub translation: Option<String>,
    pub translation_language: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Session> for SessionInfo {
    fn from(s: Session) -> Self {
        Self {
            session_id: s.id.to_string(),
            user_id: s.owner,
            transcript: s.transcript,
            deepgram_calls: s.transcription_calls,
            accumulated_size: s.accumulated_bytes,
            summary: s.summary,
            summary_type: s.summary_type,
            translation: s.translation,
            translation_language: s.translation_language,
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}
