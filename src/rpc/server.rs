//! JSON-RPC dispatcher and stdio loop.

use super::protocol::*;
use crate::service::SessionService;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

/// RPC front-end for the session service.
#[derive(Clone)]
pub struct RpcServer {
    service: Arc<SessionService>,
}

impl RpcServer {
    pub fn new(service: Arc<SessionService>) -> Self {
        Self { service }
    }

    /// Run over stdio: one request per line in, one response per line out.
    pub async fn run(&self) -> anyhow::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        info!("voxnote RPC server listening on stdio");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_line(&line, None).await;
            let mut encoded = serde_json::to_string(&response)?;
            encoded.push('\n');
            stdout.write_all(encoded.as_bytes()).await?;
            stdout.flush().await?;
        }

        info!("stdin closed, RPC server exiting");
        Ok(())
    }

    /// Parse and dispatch one raw request.
    pub async fn handle_line(&self, line: &str, caller: Option<String>) -> JsonRpcResponse {
        match serde_json::from_str::<JsonRpcRequest>(line) {
            Ok(request) => self.handle_request(request, caller).await,
            Err(e) => {
                warn!("Failed to parse request: {}", e);
                JsonRpcResponse::error(None, PARSE_ERROR, "Parse error")
            }
        }
    }

    /// Handle a single JSON-RPC request.
    ///
    /// `caller` is the identity the transport authenticated. A `userId` param
    /// is only honoured when there is none, as on stdio.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        caller: Option<String>,
    ) -> JsonRpcResponse {
        debug!("RPC {}", request.method);
        let id = request.id;
        let params = request.params;

        match request.method.as_str() {
            "audio.startSession" => {
                let params: StartSessionParams = match parse_optional_params(params) {
                    Ok(p) => p,
                    Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
                };
                let owner = caller.or(params.user_id);
                respond(
                    id,
                    self.service
                        .start_session(owner)
                        .await
                        .map(|session_id| StartSessionResult {
                            session_id: session_id.to_string(),
                        }),
                )
            }
            "audio.uploadChunk" => {
                let params: UploadChunkParams = match parse_params(params) {
                    Ok(p) => p,
                    Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
                };
                respond(
                    id,
                    self.service
                        .upload_chunk_base64(&params.session_id, &params.chunk_number, &params.audio_data)
                        .await
                        .map(UploadChunkResult::from),
                )
            }
            "audio.stopSession" => {
                let params: SessionParams = match parse_params(params) {
                    Ok(p) => p,
                    Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
                };
                respond(
                    id,
                    self.service
                        .stop_session(&params.session_id)
                        .await
                        .map(StopSessionResult::from),
                )
            }
            "audio.generateSummary" => {
                let params: GenerateSummaryParams = match parse_params(params) {
                    Ok(p) => p,
                    Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
                };
                let summary_type = non_blank(params.summary_type.as_deref()).unwrap_or("medium");
                let language = non_blank(params.summary_language.as_deref()).unwrap_or("en");
                respond(
                    id,
                    self.service
                        .generate_summary(&params.session_id, summary_type, language)
                        .await
                        .map(GenerateSummaryResult::from),
                )
            }
            "audio.translate" => {
                let params: TranslateParams = match parse_params(params) {
                    Ok(p) => p,
                    Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
                };
                respond(
                    id,
                    self.service
                        .translate(&params.session_id, &params.target_language)
                        .await
                        .map(TranslateResult::from),
                )
            }
            "audio.getSessions" => {
                let params: GetSessionsParams = match parse_optional_params(params) {
                    Ok(p) => p,
                    Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
                };
                let owner = caller.or(params.user_id);
                respond(
                    id,
                    self.service.list_sessions(owner.as_deref()).await.map(|sessions| {
                        sessions.into_iter().map(SessionInfo::from).collect::<Vec<_>>()
                    }),
                )
            }
            "audio.getSession" => {
                let params: SessionParams = match parse_params(params) {
                    Ok(p) => p,
                    Err(message) => return JsonRpcResponse::error(id, INVALID_PARAMS, &message),
                };
                respond(
                    id,
                    self.service
                        .get_session(&params.session_id)
                        .await
                        .map(SessionInfo::from),
                )
            }
            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    match params {
        Some(p) => serde_json::from_value(p).map_err(|e| format!("Invalid params: {}", e)),
        None => Err("Missing params".to_string()),
    }
}

fn parse_optional_params<T: DeserializeOwned + Default>(params: Option<Value>) -> Result<T, String> {
    match params {
        None | Some(Value::Null) => Ok(T::default()),
        Some(p) => serde_json::from_value(p).map_err(|e| format!("Invalid params: {}", e)),
    }
}

fn respond<T: Serialize>(id: Option<Value>, result: crate::Result<T>) -> JsonRpcResponse {
    match result {
        Ok(value) => match serde_json::to_value(value) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => {
                error!("Failed to encode result: {}", e);
                JsonRpcResponse::error(id, SERVER_ERROR, "Failed to encode result")
            }
        },
        Err(e) => {
            if e.is_client_error() {
                warn!("RPC rejected: {}", e);
            } else {
                error!("RPC failed: {}", e);
            }
            JsonRpcResponse::domain_error(id, &e)
        }
    }
}
