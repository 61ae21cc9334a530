//! Typed JSON-RPC 2.0 transport.
//!
//! The same `audio.*` methods are served over HTTP (`POST /rpc`) and over
//! stdio (`voxnote rpc`). Chunk audio travels base64-encoded.

mod protocol;
mod server;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use server::RpcServer;

use crate::api::owner_from_headers;
use crate::service::SessionService;
use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use std::sync::Arc;

/// Build the HTTP router for `POST /rpc`.
pub fn router(service: Arc<SessionService>) -> Router {
    Router::new()
        .route("/rpc", post(handle_rpc))
        .with_state(RpcServer::new(service))
}

async fn handle_rpc(
    State(server): State<RpcServer>,
    headers: HeaderMap,
    body: String,
) -> Json<JsonRpcResponse> {
    Json(server.handle_line(&body, owner_from_headers(&headers)).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionSettings;
    use crate::prompt::PromptBuilder;
    use crate::provider::testing::{RecordingGenerator, ScriptedTranscriber};
    use crate::store::MemorySessionStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_rpc_over_http() {
        let service = SessionService::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(ScriptedTranscriber::new(vec![])),
            Arc::new(RecordingGenerator::new(None)),
            PromptBuilder::default(),
            SessionSettings::default(),
        );
        let app = router(Arc::new(service));

        let request = Request::builder()
            .method("POST")
            .uri("/rpc")
            .header("content-type", "application/json")
            .header("x-user-id", "carol")
            .body(Body::from(
                json!({ "jsonrpc": "2.0", "id": "a", "method": "audio.startSession" }).to_string(),
            ))
            .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["id"], "a");
        let session_id = body["result"]["sessionId"].as_str().unwrap().to_string();

        let request = Request::builder()
            .method("POST")
            .uri("/rpc")
            .body(Body::from(
                json!({
                    "jsonrpc": "2.0",
                    "id": "b",
                    "method": "audio.getSession",
                    "params": { "sessionId": session_id }
                })
                .to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["result"]["userId"], "carol");
    }
}
