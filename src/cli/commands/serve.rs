//! HTTP server for browser recorders and RPC clients.
//!
//! Mounts the REST API and the `POST /rpc` endpoint on one listener.

use crate::api;
use crate::cli::Output;
use crate::config::Settings;
use crate::rpc;
use crate::service::SessionService;
use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the combined application router.
pub fn app(service: Arc<SessionService>, settings: &Settings) -> Router {
    let mut app = api::router(service.clone())
        .merge(rpc::router(service))
        .layer(DefaultBodyLimit::max(settings.server.max_body_bytes))
        .layer(TraceLayer::new_for_http());

    if settings.server.cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Run the HTTP server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let service = Arc::new(SessionService::from_settings(&settings)?);

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let app = app(service, &settings);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    Output::header("voxnote server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Store", &settings.store.provider.to_string());
    Output::kv("LLM model", &settings.llm.model);
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Start session", "POST /api/start-session");
    Output::kv("Upload chunk", "POST /api/upload-chunk");
    Output::kv("Stop session", "POST /api/stop-session");
    Output::kv("Summary", "POST /api/generate-summary");
    Output::kv("Translate", "POST /api/translate");
    Output::kv("Sessions", "GET  /api/sessions");
    Output::kv("Session", "GET  /api/sessions/{id}");
    Output::kv("JSON-RPC", "POST /rpc");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
    }
}
