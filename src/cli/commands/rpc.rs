//! RPC command implementation.

use crate::config::Settings;
use crate::rpc::RpcServer;
use crate::service::SessionService;
use anyhow::Result;
use std::sync::Arc;

/// Serve JSON-RPC over stdin/stdout.
pub async fn run_rpc(settings: Settings) -> Result<()> {
    let service = Arc::new(SessionService::from_settings(&settings)?);
    RpcServer::new(service).run().await
}
