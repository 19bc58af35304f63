//! JSON-RPC surface exposing the tool registry.
//!
//! Speaks the MCP tool-call subset over plain HTTP POST: `initialize`,
//! `tools/list` and `tools/call`, plus a `/health` probe. Each call is
//! independent; the only shared state is the immutable registry.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::tools::ToolRegistry;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ToolRegistry>,
}

/// Build the Axum router serving the RPC endpoint at `path`.
pub fn rpc_routes(registry: Arc<ToolRegistry>, path: &str) -> Router {
    Router::new()
        .route(path, post(handle_rpc))
        .route("/health", get(health))
        .with_state(AppState { registry })
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "courier"
    }))
}

#[derive(Debug, Deserialize)]
struct RpcRequest {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

async fn handle_rpc(
    State(state): State<AppState>,
    Json(req): Json<RpcRequest>,
) -> (StatusCode, Json<Value>) {
    let call_id = Uuid::new_v4();
    tracing::debug!(%call_id, method = %req.method, "RPC request");

    match req.method.as_str() {
        "initialize" => rpc_result(
            req.id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": "courier",
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        ),

        // Notifications carry no id and expect no result.
        "notifications/initialized" => (StatusCode::ACCEPTED, Json(Value::Null)),

        "ping" => rpc_result(req.id, json!({})),

        "tools/list" => {
            let definitions = state.registry.definitions();
            rpc_result(req.id, json!({ "tools": definitions }))
        }

        "tools/call" => {
            let params: ToolCallParams = match serde_json::from_value(req.params) {
                Ok(p) => p,
                Err(e) => {
                    return rpc_error(req.id, -32602, format!("Invalid params: {e}"));
                }
            };

            let Some(tool) = state.registry.get(&params.name) else {
                return rpc_error(req.id, -32602, format!("Unknown tool: {}", params.name));
            };

            let reply = tool.call(params.arguments).await;
            if reply.is_error {
                tracing::warn!(%call_id, tool = %params.name, "Tool call failed");
            } else {
                tracing::info!(%call_id, tool = %params.name, "Tool call succeeded");
            }

            rpc_result(
                req.id,
                json!({
                    "content": [{ "type": "text", "text": reply.text }],
                    "isError": reply.is_error,
                }),
            )
        }

        other => rpc_error(req.id, -32601, format!("Method not found: {other}")),
    }
}

fn rpc_result(id: Option<Value>, result: Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "jsonrpc": "2.0",
            "id": id.unwrap_or(Value::Null),
            "result": result,
        })),
    )
}

fn rpc_error(id: Option<Value>, code: i64, message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "jsonrpc": "2.0",
            "id": id.unwrap_or(Value::Null),
            "error": { "code": code, "message": message },
        })),
    )
}
