//! Line-delimited JSON-RPC 2.0 over stdio.
//!
//! Each request is one JSON object per line; each response is written as one
//! line. Notifications (messages without an `id`) never get a response.
//! Requests run concurrently, so responses are written in completion order
//! and clients match them up by `id`.

use std::sync::Arc;

use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::tools::{PrAgentTools, is_error_payload, tool_definitions};

/// Protocol version answered when the client does not request one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_NAME: &str = "pr-agent";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

/// Serve requests from `reader` until end of input.
///
/// Every request is handled on its own task; a slow tool call does not hold
/// up later requests. Returns once input is closed and every in-flight
/// request has been answered.
pub async fn serve<R, W>(tools: Arc<PrAgentTools>, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let mut tx = Some(tx);
    let mut lines = reader.lines();

    loop {
        tokio::select! {
            line = lines.next_line(), if tx.is_some() => {
                let Some(line) = line? else {
                    debug!("input closed, draining in-flight requests");
                    tx = None;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                if let Some(tx) = &tx {
                    let tx = tx.clone();
                    let tools = Arc::clone(&tools);
                    tokio::spawn(async move {
                        if let Some(response) = handle_line(&tools, &line).await {
                            // The receiver only goes away if serving already failed.
                            let _ = tx.send(response);
                        }
                    });
                }
            }
            Some(response) = rx.recv() => {
                writer.write_all(response.to_string().as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
            else => break,
        }
    }

    debug!("all requests answered, shutting down");
    Ok(())
}

/// Handle one raw request line.
pub async fn handle_line(tools: &PrAgentTools, line: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(line) {
        Ok(msg) => handle_message(tools, &msg).await,
        Err(e) => {
            warn!("unparsable request: {}", e);
            Some(error_response(Value::Null, PARSE_ERROR, &format!("Parse error: {e}")))
        }
    }
}

async fn handle_message(tools: &PrAgentTools, msg: &Value) -> Option<Value> {
    let method = msg["method"].as_str().unwrap_or_default();
    let Some(id) = msg.get("id").cloned() else {
        debug!(method, "notification received");
        return None;
    };

    let response = match method {
        "initialize" => on_initialize(id, &msg["params"]),
        "ping" => success(id, json!({})),
        "tools/list" => success(id, json!({ "tools": tool_definitions() })),
        "tools/call" => on_tools_call(tools, id, &msg["params"]).await,
        other => error_response(id, METHOD_NOT_FOUND, &format!("Method not found: {other}")),
    };
    Some(response)
}

fn on_initialize(id: Value, params: &Value) -> Value {
    let version = params["protocolVersion"]
        .as_str()
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);

    success(
        id,
        json!({
            "protocolVersion": version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": env!("CARGO_PKG_VERSION"),
            },
        }),
    )
}

async fn on_tools_call(tools: &PrAgentTools, id: Value, params: &Value) -> Value {
    let Some(name) = params["name"].as_str() else {
        return error_response(id, INVALID_PARAMS, "Missing tool name");
    };
    debug!(tool = name, "tool call");

    match tools.invoke(name, &params["arguments"]).await {
        Ok(text) => {
            let is_error = is_error_payload(&text);
            success(
                id,
                json!({
                    "content": [{ "type": "text", "text": text }],
                    "isError": is_error,
                }),
            )
        }
        Err(e) => error_response(id, INVALID_PARAMS, &e.to_string()),
    }
}

fn success(id: Value, result: Value) -> Value {
    json!({ "jsonrpc": "2.0", "id": id, "result": result })
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}
