//! MCP (Model Context Protocol) stdio transport adapter.
//!
//! Exposes the operation catalog to clients via JSON-RPC 2.0 over
//! stdin/stdout. Each line on stdin is a JSON-RPC request; each response
//! is written as a single line on stdout.
//!
//! Routed methods:
//! - `initialize` -- returns server capabilities
//! - `notifications/*` -- consumed silently (no response)
//! - `tools/list` -- enumerates the catalog for client-side discovery
//! - `tools/call` -- dispatches an operation
//!
//! Operation failures never surface as JSON-RPC errors: the dispatcher is
//! infallible outward and its error envelope is returned as a normal
//! result. JSON-RPC error objects are reserved for transport-level faults
//! (parse errors, unknown methods, malformed params).

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::dispatcher::Dispatcher;

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Must be `"2.0"`.
    pub jsonrpc: String,
    /// The method name.
    pub method: String,
    /// Optional parameters.
    #[serde(default)]
    pub params: Option<Value>,
    /// Request ID. Absent for notifications.
    #[serde(default)]
    pub id: Option<Value>,
}

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Always `"2.0"`.
    pub jsonrpc: String,
    /// The result on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// The error on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Mirrors the request ID.
    pub id: Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code (standard JSON-RPC).
    pub code: i64,
    /// Human-readable error message.
    pub message: String,
    /// Optional structured error data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// Standard JSON-RPC error codes.
const PARSE_ERROR: i64 = -32700;
const INVALID_PARAMS: i64 = -32602;
const METHOD_NOT_FOUND: i64 = -32601;

// ---------------------------------------------------------------------------
// McpServer
// ---------------------------------------------------------------------------

/// MCP stdio server exposing the operation catalog via JSON-RPC 2.0.
///
/// The server reads JSON-RPC requests from stdin and writes responses to
/// stdout, one JSON object per line. Requests are handled one at a time;
/// no two dispatches overlap on this transport.
pub struct McpServer {
    dispatcher: Dispatcher,
}

impl McpServer {
    /// Create a new MCP server over `dispatcher`.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Run the server loop, reading from `stdin` and writing to `stdout`.
    ///
    /// Exits cleanly when stdin reaches EOF.
    pub async fn run(
        self,
        stdin: impl AsyncBufRead + Unpin,
        mut stdout: impl AsyncWrite + Unpin,
    ) -> Result<()> {
        let mut lines = stdin.lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim().to_string();
            if line.is_empty() {
                continue;
            }

            let request: JsonRpcRequest = match serde_json::from_str(&line) {
                Ok(req) => req,
                Err(_) => {
                    // JSON parse error: respond with null id per JSON-RPC 2.0
                    let response = error_response(
                        Value::Null,
                        PARSE_ERROR,
                        "Parse error".to_string(),
                    );
                    write_response(&mut stdout, &response).await?;
                    continue;
                }
            };

            // Notifications have no id; consume without responding.
            if request.id.is_none() {
                continue;
            }

            let id = request.id.clone().unwrap_or(Value::Null);

            let response = match request.method.as_str() {
                "initialize" => self.handle_initialize(id),
                "tools/list" => self.handle_tools_list(id),
                "tools/call" => self.handle_tools_call(id, request.params).await,
                _ => error_response(
                    id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                ),
            };

            write_response(&mut stdout, &response).await?;
        }

        // EOF on stdin: clean exit
        Ok(())
    }

    fn handle_initialize(&self, id: Value) -> JsonRpcResponse {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(serde_json::json!({
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": "opsforge",
                    "version": env!("CARGO_PKG_VERSION")
                }
            })),
            error: None,
            id,
        }
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let operations = self.dispatcher.catalog().list();
        let tool_objects: Vec<Value> = operations
            .into_iter()
            .map(|op| {
                serde_json::json!({
                    "name": op.name,
                    "description": op.description,
                    "inputSchema": op.input_schema,
                })
            })
            .collect();

        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(serde_json::json!({ "tools": tool_objects })),
            error: None,
            id,
        }
    }

    /// Handle `tools/call`. Params must contain `{ "name": String }` with
    /// optional `"arguments"`. The dispatcher's envelope is always
    /// returned as a result, even when it carries error text.
    async fn handle_tools_call(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params = match params {
            Some(p) => p,
            None => {
                return error_response(
                    id,
                    INVALID_PARAMS,
                    "Missing params for tools/call".to_string(),
                );
            }
        };

        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(name) => name.to_string(),
            None => {
                return error_response(
                    id,
                    INVALID_PARAMS,
                    "Missing 'name' in tools/call params".to_string(),
                );
            }
        };

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let envelope = self.dispatcher.dispatch(&name, arguments).await;
        let result = serde_json::to_value(&envelope)
            .unwrap_or_else(|_| serde_json::json!({ "content": [] }));

        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }
}

fn error_response(id: Value, code: i64, message: String) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        result: None,
        error: Some(JsonRpcError {
            code,
            message,
            data: None,
        }),
        id,
    }
}

/// Write a JSON-RPC response as a single line to the writer.
async fn write_response(
    writer: &mut (impl AsyncWrite + Unpin),
    response: &JsonRpcResponse,
) -> Result<()> {
    let mut line = serde_json::to_string(response)?;
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
