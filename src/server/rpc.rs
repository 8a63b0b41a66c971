// JSON-RPC 2.0 envelope, error codes, and method dispatch for POST /rpc

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;

use super::RelayServer;

pub const JSONRPC_VERSION: &str = "2.0";

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// Standard JSON-RPC error codes used by this server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::MethodNotFound => "Method not found",
            ErrorCode::InvalidParams => "Invalid params",
            ErrorCode::InternalError => "Internal error",
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            ErrorCode::ParseError | ErrorCode::InvalidRequest | ErrorCode::InvalidParams => {
                StatusCode::BAD_REQUEST
            }
            ErrorCode::MethodNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A JSON-RPC failure, rendered as an error envelope with the matching HTTP status
#[derive(Debug)]
pub struct RpcError {
    pub code: ErrorCode,
    pub id: Value,
    pub detail: Option<String>,
}

impl RpcError {
    pub fn new(code: ErrorCode, id: Value) -> Self {
        Self {
            code,
            id,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn message(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{}: {}", self.code.message(), detail),
            None => self.code.message().to_string(),
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code.code())
    }
}

impl std::error::Error for RpcError {}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        if self.code == ErrorCode::InternalError {
            tracing::error!(error = %self, "RPC request failed");
        } else {
            tracing::debug!(code = self.code.code(), error = %self, "Rejected RPC request");
        }

        let body = RpcResponse::failure(self.id.clone(), self.code.code(), self.message());
        (self.code.http_status(), Json(body)).into_response()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
}

/// Response envelope; exactly one of `result` / `error` is present
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorObject>,
    pub id: Value,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: None,
            error: Some(RpcErrorObject {
                code,
                message: message.into(),
            }),
            id,
        }
    }
}

/// Methods exposed on /rpc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    UpdatePresence,
    ClearPresence,
    GetStatus,
}

impl Method {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "updatePresence" => Some(Method::UpdatePresence),
            "clearPresence" => Some(Method::ClearPresence),
            "getStatus" => Some(Method::GetStatus),
            _ => None,
        }
    }
}

/// Params for updatePresence. Extra fields (e.g. `album`) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePresenceParams {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    /// Base64-encoded album artwork
    #[serde(default)]
    pub artwork: Option<String>,
}

/// A request that passed envelope validation
#[derive(Debug)]
pub struct RpcCall {
    pub id: Value,
    pub method: Method,
    pub params: Value,
}

/// Validate the envelope: JSON object with a string `method` naming a known method
pub fn parse_call(body: &[u8]) -> Result<RpcCall, RpcError> {
    let request: Value = serde_json::from_slice(body)
        .map_err(|e| RpcError::new(ErrorCode::ParseError, Value::Null).with_detail(e.to_string()))?;

    let Value::Object(mut request) = request else {
        return Err(RpcError::new(ErrorCode::InvalidRequest, Value::Null));
    };

    let id = request.remove("id").unwrap_or(Value::Null);

    let method_name = match request.remove("method") {
        Some(Value::String(name)) => name,
        _ => return Err(RpcError::new(ErrorCode::InvalidRequest, id)),
    };

    let Some(method) = Method::from_name(&method_name) else {
        tracing::debug!(method = %method_name, "Unknown RPC method");
        return Err(RpcError::new(ErrorCode::MethodNotFound, id));
    };

    let params = match request.remove("params") {
        None | Some(Value::Null) => json!({}),
        Some(params) => params,
    };

    Ok(RpcCall { id, method, params })
}

/// Handle POST /rpc
pub async fn handle_rpc(
    State(server): State<Arc<RelayServer>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RpcResponse>, RpcError> {
    let body = body.map_err(body_rejection)?;
    let call = parse_call(&body)?;
    tracing::debug!(method = ?call.method, id = %call.id, "RPC call");

    let result = dispatch(&server, call.method, call.params, &call.id).await?;
    Ok(Json(RpcResponse::success(call.id, result)))
}

/// An unreadable or oversized body still gets a JSON-RPC envelope
fn body_rejection(rejection: BytesRejection) -> RpcError {
    tracing::warn!(status = %rejection.status(), error = %rejection, "Failed to read RPC body");
    RpcError::new(ErrorCode::InvalidRequest, Value::Null).with_detail(rejection.body_text())
}

async fn dispatch(
    server: &RelayServer,
    method: Method,
    params: Value,
    id: &Value,
) -> Result<Value, RpcError> {
    let session = server.session_manager();

    match method {
        Method::UpdatePresence => {
            let params: UpdatePresenceParams = serde_json::from_value(params).map_err(|e| {
                RpcError::new(ErrorCode::InvalidParams, id.clone()).with_detail(e.to_string())
            })?;

            let title = params.title.unwrap_or_else(|| UNKNOWN_TITLE.to_string());
            let artist = params.artist.unwrap_or_else(|| UNKNOWN_ARTIST.to_string());

            let success = session.update_presence(&title, &artist, params.artwork).await;
            Ok(json!({ "success": success }))
        }
        Method::ClearPresence => {
            session.clear_presence().await;
            Ok(json!({ "success": true }))
        }
        Method::GetStatus => {
            let snapshot = session.snapshot().await;
            serde_json::to_value(&snapshot).map_err(|e| {
                RpcError::new(ErrorCode::InternalError, id.clone()).with_detail(e.to_string())
            })
        }
    }
}
