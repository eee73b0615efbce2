use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use md5::Digest;
use md5::Md5;
use thiserror::Error;

use crate::error_codes;

pub const JSONRPC_VERSION: &str = "2.0";

/// Outgoing JSON-RPC 2.0 envelope. `params` is always a positional array.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    pub jsonrpc: &'static str,
    pub id: String,
    pub method: String,
    pub params: Vec<Value>,
}

impl RpcRequest {
    pub fn new(method: &str, params: Vec<Value>, unix_seconds: i64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: request_id(method, unix_seconds),
            method: method.to_string(),
            params,
        }
    }
}

/// Envelope fields the client reads back. Everything else is ignored.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<UiaError>,
}

/// Error reported by the agent, or synthesised for a wait that gave up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct UiaError {
    pub code: i32,
    #[serde(default)]
    pub message: String,
}

impl UiaError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn element_not_found() -> Self {
        Self::new(error_codes::ELEMENT_NOT_FOUND, "Element not found")
    }

    pub fn is_element_not_found(&self) -> bool {
        self.code == error_codes::ELEMENT_NOT_FOUND
    }
}

/// MD5 of `"<method> at <unix_seconds>"`, hex encoded.
pub fn request_id(method: &str, unix_seconds: i64) -> String {
    let text = format!("{} at {}", method, unix_seconds);
    hex::encode(Md5::digest(text.as_bytes()))
}
