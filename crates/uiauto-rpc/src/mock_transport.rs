use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use serde_json::Value;
use serde_json::json;
use uiauto_common::mutex_lock_or_recover;

use crate::transport::HttpMethod;
use crate::transport::HttpRequest;
use crate::transport::HttpResponse;
use crate::transport::HttpTransport;
use crate::transport::NetworkErrorKind;
use crate::transport::RequestBody;
use crate::transport::TransportError;

const JSON: &str = "application/json";

/// A canned agent reply.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResponse {
    /// JSON-RPC envelope carrying `result`.
    Result(Value),
    /// JSON-RPC envelope carrying `error`.
    RpcError { code: i32, message: String },
    /// Non-200 status with a plain-text body.
    Status(u16, String),
    /// 200 with an arbitrary JSON body, not wrapped in an envelope.
    Body(Value),
    /// 200 with an arbitrary content type and body.
    Raw {
        content_type: Option<String>,
        body: Vec<u8>,
    },
    /// The exchange fails below HTTP.
    Network(NetworkErrorKind),
    /// Served in order; the last entry repeats once the rest are used up.
    Sequence(Vec<MockResponse>),
}

impl MockResponse {
    pub fn rpc_error(code: i32, message: &str) -> Self {
        MockResponse::RpcError {
            code,
            message: message.to_string(),
        }
    }

    pub fn text(content_type: &str, body: &str) -> Self {
        MockResponse::Raw {
            content_type: Some(content_type.to_string()),
            body: body.as_bytes().to_vec(),
        }
    }

    fn render(&self, cursor: usize) -> Result<HttpResponse, TransportError> {
        match self {
            MockResponse::Result(result) => Ok(json_response(
                json!({"jsonrpc": "2.0", "id": "mock", "result": result}),
            )),
            MockResponse::RpcError { code, message } => Ok(json_response(json!({
                "jsonrpc": "2.0",
                "id": "mock",
                "error": {"code": code, "message": message}
            }))),
            MockResponse::Status(status, body) => {
                Ok(HttpResponse::new(*status, Some("text/plain"), body.as_bytes()))
            }
            MockResponse::Body(body) => Ok(json_response(body.clone())),
            MockResponse::Raw { content_type, body } => Ok(HttpResponse {
                status: 200,
                content_type: content_type.clone(),
                body: body.clone(),
            }),
            MockResponse::Network(kind) => {
                Err(TransportError::new(*kind, "mock network failure"))
            }
            MockResponse::Sequence(items) => match items.get(cursor).or(items.last()) {
                Some(item) => item.render(0),
                None => Ok(HttpResponse::new(500, Some("text/plain"), "empty sequence")),
            },
        }
    }
}

fn json_response(body: Value) -> HttpResponse {
    HttpResponse::new(200, Some(JSON), body.to_string())
}

/// One request seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// JSON-RPC method for envelope posts, URL path otherwise.
    pub key: String,
    pub method: HttpMethod,
    pub params: Option<Value>,
    pub form: Vec<(String, String)>,
}

/// In-memory [`HttpTransport`] answering from a table of canned replies.
///
/// Replies are keyed by JSON-RPC method for envelope posts and by URL path
/// (`ping`, `info`, `shell`, ...) for everything else.
///
/// ```ignore
/// let mock = MockTransport::new();
/// mock.set_response("deviceInfo", MockResponse::Result(json!({"sdkInt": 29})));
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    cursors: Arc<Mutex<HashMap<String, usize>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
    strict: bool,
}

impl MockTransport {
    /// Unconfigured keys answer `{"result": true}`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconfigured keys answer HTTP 404.
    pub fn new_strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    pub fn set_response(&self, key: &str, response: MockResponse) {
        mutex_lock_or_recover(&self.responses).insert(key.to_string(), response);
        mutex_lock_or_recover(&self.cursors).remove(key);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        mutex_lock_or_recover(&self.calls).clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.key).collect()
    }

    pub fn call_count(&self, key: &str) -> usize {
        mutex_lock_or_recover(&self.calls)
            .iter()
            .filter(|c| c.key == key)
            .count()
    }

    pub fn params_for(&self, key: &str) -> Vec<Value> {
        mutex_lock_or_recover(&self.calls)
            .iter()
            .filter(|c| c.key == key)
            .filter_map(|c| c.params.clone())
            .collect()
    }

    pub fn last_params(&self, key: &str) -> Option<Value> {
        self.params_for(key).pop()
    }

    pub fn forms_for(&self, key: &str) -> Vec<Vec<(String, String)>> {
        mutex_lock_or_recover(&self.calls)
            .iter()
            .filter(|c| c.key == key)
            .map(|c| c.form.clone())
            .collect()
    }

    /// Shell command lines sent to `/shell`, in order.
    pub fn shell_commands(&self) -> Vec<String> {
        self.forms_for("shell")
            .into_iter()
            .filter_map(|form| {
                form.into_iter()
                    .find(|(k, _)| k == "command")
                    .map(|(_, v)| v)
            })
            .collect()
    }

    pub fn reset(&self) {
        mutex_lock_or_recover(&self.calls).clear();
        mutex_lock_or_recover(&self.responses).clear();
        mutex_lock_or_recover(&self.cursors).clear();
    }

    fn record(&self, request: &HttpRequest) -> String {
        let (key, params, form) = match &request.body {
            RequestBody::Json(body) => {
                let envelope: Value = serde_json::from_str(body).unwrap_or(Value::Null);
                let key = envelope
                    .get("method")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| request.path().to_string());
                (key, envelope.get("params").cloned(), Vec::new())
            }
            RequestBody::Form(pairs) => (request.path().to_string(), None, pairs.clone()),
            RequestBody::Empty => (request.path().to_string(), None, Vec::new()),
        };
        mutex_lock_or_recover(&self.calls).push(MockCall {
            key: key.clone(),
            method: request.method,
            params,
            form,
        });
        key
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = self.record(request);

        let response = mutex_lock_or_recover(&self.responses).get(&key).cloned();
        let cursor = {
            let mut cursors = mutex_lock_or_recover(&self.cursors);
            let slot = cursors.entry(key.clone()).or_insert(0);
            let current = *slot;
            *slot += 1;
            current
        };

        match response {
            Some(response) => response.render(cursor),
            None if self.strict => Ok(HttpResponse::new(
                404,
                Some("text/plain"),
                format!("no mock response for '{}'", key),
            )),
            None => MockResponse::Result(Value::Bool(true)).render(0),
        }
    }
}
