//! Mock automation agent for integration tests.
//!
//! Serves the agent's HTTP surface on a loopback port: `ping`, `info`,
//! `shell`, `screenshot/0` and JSON-RPC on `jsonrpc/0`. RPC replies are keyed
//! by method name, everything else by path. Every request is recorded.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

pub const MOCK_SERIAL: &str = "mock-5554";

/// Recorded request for test verification
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub http_method: String,
    pub path: String,
    /// JSON-RPC method for `jsonrpc/0` calls.
    pub method: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn key(&self) -> &str {
        self.method.as_deref().unwrap_or(&self.path)
    }

    pub fn params(&self) -> Option<Value> {
        let body: Value = serde_json::from_str(&self.body).ok()?;
        body.get("params").cloned()
    }
}

/// How the mock answers one key.
#[derive(Debug, Clone)]
pub enum AgentReply {
    /// JSON-RPC `result`
    Result(Value),
    /// JSON-RPC `error`
    Error { code: i32, message: String },
    /// Plain JSON body, no envelope
    Json(Value),
    Text(String),
    Bytes {
        content_type: String,
        body: Vec<u8>,
    },
    /// Non-200 status with a text body
    Status(u16, String),
}

pub struct MockAgent {
    server: Arc<Server>,
    port: u16,
    replies: Arc<Mutex<HashMap<String, AgentReply>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockAgent {
    pub fn start() -> Self {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind mock agent"));
        let port = server
            .server_addr()
            .to_ip()
            .expect("mock agent has an IP address")
            .port();

        let agent = Self {
            server: Arc::clone(&server),
            port,
            replies: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        agent.set_reply("ping", AgentReply::Text("pong".to_string()));
        agent.set_reply(
            "info",
            AgentReply::Json(json!({
                "serial": MOCK_SERIAL,
                "display": {"width": 1080, "height": 1920}
            })),
        );

        let replies = Arc::clone(&agent.replies);
        let requests = Arc::clone(&agent.requests);
        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);

                let path = request.url().trim_start_matches('/').to_string();
                let method = if path == "jsonrpc/0" {
                    serde_json::from_str::<Value>(&body)
                        .ok()
                        .and_then(|v| v.get("method").and_then(Value::as_str).map(String::from))
                } else {
                    None
                };
                let id = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| v.get("id").cloned())
                    .unwrap_or(Value::Null);

                let recorded = RecordedRequest {
                    http_method: request.method().to_string(),
                    path,
                    method,
                    body,
                };
                let reply = replies
                    .lock()
                    .unwrap()
                    .get(recorded.key())
                    .cloned()
                    .unwrap_or(AgentReply::Result(json!(true)));
                requests.lock().unwrap().push(recorded);

                let _ = request.respond(render(reply, id));
            }
        });

        agent
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn set_reply(&self, key: &str, reply: AgentReply) {
        self.replies.lock().unwrap().insert(key.to_string(), reply);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r.key().to_string())
            .collect()
    }

    pub fn count(&self, key: &str) -> usize {
        self.requests().iter().filter(|r| r.key() == key).count()
    }

    pub fn last(&self, key: &str) -> Option<RecordedRequest> {
        self.requests().into_iter().rev().find(|r| r.key() == key)
    }
}

impl Drop for MockAgent {
    fn drop(&mut self) {
        self.server.unblock();
    }
}

fn header(raw: &str) -> Header {
    raw.parse().expect("valid header")
}

fn json_response(value: &Value) -> Response<std::io::Cursor<Vec<u8>>> {
    Response::from_string(value.to_string()).with_header(header("Content-Type: application/json"))
}

fn render(reply: AgentReply, id: Value) -> Response<std::io::Cursor<Vec<u8>>> {
    match reply {
        AgentReply::Result(result) => {
            json_response(&json!({"jsonrpc": "2.0", "id": id, "result": result}))
        }
        AgentReply::Error { code, message } => json_response(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": {"code": code, "message": message}
        })),
        AgentReply::Json(value) => json_response(&value),
        AgentReply::Text(text) => {
            Response::from_string(text).with_header(header("Content-Type: text/plain"))
        }
        AgentReply::Bytes { content_type, body } => Response::from_data(body)
            .with_header(header(&format!("Content-Type: {}", content_type))),
        AgentReply::Status(status, body) => Response::from_string(body)
            .with_status_code(status)
            .with_header(header("Content-Type: text/plain")),
    }
}
