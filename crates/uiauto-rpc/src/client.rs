//! Agent RPC client.
//!
//! Every call funnels through one execution path: send, retry network
//! timeouts within the configured budget, map non-200 statuses to errors,
//! then hand the response to the caller's [`ResponseStrategy`].

use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use tracing::trace;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::sleeper::RealSleeper;
use crate::sleeper::Sleeper;
use crate::transport::HttpRequest;
use crate::transport::HttpResponse;
use crate::transport::HttpTransport;
use crate::transport::ReqwestTransport;
use crate::transport::TransportError;
use crate::types::RpcRequest;
use crate::types::RpcResponse;
use crate::types::request_id;

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// The envelope's `result` (null when absent).
    Json(Value),
    /// A non-JSON body, passed through untouched.
    Bytes(Vec<u8>),
}

impl Payload {
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        match self {
            Payload::Json(value) => Ok(serde_json::from_value(value)?),
            Payload::Bytes(bytes) => Ok(serde_json::from_slice(&bytes)?),
        }
    }

    pub fn into_json(self) -> Result<Value, ClientError> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Bytes(bytes) => Err(ClientError::UnexpectedResponse {
                message: format!("expected a JSON payload, got {} raw bytes", bytes.len()),
            }),
        }
    }
}

pub type RawHandler<T> = Box<dyn FnOnce(&HttpResponse) -> Result<T, ClientError>>;
pub type PayloadHandler<T> = Box<dyn FnOnce(Payload, &HttpResponse) -> Result<T, ClientError>>;

/// How a successful (200) response becomes a value.
pub enum ResponseStrategy<T> {
    /// Runs on the raw response; no envelope parsing happens.
    Raw(RawHandler<T>),
    /// Runs on the parsed payload after envelope errors are surfaced.
    Payload(PayloadHandler<T>),
}

impl<T> ResponseStrategy<T> {
    pub fn raw(handler: impl FnOnce(&HttpResponse) -> Result<T, ClientError> + 'static) -> Self {
        ResponseStrategy::Raw(Box::new(handler))
    }

    pub fn payload(
        handler: impl FnOnce(Payload, &HttpResponse) -> Result<T, ClientError> + 'static,
    ) -> Self {
        ResponseStrategy::Payload(Box::new(handler))
    }
}

impl<T: DeserializeOwned + 'static> ResponseStrategy<T> {
    /// Deserialize the payload into `T`.
    pub fn decode() -> Self {
        ResponseStrategy::payload(|payload, _| payload.decode())
    }
}

pub struct RpcClient {
    config: ClientConfig,
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
    retry_times: AtomicU32,
}

impl RpcClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(
            config,
            Arc::new(transport),
            Arc::new(RealSleeper),
        ))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            config,
            transport,
            sleeper,
            retry_times: AtomicU32::new(0),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sleeper(&self) -> &Arc<dyn Sleeper> {
        &self.sleeper
    }

    pub fn transport(&self) -> &Arc<dyn HttpTransport> {
        &self.transport
    }

    /// Retries spent over this client's lifetime.
    pub fn retry_count(&self) -> u32 {
        self.retry_times.load(Ordering::SeqCst)
    }

    pub fn post<T: DeserializeOwned + 'static>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> Result<T, ClientError> {
        self.post_with(method, params, ResponseStrategy::decode())
    }

    /// Call a method whose result is not needed.
    pub fn invoke(&self, method: &str, params: Vec<Value>) -> Result<(), ClientError> {
        self.post_with(method, params, ResponseStrategy::payload(|_, _| Ok(())))
    }

    pub fn post_with<T>(
        &self,
        method: &str,
        params: Vec<Value>,
        strategy: ResponseStrategy<T>,
    ) -> Result<T, ClientError> {
        let envelope = RpcRequest::new(method, params, chrono::Utc::now().timestamp());
        let body = serde_json::to_string(&envelope)?;
        let request = HttpRequest::post_json(self.config.rpc_url(), body);
        self.execute(&envelope.id, method, request, strategy, true)
    }

    pub fn get<T: DeserializeOwned + 'static>(&self, path: &str) -> Result<T, ClientError> {
        self.get_with(path, ResponseStrategy::decode())
    }

    pub fn get_with<T>(&self, path: &str, strategy: ResponseStrategy<T>) -> Result<T, ClientError> {
        let id = request_id(path, chrono::Utc::now().timestamp());
        let request = HttpRequest::get(self.config.url_for(path));
        self.execute(&id, path, request, strategy, true)
    }

    /// Form posts are sent once. A timeout may mean the agent already ran
    /// the command, so they never draw on the retry budget.
    pub fn post_form_with<T>(
        &self,
        path: &str,
        pairs: Vec<(String, String)>,
        strategy: ResponseStrategy<T>,
    ) -> Result<T, ClientError> {
        let id = request_id(path, chrono::Utc::now().timestamp());
        let request = HttpRequest::post_form(self.config.url_for(path), pairs);
        self.execute(&id, path, request, strategy, false)
    }

    fn execute<T>(
        &self,
        request_id: &str,
        target: &str,
        request: HttpRequest,
        strategy: ResponseStrategy<T>,
        retry: bool,
    ) -> Result<T, ClientError> {
        let start = Instant::now();
        debug!(
            request_id,
            target = %target,
            http_method = request.method.as_str(),
            "RPC call started"
        );
        trace!(request_id, bytes = request.body.len(), "RPC request built");

        let response = self.send_with_retry(request_id, &request, retry)?;
        trace!(
            request_id,
            status = response.status,
            bytes = response.body.len(),
            "RPC response received"
        );

        let result = check_status(&response).and_then(|()| match strategy {
            ResponseStrategy::Raw(handler) => handler(&response),
            ResponseStrategy::Payload(handler) => {
                let payload = parse_payload(&response)?;
                handler(payload, &response)
            }
        });

        debug!(
            request_id,
            target = %target,
            ok = result.is_ok(),
            elapsed_ms = start.elapsed().as_millis(),
            "RPC call finished"
        );
        result
    }

    fn send_with_retry(
        &self,
        request_id: &str,
        request: &HttpRequest,
        retry: bool,
    ) -> Result<HttpResponse, ClientError> {
        loop {
            match self.transport.send(request) {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if !retry || !self.claim_retry(&err) {
                        return Err(err.into());
                    }
                    let backoff = self.config.retry_duration();
                    warn!(
                        request_id,
                        attempt = self.retry_count(),
                        max_retries = self.config.auto_retry(),
                        backoff_ms = backoff.as_millis(),
                        error = %err,
                        "Request timed out, retrying"
                    );
                    self.sleeper.sleep(backoff);
                }
            }
        }
    }

    /// Takes one unit of the retry budget if `err` may be retried.
    fn claim_retry(&self, err: &TransportError) -> bool {
        let max = self.config.auto_retry();
        if !err.is_timeout() || max == 0 || self.config.retry_duration().is_zero() {
            return false;
        }
        self.retry_times
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < max).then_some(used + 1)
            })
            .is_ok()
    }
}

fn check_status(response: &HttpResponse) -> Result<(), ClientError> {
    match response.status {
        200 => Ok(()),
        502 => Err(ClientError::Gateway),
        410 => Err(ClientError::Session),
        status => Err(ClientError::Http {
            status,
            body: response.text(),
        }),
    }
}

/// Non-JSON bodies pass through as bytes; JSON bodies must hold an envelope.
fn parse_payload(response: &HttpResponse) -> Result<Payload, ClientError> {
    if !response.is_json() {
        return Ok(Payload::Bytes(response.body.clone()));
    }
    if response.body.is_empty() {
        return Err(ClientError::EmptyBody {
            status: response.status,
        });
    }

    let envelope: RpcResponse = serde_json::from_slice(&response.body)?;
    if let Some(err) = envelope.error {
        return Err(ClientError::Rpc(err));
    }
    Ok(Payload::Json(envelope.result.unwrap_or(Value::Null)))
}
