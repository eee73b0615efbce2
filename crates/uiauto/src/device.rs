//! The device handle.
//!
//! A [`Device`] owns the RPC client and the cached window size. Elements,
//! watchers and toasts borrow it, so it must outlive everything derived
//! from it.

use std::sync::Arc;
use std::sync::Mutex;

use serde::Deserialize;
use serde_json::Value;
use uiauto_core::DeviceInfo;
use uiauto_core::Selector;
use uiauto_core::WindowSize;
use uiauto_rpc::ClientConfig;
use uiauto_rpc::ClientError;
use uiauto_rpc::HttpResponse;
use uiauto_rpc::HttpTransport;
use uiauto_rpc::ResponseStrategy;
use uiauto_rpc::RpcClient;
use uiauto_rpc::Sleeper;

use crate::element::Element;
use crate::error::Result;
use crate::toast::Toast;
use crate::watcher::Watcher;

pub struct Device {
    rpc: RpcClient,
    pub(crate) window_size: Mutex<Option<WindowSize>>,
}

/// Body of `GET /info`. It is plain JSON, not an RPC envelope.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AgentInfo {
    pub serial: String,
    pub display: Option<WindowSize>,
}

impl AgentInfo {
    pub(crate) fn strategy() -> ResponseStrategy<AgentInfo> {
        ResponseStrategy::raw(|res: &HttpResponse| Ok(serde_json::from_slice(&res.body)?))
    }
}

impl Device {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self::from_client(RpcClient::new(config)?))
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn HttpTransport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self::from_client(RpcClient::with_transport(config, transport, sleeper))
    }

    fn from_client(rpc: RpcClient) -> Self {
        Self {
            rpc,
            window_size: Mutex::new(None),
        }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }

    pub fn config(&self) -> &ClientConfig {
        self.rpc.config()
    }

    pub(crate) fn sleeper(&self) -> &Arc<dyn Sleeper> {
        self.rpc.sleeper()
    }

    /// A second client over the same transport and sleeper, with its own
    /// retry budget.
    pub(crate) fn detached_client(&self) -> RpcClient {
        RpcClient::with_transport(
            self.config().clone(),
            Arc::clone(self.rpc.transport()),
            Arc::clone(self.rpc.sleeper()),
        )
    }

    /// Liveness check; the agent answers `pong`.
    pub fn ping(&self) -> Result<String> {
        let body = self
            .rpc
            .get_with("ping", ResponseStrategy::raw(|res| Ok(res.text())))?;
        Ok(body.trim().to_string())
    }

    pub fn device_info(&self) -> Result<DeviceInfo> {
        Ok(self.rpc.post("deviceInfo", vec![])?)
    }

    pub fn serial_number(&self) -> Result<String> {
        let info = self.rpc.get_with("info", AgentInfo::strategy())?;
        Ok(info.serial)
    }

    /// Query entry point. The selector is normalized on the way in.
    pub fn element(&self, selector: Selector) -> Element<'_> {
        Element::new(self, selector)
    }

    pub fn element_from_json(&self, selector: &Value) -> Result<Element<'_>> {
        Ok(self.element(Selector::from_json(selector)?))
    }

    pub fn watcher(&self) -> Watcher<'_> {
        Watcher::new(self)
    }

    pub fn toast(&self) -> Toast<'_> {
        Toast::new(self)
    }

    pub(crate) fn missing(field: &str) -> ClientError {
        ClientError::UnexpectedResponse {
            message: format!("agent info has no '{}' field", field),
        }
    }
}
