//! HTTP/JSON-RPC plumbing for talking to the on-device automation agent.

#![deny(clippy::all)]

mod client;
pub mod config;
mod error;
pub mod error_codes;
mod mock_transport;
pub mod sleeper;
pub mod transport;
mod types;

pub use client::Payload;
pub use client::ResponseStrategy;
pub use client::RpcClient;
pub use config::ClientConfig;
pub use config::ConfigError;
pub use error::ClientError;
pub use error_codes::ErrorCategory;
pub use mock_transport::MockCall;
pub use mock_transport::MockResponse;
pub use mock_transport::MockTransport;
pub use sleeper::MockSleeper;
pub use sleeper::RealSleeper;
pub use sleeper::Sleeper;
pub use transport::HttpRequest;
pub use transport::HttpResponse;
pub use transport::HttpTransport;
pub use transport::NetworkErrorKind;
pub use transport::ReqwestTransport;
pub use transport::TransportError;
pub use types::RpcRequest;
pub use types::RpcResponse;
pub use types::UiaError;
pub use types::request_id;

pub type Result<T> = std::result::Result<T, ClientError>;
