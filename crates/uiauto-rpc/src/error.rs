use serde_json::Value;
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;
use crate::error_codes;
use crate::error_codes::ErrorCategory;
use crate::transport::NetworkErrorKind;
use crate::transport::TransportError;
use crate::types::UiaError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Network {kind} error: {message}")]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    #[error("Gateway error")]
    Gateway,

    #[error("App quit or crash")]
    Session,

    #[error("HTTP Return code is not 200: ({status}) [{body}]")]
    Http { status: u16, body: String },

    #[error("HTTP {status} - empty body")]
    EmptyBody { status: u16 },

    #[error("RPC error ({}): {}", .0.code, .0.message)]
    Rpc(#[from] UiaError),

    #[error("Failed to decode response: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },
}

impl From<TransportError> for ClientError {
    fn from(err: TransportError) -> Self {
        ClientError::Network {
            kind: err.kind,
            message: err.message,
        }
    }
}

impl ClientError {
    /// Only network timeouts are eligible for automatic retry.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            }
        )
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ClientError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            } => ErrorCategory::Timeout,
            ClientError::Network { .. }
            | ClientError::Gateway
            | ClientError::Session
            | ClientError::Http { .. } => ErrorCategory::External,
            ClientError::Rpc(err) => error_codes::category_for_code(err.code),
            ClientError::Config(_) => ErrorCategory::InvalidInput,
            ClientError::EmptyBody { .. }
            | ClientError::Serialization(_)
            | ClientError::UnexpectedResponse { .. } => ErrorCategory::Internal,
        }
    }

    /// Remote or sentinel error code, if the error carries one.
    pub fn code(&self) -> Option<i32> {
        match self {
            ClientError::Rpc(err) => Some(err.code),
            _ => None,
        }
    }

    pub fn is_element_not_found(&self) -> bool {
        matches!(self, ClientError::Rpc(err) if err.is_element_not_found())
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            ClientError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            } => Some("Raise --timeout or check the device's network connection"),
            ClientError::Network { .. } => {
                Some("Check that the agent is running on the device and the host/port are right (default port 7912)")
            }
            ClientError::Gateway => Some("The agent cannot reach UiAutomator; restart the agent on the device"),
            ClientError::Session => Some("The app under test quit; start it again"),
            ClientError::Rpc(err) if err.is_element_not_found() => {
                Some("Check the selector; run `uiauto dump` to inspect the current hierarchy")
            }
            ClientError::Config(ConfigError::InvalidHost(_)) => {
                Some("Pass the device's IP address, e.g. --host 192.168.1.20")
            }
            ClientError::Config(ConfigError::InvalidPort(_)) => {
                Some("Ports must be between 1 and 65534")
            }
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        let mut obj = json!({
            "message": self.to_string(),
            "category": self.category().as_str(),
            "retryable": self.is_retryable(),
        });
        match self {
            ClientError::Rpc(err) => obj["code"] = json!(err.code),
            ClientError::Http { status, .. } | ClientError::EmptyBody { status } => {
                obj["status"] = json!(status)
            }
            ClientError::Gateway => obj["status"] = json!(502),
            ClientError::Session => obj["status"] = json!(410),
            _ => {}
        }
        if let Some(suggestion) = self.suggestion() {
            obj["suggestion"] = json!(suggestion);
        }
        obj
    }

    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_timeouts_are_retryable() {
        let timeout: ClientError = TransportError::timeout("deadline").into();
        assert!(timeout.is_retryable());

        let refused: ClientError =
            TransportError::new(NetworkErrorKind::Connect, "refused").into();
        assert!(!refused.is_retryable());
        assert!(!ClientError::Gateway.is_retryable());
        assert!(!ClientError::Rpc(UiaError::element_not_found()).is_retryable());
    }

    #[test]
    fn test_status_error_messages() {
        assert_eq!(ClientError::Gateway.to_string(), "Gateway error");
        assert_eq!(ClientError::Session.to_string(), "App quit or crash");
        let http = ClientError::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(http.to_string(), "HTTP Return code is not 200: (500) [boom]");
    }

    #[test]
    fn test_categories() {
        assert_eq!(ClientError::Gateway.category(), ErrorCategory::External);
        assert_eq!(
            ClientError::Rpc(UiaError::element_not_found()).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            ClientError::Config(ConfigError::InvalidPort(0)).category(),
            ErrorCategory::InvalidInput
        );
        assert_eq!(
            ClientError::EmptyBody { status: 200 }.category(),
            ErrorCategory::Internal
        );
        let timeout: ClientError = TransportError::timeout("t").into();
        assert_eq!(timeout.category(), ErrorCategory::Timeout);
    }

    #[test]
    fn test_element_not_found_helpers() {
        let err = ClientError::Rpc(UiaError::element_not_found());
        assert!(err.is_element_not_found());
        assert_eq!(err.code(), Some(-32002));
        assert!(err.suggestion().is_some());
        assert!(!ClientError::Session.is_element_not_found());
    }

    #[test]
    fn test_to_json_includes_code_and_suggestion() {
        let json = ClientError::Rpc(UiaError::new(-32002, "UiObjectNotFoundException")).to_json();
        assert_eq!(json["code"], -32002);
        assert_eq!(json["category"], "not_found");
        assert_eq!(json["retryable"], false);
        assert!(json["suggestion"].is_string());
    }

    #[test]
    fn test_to_json_status_errors() {
        assert_eq!(ClientError::Gateway.to_json()["status"], 502);
        assert_eq!(ClientError::Session.to_json()["status"], 410);
    }
}
