//! Device-level errors.
//!
//! Wraps transport failures and adds the validation errors raised before
//! any request goes out.

use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use uiauto_core::Position;
use uiauto_core::SelectorError;
use uiauto_rpc::ClientError;
use uiauto_rpc::ConfigError;
use uiauto_rpc::ErrorCategory;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Invalid selector: {0}")]
    Selector(#[from] SelectorError),

    #[error("{operation}: invalid position {position}")]
    InvalidPosition {
        operation: &'static str,
        position: Position,
    },

    #[error("Unknown editor action: {0}")]
    UnknownEditorAction(String),

    #[error("Invalid key: '{0}'")]
    InvalidKey(String),

    #[error("FastInputIME did not become the active input method after {attempts} checks")]
    ImeNotReady { attempts: u32 },

    #[error("Element reported no bounds")]
    MissingBounds,

    #[error("Unexpected output from `{command}`: {output}")]
    UnexpectedOutput { command: String, output: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Client(ClientError::Config(err))
    }
}

impl Error {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Client(err) => err.category(),
            Error::Selector(_)
            | Error::InvalidPosition { .. }
            | Error::UnknownEditorAction(_)
            | Error::InvalidKey(_) => ErrorCategory::InvalidInput,
            Error::ImeNotReady { .. } | Error::UnexpectedOutput { .. } => ErrorCategory::External,
            Error::MissingBounds | Error::Io(_) => ErrorCategory::Internal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Client(err) if err.is_retryable())
    }

    pub fn is_element_not_found(&self) -> bool {
        matches!(self, Error::Client(err) if err.is_element_not_found())
    }

    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Error::Client(err) => err.suggestion(),
            Error::Selector(_) => {
                Some(r#"Selectors are JSON objects, e.g. '{"resourceId": "com.app:id/ok"}'"#)
            }
            Error::InvalidPosition { .. } => {
                Some("Coordinates must be finite and >= 0; values below 1 are screen fractions")
            }
            Error::UnknownEditorAction(_) => {
                Some("Use go, search, send, next, done, previous or a numeric code")
            }
            Error::InvalidKey(_) => Some("Use a key name such as home or back, or a key code"),
            Error::ImeNotReady { .. } => {
                Some("Check that the agent's FastInputIME is installed on the device")
            }
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        if let Error::Client(err) = self {
            return err.to_json();
        }
        let mut obj = json!({
            "message": self.to_string(),
            "category": self.category().as_str(),
            "retryable": false,
        });
        if let Some(suggestion) = self.suggestion() {
            obj["suggestion"] = json!(suggestion);
        }
        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uiauto_rpc::UiaError;

    #[test]
    fn test_invalid_position_message() {
        let err = Error::InvalidPosition {
            operation: "click",
            position: Position::new(-1.0, 2.0),
        };
        assert_eq!(err.to_string(), "click: invalid position (-1, 2)");
        assert_eq!(err.category(), ErrorCategory::InvalidInput);
    }

    #[test]
    fn test_client_errors_pass_through() {
        let err = Error::from(ClientError::Rpc(UiaError::element_not_found()));
        assert!(err.is_element_not_found());
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.to_json()["code"], -32002);
    }

    #[test]
    fn test_config_error_converts() {
        let err = Error::from(ConfigError::InvalidPort(0));
        assert_eq!(err.category(), ErrorCategory::InvalidInput);
        assert!(err.suggestion().is_some());
    }

    #[test]
    fn test_to_json_for_local_errors() {
        let json = Error::UnknownEditorAction("submit".to_string()).to_json();
        assert_eq!(json["category"], "invalid_input");
        assert_eq!(json["retryable"], false);
        assert!(json["suggestion"].is_string());
    }
}
