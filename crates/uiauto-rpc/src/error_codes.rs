//! JSON-RPC error codes seen from the automation agent.
//!
//! - -32700 to -32600: reserved protocol errors
//! - -32000 to -32099: server errors raised by the agent's UiAutomator bridge

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Generic server-side exception from the agent
pub const SERVER_ERROR: i32 = -32000;

// UiObjectNotFoundException, also synthesised when a wait gives up
pub const ELEMENT_NOT_FOUND: i32 = -32002;

/// Error category for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Element or resource not found
    NotFound,
    /// Invalid parameters or configuration
    InvalidInput,
    /// Internal client or agent error
    Internal,
    /// Agent unreachable, gateway failure, app crash
    External,
    /// Network timeout
    Timeout,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::NotFound => "not_found",
            ErrorCategory::InvalidInput => "invalid_input",
            ErrorCategory::Internal => "internal",
            ErrorCategory::External => "external",
            ErrorCategory::Timeout => "timeout",
        }
    }
}

impl std::str::FromStr for ErrorCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_found" => Ok(ErrorCategory::NotFound),
            "invalid_input" => Ok(ErrorCategory::InvalidInput),
            "internal" => Ok(ErrorCategory::Internal),
            "external" => Ok(ErrorCategory::External),
            "timeout" => Ok(ErrorCategory::Timeout),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returns the error category for a remote error code.
pub fn category_for_code(code: i32) -> ErrorCategory {
    match code {
        ELEMENT_NOT_FOUND => ErrorCategory::NotFound,
        INVALID_REQUEST | METHOD_NOT_FOUND | INVALID_PARAMS => ErrorCategory::InvalidInput,
        _ => ErrorCategory::Internal,
    }
}
