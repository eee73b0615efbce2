#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_agent;
pub mod silent_agent;

pub use mock_agent::AgentReply;
pub use mock_agent::MOCK_SERIAL;
pub use mock_agent::MockAgent;
pub use mock_agent::RecordedRequest;
pub use silent_agent::SilentAgent;

use assert_cmd::Command;
use serde_json::Value;

use uiauto::ClientConfig;
use uiauto::Device;

/// `uiauto` binary with the connection environment cleared.
pub fn uiauto_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("uiauto"));
    for var in [
        "UIAUTO_HOST",
        "UIAUTO_PORT",
        "UIAUTO_TIMEOUT",
        "UIAUTO_AUTO_RETRY",
        "UIAUTO_RETRY_DURATION",
        "UIAUTO_LOG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

/// `uiauto` pointed at `agent`.
pub fn uiauto_for(agent: &MockAgent) -> Command {
    let mut cmd = uiauto_cmd();
    cmd.args(["--host", "127.0.0.1", "--port", &agent.port().to_string()]);
    cmd
}

/// Real HTTP device against `agent`, with automatic retry off.
pub fn device_for(agent: &MockAgent) -> Device {
    let config = ClientConfig::new("127.0.0.1", i64::from(agent.port()))
        .expect("valid config")
        .with_auto_retry(0)
        .with_timeout(5);
    Device::new(config).expect("device")
}

pub fn assert_error_data(json: &Value, expected_category: &str, expected_retryable: bool) {
    assert_eq!(
        json.get("category").and_then(|v| v.as_str()),
        Some(expected_category),
        "Expected category {} in error: {}",
        expected_category,
        json
    );
    assert_eq!(
        json.get("retryable").and_then(|v| v.as_bool()),
        Some(expected_retryable),
        "Expected retryable={} in error: {}",
        expected_retryable,
        json
    );
}
