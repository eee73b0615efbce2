use std::sync::Arc;

use serde_json::json;
use uiauto_rpc::ClientConfig;
use uiauto_rpc::MockResponse;
use uiauto_rpc::MockSleeper;
use uiauto_rpc::MockTransport;

use crate::device::Device;

pub(crate) fn mock_device() -> (Device, MockTransport, Arc<MockSleeper>) {
    mock_device_with(ClientConfig::default())
}

pub(crate) fn mock_device_with(config: ClientConfig) -> (Device, MockTransport, Arc<MockSleeper>) {
    let mock = MockTransport::new();
    let sleeper = Arc::new(MockSleeper::new());
    let device = Device::with_transport(config, Arc::new(mock.clone()), sleeper.clone());
    (device, mock, sleeper)
}

/// A 1080x1920 display.
pub(crate) fn with_display(mock: &MockTransport) {
    mock.set_response(
        "info",
        MockResponse::Body(json!({"serial": "emulator-5554", "display": {"width": 1080, "height": 1920}})),
    );
}

/// `objInfo` reply for an element spanning (100,200)-(300,400).
pub(crate) fn with_bounds(mock: &MockTransport) {
    mock.set_response(
        "objInfo",
        MockResponse::Result(json!({
            "text": "OK",
            "bounds": {"top": 200, "bottom": 400, "left": 100, "right": 300}
        })),
    );
}
