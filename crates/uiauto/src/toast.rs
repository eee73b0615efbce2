use serde_json::json;

use crate::device::Device;
use crate::error::Result;

/// On-device toast messages.
pub struct Toast<'a> {
    device: &'a Device,
}

impl<'a> Toast<'a> {
    pub(crate) fn new(device: &'a Device) -> Self {
        Self { device }
    }

    pub fn show(&self, message: &str, duration_secs: f32) -> Result<()> {
        let millis = (duration_secs * 1000.0) as i64;
        self.device
            .rpc()
            .invoke("makeToast", vec![json!(message), json!(millis)])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::mock_device;
    use serde_json::json;

    #[test]
    fn test_show_sends_milliseconds() {
        let (device, mock, _) = mock_device();
        device.toast().show("Hello", 1.5).unwrap();
        assert_eq!(mock.last_params("makeToast"), Some(json!(["Hello", 1500])));
    }
}
