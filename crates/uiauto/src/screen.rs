//! Orientation, system panels, hierarchy dump and screenshots.

use serde_json::json;
use uiauto_core::Orientation;
use uiauto_core::Screenshot;
use uiauto_rpc::ClientError;
use uiauto_rpc::Payload;
use uiauto_rpc::ResponseStrategy;

use crate::device::Device;
use crate::error::Result;

const DEFAULT_IMAGE_TYPE: &str = "image/jpeg";

impl Device {
    pub fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        self.rpc()
            .invoke("setOrientation", vec![json!(orientation.as_str())])?;
        Ok(())
    }

    pub fn freeze_rotation(&self, freeze: bool) -> Result<()> {
        self.rpc().invoke("freezeRotation", vec![json!(freeze)])?;
        Ok(())
    }

    pub fn open_notification(&self) -> Result<()> {
        self.rpc().invoke("openNotification", vec![])?;
        Ok(())
    }

    pub fn open_quick_settings(&self) -> Result<()> {
        self.rpc().invoke("openQuickSettings", vec![])?;
        Ok(())
    }

    /// UI hierarchy as XML, compressed by the agent.
    pub fn dump_window_hierarchy(&self) -> Result<String> {
        Ok(self.rpc().post("dumpWindowHierarchy", vec![json!(true)])?)
    }

    pub fn screenshot(&self) -> Result<Screenshot> {
        let shot = self.rpc().get_with(
            "screenshot/0",
            ResponseStrategy::payload(|payload, res| match payload {
                Payload::Bytes(data) => Ok(Screenshot {
                    content_type: res
                        .content_type
                        .clone()
                        .unwrap_or_else(|| DEFAULT_IMAGE_TYPE.to_string()),
                    data,
                }),
                Payload::Json(_) => Err(ClientError::UnexpectedResponse {
                    message: "screenshot returned JSON instead of image bytes".to_string(),
                }),
            }),
        )?;
        Ok(shot)
    }
}
