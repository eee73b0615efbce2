//! Agent-side watchers: click a target whenever trigger conditions match.

use serde_json::Value;
use serde_json::json;
use uiauto_core::Selector;

use crate::device::Device;
use crate::error::Result;

pub struct Watcher<'a> {
    device: &'a Device,
    name: String,
    conditions: Vec<Selector>,
}

impl<'a> Watcher<'a> {
    pub(crate) fn new(device: &'a Device) -> Self {
        Self {
            device,
            name: String::new(),
            conditions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conditions(&self) -> &[Selector] {
        &self.conditions
    }

    /// Name the watcher and add a trigger condition. Conditions accumulate.
    pub fn register(&mut self, name: &str, condition: &Selector) -> &mut Self {
        self.name = name.to_string();
        self.conditions.push(condition.normalized());
        self
    }

    /// Install the watcher: when every condition matches, click `target`.
    pub fn click(&self, target: &Selector) -> Result<()> {
        let conditions: Vec<Value> = self.conditions.iter().map(Selector::to_json).collect();
        self.device.rpc().invoke(
            "registerClickUiObjectWatcher",
            vec![
                json!(self.name),
                Value::Array(conditions),
                target.normalized().to_json(),
            ],
        )?;
        Ok(())
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        self.device.rpc().invoke("removeWatcher", vec![json!(name)])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::mock_device;
    use serde_json::json;
    use uiauto_core::Selector;
    use uiauto_rpc::MockResponse;

    #[test]
    fn test_register_accumulates_conditions() {
        let (device, _, _) = mock_device();
        let mut watcher = device.watcher();
        watcher
            .register("crash", &Selector::new().text("App stopped"))
            .register("crash-dialog", &Selector::new().resource_id("android:id/message"));

        assert_eq!(watcher.name(), "crash-dialog");
        assert_eq!(watcher.conditions().len(), 2);
        assert_eq!(watcher.conditions()[1].mask(), 0x200000);
    }

    #[test]
    fn test_click_registers_watcher() {
        let (device, mock, _) = mock_device();
        let mut watcher = device.watcher();
        watcher.register("ok", &Selector::new().text("Allow"));
        watcher.click(&Selector::new().text("OK")).unwrap();

        let params = mock.last_params("registerClickUiObjectWatcher").unwrap();
        assert_eq!(params[0], "ok");
        assert_eq!(params[1][0]["text"], "Allow");
        assert_eq!(params[1][0]["mask"], 1);
        assert_eq!(params[2]["text"], "OK");
    }

    #[test]
    fn test_remove_propagates_errors() {
        let (device, mock, _) = mock_device();
        mock.set_response("removeWatcher", MockResponse::rpc_error(-32000, "no such watcher"));

        let watcher = device.watcher();
        assert!(watcher.remove("ok").is_err());
        assert_eq!(mock.last_params("removeWatcher"), Some(json!(["ok"])));
    }
}
