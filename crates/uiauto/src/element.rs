//! Remote UI-object queries.
//!
//! An [`Element`] is a selector bound to a device. Nothing is resolved on
//! this side: every call sends the selector (or its resolved uid) and the
//! agent looks the object up again.

use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use uiauto_core::ElementInfo;
use uiauto_core::ElementRect;
use uiauto_core::Position;
use uiauto_core::Selector;
use uiauto_core::SwipeDirection;
use uiauto_rpc::ClientError;

use crate::device::Device;
use crate::error::Error;
use crate::error::Result;
use crate::wait;
use crate::wait::WaitKind;
use crate::wait::WaitPolicy;

const ELEMENT_SWIPE_STEPS: u32 = 20;
const SCROLL_TO_END_MAX_SWIPES: u32 = 500;
const SCROLL_TO_END_STEPS: u32 = 20;

#[derive(Clone)]
pub struct Element<'a> {
    device: &'a Device,
    selector: Selector,
}

impl<'a> Element<'a> {
    pub(crate) fn new(device: &'a Device, selector: Selector) -> Self {
        Self {
            device,
            selector: selector.normalized(),
        }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn device(&self) -> &'a Device {
        self.device
    }

    fn derive(&self, selector: Selector) -> Element<'a> {
        Element {
            device: self.device,
            selector,
        }
    }

    fn target(&self) -> Value {
        self.selector.to_params()
    }

    fn post_bool(&self, method: &str, params: Vec<Value>) -> Result<bool> {
        let value: Value = self.device.rpc().post(method, params)?;
        Ok(value.as_bool().unwrap_or(false))
    }

    // Query derivation

    /// The `index`-th match of the most specific selector in the chain.
    pub fn eq(&self, index: i64) -> Element<'a> {
        self.derive(self.selector.with_instance(index))
    }

    pub fn child(&self, selector: &Selector) -> Element<'a> {
        self.derive(self.selector.child(selector))
    }

    pub fn sibling(&self, selector: &Selector) -> Element<'a> {
        self.derive(self.selector.sibling(selector))
    }

    /// Child of this element matching `selector` whose subtree contains
    /// `text`. The returned element is pinned to the agent's uid.
    pub fn child_by_text(&self, text: &str, selector: &Selector) -> Result<Element<'a>> {
        self.child_by("childByText", text, selector)
    }

    pub fn child_by_description(&self, text: &str, selector: &Selector) -> Result<Element<'a>> {
        self.child_by("childByDescription", text, selector)
    }

    fn child_by(&self, method: &str, keywords: &str, selector: &Selector) -> Result<Element<'a>> {
        let uid: String = self.device.rpc().post(
            method,
            vec![
                self.target(),
                selector.normalized().to_json(),
                json!(keywords),
                json!(true),
            ],
        )?;
        Ok(self.derive(Selector::resolved(uid)))
    }

    // Waiting

    fn probe(&self, kind: WaitKind, timeout_ms: u64) -> std::result::Result<bool, ClientError> {
        self.device
            .rpc()
            .post(kind.method(), vec![self.target(), json!(timeout_ms)])
    }

    fn wait(&self, kind: WaitKind, duration_secs: f32, max_retry: i64) -> Result<()> {
        let config = self.device.config();
        let policy = WaitPolicy::sanitized(
            duration_secs,
            max_retry,
            WaitPolicy::for_kind(kind, config),
        );
        let timeout_ms = config.timeout().as_millis() as u64;
        wait::poll(kind, policy, self.device.sleeper().as_ref(), || {
            self.probe(kind, timeout_ms)
        })
    }

    /// Out-of-range arguments fall back to the configured defaults.
    pub fn wait_for_exists(&self, duration_secs: f32, max_retry: i64) -> Result<()> {
        self.wait(WaitKind::Exists, duration_secs, max_retry)
    }

    pub fn wait_until_gone(&self, duration_secs: f32, max_retry: i64) -> Result<()> {
        self.wait(WaitKind::Gone, duration_secs, max_retry)
    }

    /// One probe with no agent-side wait and no retries.
    pub fn exists(&self) -> Result<bool> {
        Ok(self.probe(WaitKind::Exists, 0)?)
    }

    fn gate(&self) -> Result<()> {
        let config = self.device.config();
        self.wait_for_exists(
            config.wait_for_exists_duration(),
            i64::from(config.wait_for_exists_max_retry()),
        )
    }

    // Inspection

    pub fn info(&self) -> Result<ElementInfo> {
        Ok(self.device.rpc().post("objInfo", vec![self.target()])?)
    }

    pub fn rect(&self) -> Result<ElementRect> {
        self.info()?.rect().ok_or(Error::MissingBounds)
    }

    /// Point inside the element; `None` means the centre.
    pub fn center(&self, offset: Option<(f32, f32)>) -> Result<Position> {
        let (x, y) = offset.unwrap_or((0.5, 0.5));
        Ok(self.rect()?.point_at(x, y))
    }

    pub fn count(&self) -> Result<i64> {
        Ok(self.device.rpc().post("count", vec![self.target()])?)
    }

    // Gated actions

    pub fn click(&self) -> Result<()> {
        self.gate()?;
        self.click_no_wait()
    }

    pub fn click_no_wait(&self) -> Result<()> {
        self.device.click(self.center(None)?)
    }

    pub fn long_click(&self, duration: Option<Duration>) -> Result<()> {
        self.gate()?;
        self.long_click_no_wait(duration)
    }

    pub fn long_click_no_wait(&self, duration: Option<Duration>) -> Result<()> {
        self.device.long_click(self.center(None)?, duration)
    }

    pub fn get_text(&self) -> Result<String> {
        self.gate()?;
        self.get_text_no_wait()
    }

    pub fn get_text_no_wait(&self) -> Result<String> {
        let text: Option<String> = self.device.rpc().post("getText", vec![self.target()])?;
        Ok(text.unwrap_or_default())
    }

    pub fn set_text(&self, text: &str) -> Result<()> {
        self.gate()?;
        self.set_text_no_wait(text)
    }

    pub fn set_text_no_wait(&self, text: &str) -> Result<()> {
        self.device
            .rpc()
            .invoke("setText", vec![self.target(), json!(text)])?;
        Ok(())
    }

    pub fn clear_text(&self) -> Result<()> {
        self.gate()?;
        self.clear_text_no_wait()
    }

    pub fn clear_text_no_wait(&self) -> Result<()> {
        self.device
            .rpc()
            .invoke("clearTextField", vec![self.target()])?;
        Ok(())
    }

    // Swipes inside the element

    /// From the centre to the edge `direction` points at.
    pub fn swipe(&self, direction: SwipeDirection) -> Result<()> {
        self.gate()?;
        let rect = self.rect()?;
        self.device
            .swipe(rect.center(), rect.edge_point(direction), ELEMENT_SWIPE_STEPS)
    }

    pub fn swipe_up(&self) -> Result<()> {
        self.swipe(SwipeDirection::Up)
    }

    pub fn swipe_down(&self) -> Result<()> {
        self.swipe(SwipeDirection::Down)
    }

    pub fn swipe_left(&self) -> Result<()> {
        self.swipe(SwipeDirection::Left)
    }

    pub fn swipe_right(&self) -> Result<()> {
        self.swipe(SwipeDirection::Right)
    }

    // Scrolling (vertical). These talk to the agent directly.

    pub fn scroll_forward(&self, steps: u32) -> Result<bool> {
        self.post_bool("scrollForward", vec![self.target(), json!(true), json!(steps)])
    }

    pub fn scroll_backward(&self, steps: u32) -> Result<bool> {
        self.post_bool("scrollBackward", vec![self.target(), json!(true), json!(steps)])
    }

    pub fn scroll_to_beginning(&self) -> Result<bool> {
        self.post_bool("flingBackward", vec![self.target(), json!(true)])
    }

    pub fn scroll_to_end(&self) -> Result<bool> {
        self.post_bool(
            "scrollToEnd",
            vec![
                self.target(),
                json!(true),
                json!(SCROLL_TO_END_MAX_SWIPES),
                json!(SCROLL_TO_END_STEPS),
            ],
        )
    }

    /// Scroll until `target` is visible.
    pub fn scroll_to(&self, target: &Selector) -> Result<bool> {
        self.post_bool(
            "scrollTo",
            vec![self.target(), target.normalized().to_json(), json!(true)],
        )
    }
}
