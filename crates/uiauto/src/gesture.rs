//! Screen gestures.
//!
//! Positions may be absolute pixels or screen fractions; negative input is
//! rejected before any request goes out.

use std::time::Duration;

use serde_json::Value;
use serde_json::json;
use uiauto_core::Position;
use uiauto_core::TouchAction;

use crate::device::Device;
use crate::error::Result;

const DEFAULT_LONG_CLICK: Duration = Duration::from_millis(500);
const SWIPE_POINTS_STEPS: u32 = 20;
/// Agent steps per second of drag.
const DRAG_STEPS_PER_SEC: f32 = 200.0;

fn point(position: Position) -> [Value; 2] {
    [json!(position.x), json!(position.y)]
}

impl Device {
    pub fn click(&self, position: Position) -> Result<()> {
        let abs = self.resolve("click", position)?;
        self.rpc().invoke("click", point(abs).to_vec())?;
        Ok(())
    }

    /// Two clicks at the same spot with `pause` between them.
    pub fn double_click(&self, position: Position, pause: Duration) -> Result<()> {
        let abs = self.resolve("double_click", position)?;
        self.rpc().invoke("click", point(abs).to_vec())?;
        self.sleeper().sleep(pause);
        self.rpc().invoke("click", point(abs).to_vec())?;
        Ok(())
    }

    /// Press, hold for `duration` (0.5 s when unset or zero), release.
    pub fn long_click(&self, position: Position, duration: Option<Duration>) -> Result<()> {
        let hold = duration
            .filter(|d| !d.is_zero())
            .unwrap_or(DEFAULT_LONG_CLICK);
        let abs = self.resolve("long_click", position)?;
        self.inject(TouchAction::Down, abs)?;
        self.sleeper().sleep(hold);
        self.inject(TouchAction::Up, abs)
    }

    /// Raw touch event.
    pub fn touch(&self, action: TouchAction, position: Position) -> Result<()> {
        let abs = self.resolve("touch", position)?;
        self.inject(action, abs)
    }

    fn inject(&self, action: TouchAction, abs: Position) -> Result<()> {
        self.rpc().invoke(
            "injectInputEvent",
            vec![json!(action.code()), json!(abs.x), json!(abs.y), json!(0)],
        )?;
        Ok(())
    }

    pub fn swipe(&self, from: Position, to: Position, steps: u32) -> Result<()> {
        let from = self.resolve("swipe", from)?;
        let to = self.resolve("swipe", to)?;
        let [x1, y1] = point(from);
        let [x2, y2] = point(to);
        self.rpc()
            .invoke("swipe", vec![x1, y1, x2, y2, json!(steps)])?;
        Ok(())
    }

    /// Swipe through `points` in order. The agent takes integer pixels.
    pub fn swipe_points(&self, points: &[Position]) -> Result<()> {
        let mut flat = Vec::with_capacity(points.len() * 2);
        for p in points {
            let (x, y) = self.resolve("swipe_points", *p)?.to_pixels();
            flat.push(x);
            flat.push(y);
        }
        self.rpc()
            .invoke("swipePoints", vec![json!(flat), json!(SWIPE_POINTS_STEPS)])?;
        Ok(())
    }

    pub fn drag(&self, from: Position, to: Position, duration_secs: f32) -> Result<()> {
        let from = self.resolve("drag", from)?;
        let to = self.resolve("drag", to)?;
        let steps = (duration_secs * DRAG_STEPS_PER_SEC).round() as i64;
        let [x1, y1] = point(from);
        let [x2, y2] = point(to);
        self.rpc()
            .invoke("drag", vec![x1, y1, x2, y2, json!(steps)])?;
        Ok(())
    }
}
