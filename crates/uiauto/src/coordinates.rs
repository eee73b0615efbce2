//! Relative to absolute coordinate resolution.
//!
//! The window size is fetched on the first position that needs it and
//! cached for the device's lifetime. Rotation is not tracked.

use tracing::debug;
use uiauto_common::mutex_lock_or_recover;
use uiauto_core::Position;
use uiauto_core::WindowSize;

use crate::device::AgentInfo;
use crate::device::Device;
use crate::error::Error;
use crate::error::Result;

impl Device {
    pub fn window_size(&self) -> Result<WindowSize> {
        if let Some(size) = *mutex_lock_or_recover(&self.window_size) {
            return Ok(size);
        }

        let info = self.rpc().get_with("info", AgentInfo::strategy())?;
        let size = info.display.ok_or_else(|| Device::missing("display"))?;
        debug!(width = size.width, height = size.height, "Window size cached");

        *mutex_lock_or_recover(&self.window_size) = Some(size);
        Ok(size)
    }

    /// Resolve `position` against the window. Absolute positions never
    /// trigger a fetch.
    pub fn to_absolute(&self, position: Position) -> Result<Position> {
        if !position.needs_window_size() {
            return Ok(position);
        }
        Ok(position.to_absolute(self.window_size()?))
    }

    /// Reject negative or non-finite input for `operation`, then resolve.
    pub(crate) fn resolve(&self, operation: &'static str, position: Position) -> Result<Position> {
        if !position.is_valid() {
            return Err(Error::InvalidPosition {
                operation,
                position,
            });
        }
        self.to_absolute(position)
    }
}
