//! FastInputIME control and editor actions.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;
use uiauto_core::EditorAction;

use crate::device::Device;
use crate::error::Error;
use crate::error::Result;

pub const FAST_INPUT_IME: &str = "com.github.uiautomator/.FastInputIME";

const IME_CHECKS: u32 = 3;
const IME_SETTLE: Duration = Duration::from_millis(500);
const IME_TIMEOUT_SECS: u64 = 5;
const DUMPSYS_TIMEOUT_SECS: u64 = 10;

static CURRENT_METHOD: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"mCurMethodId=([-_./\w]+)"));

/// Editor action by name (`go`, `search`, `send`, `next`, `done`,
/// `previous`) or raw code.
pub fn parse_editor_action(raw: &str) -> Result<EditorAction> {
    raw.parse()
        .map_err(|_| Error::UnknownEditorAction(raw.to_string()))
}

fn current_method(dumpsys: &str) -> Option<&str> {
    let re = CURRENT_METHOD.as_ref().ok()?;
    Some(re.captures(dumpsys)?.get(1)?.as_str())
}

impl Device {
    pub fn set_fastinput_ime(&self, enable: bool) -> Result<()> {
        if enable {
            self.shell(&format!("ime enable {}", FAST_INPUT_IME), IME_TIMEOUT_SECS)?;
            self.shell(&format!("ime set {}", FAST_INPUT_IME), IME_TIMEOUT_SECS)?;
        } else {
            self.shell(&format!("ime disable {}", FAST_INPUT_IME), IME_TIMEOUT_SECS)?;
        }
        Ok(())
    }

    /// Make FastInputIME the active input method, re-enabling it between
    /// checks.
    pub fn wait_fastinput_ime(&self) -> Result<()> {
        for attempt in 1..=IME_CHECKS {
            let output = self.shell("dumpsys input_method", DUMPSYS_TIMEOUT_SECS)?;
            let active = current_method(&output);
            if active == Some(FAST_INPUT_IME) {
                return Ok(());
            }
            debug!(attempt, active = ?active, "FastInputIME not active");
            self.set_fastinput_ime(true)?;
            self.sleeper().sleep(IME_SETTLE);
        }
        Err(Error::ImeNotReady {
            attempts: IME_CHECKS,
        })
    }

    pub fn send_action(&self, action: EditorAction) -> Result<()> {
        self.wait_fastinput_ime()?;
        self.shell(
            &format!("am broadcast -a ADB_EDITOR_CODE --ei code {}", action.code()),
            IME_TIMEOUT_SECS,
        )?;
        Ok(())
    }
}
