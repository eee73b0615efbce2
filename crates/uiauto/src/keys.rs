//! Hardware keys and screen power.

use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use serde_json::json;
use tracing::debug;
use tracing::warn;

use crate::device::Device;
use crate::error::Error;
use crate::error::Result;
use crate::shell::run_shell;

const UNLOCK_COMMAND: &str = "am start -W -n com.github.uiautomator/.IdentifyActivity -e theme black";
const UNLOCK_SETTLE: Duration = Duration::from_secs(1);

/// A key given either by name (`home`, `back`, `volume_up`, ...) or by
/// Android key code with optional meta state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPress {
    Name(String),
    Code { code: i32, meta: Option<i32> },
}

impl FromStr for KeyPress {
    type Err = Error;

    /// Numbers are key codes; `code:meta` adds a meta state; anything else
    /// made of word characters is a key name.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidKey(s.to_string());

        if let Some((code, meta)) = s.split_once(':') {
            let code = code.trim().parse().map_err(|_| invalid())?;
            let meta = meta.trim().parse().map_err(|_| invalid())?;
            return Ok(KeyPress::Code {
                code,
                meta: Some(meta),
            });
        }
        if let Ok(code) = s.parse() {
            return Ok(KeyPress::Code { code, meta: None });
        }
        if !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Ok(KeyPress::Name(s.to_ascii_lowercase()));
        }
        Err(invalid())
    }
}

impl fmt::Display for KeyPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPress::Name(name) => write!(f, "{}", name),
            KeyPress::Code { code, meta: None } => write!(f, "{}", code),
            KeyPress::Code {
                code,
                meta: Some(meta),
            } => write!(f, "{}:{}", code, meta),
        }
    }
}

impl Device {
    pub fn wake_up(&self) -> Result<()> {
        self.rpc().invoke("wakeUp", vec![])?;
        Ok(())
    }

    pub fn sleep(&self) -> Result<()> {
        self.rpc().invoke("sleep", vec![])?;
        Ok(())
    }

    pub fn is_wake_up(&self) -> Result<bool> {
        Ok(self.device_info()?.screen_on)
    }

    pub fn is_sleep(&self) -> Result<bool> {
        Ok(!self.device_info()?.screen_on)
    }

    pub fn press(&self, key: &str) -> Result<()> {
        self.rpc().invoke("pressKey", vec![json!(key)])?;
        Ok(())
    }

    pub fn press_key_code(&self, code: i32, meta: Option<i32>) -> Result<()> {
        let mut params = vec![json!(code)];
        if let Some(meta) = meta {
            params.push(json!(meta));
        }
        self.rpc().invoke("pressKeyCode", params)?;
        Ok(())
    }

    pub fn press_key(&self, key: &KeyPress) -> Result<()> {
        match key {
            KeyPress::Name(name) => self.press(name),
            KeyPress::Code { code, meta } => self.press_key_code(*code, *meta),
        }
    }

    /// Dismiss the keyguard.
    ///
    /// The identify activity blocks until it is dismissed, so it runs on a
    /// detached thread; after a short pause `home` is pressed on this one.
    pub fn unlock(&self) -> Result<()> {
        let rpc = self.detached_client();
        thread::Builder::new()
            .name("uiauto-unlock".to_string())
            .spawn(move || match run_shell(&rpc, UNLOCK_COMMAND, 0) {
                Ok(_) => debug!("Identify activity finished"),
                Err(err) => warn!(error = %err, "Identify activity failed"),
            })?;

        self.sleeper().sleep(UNLOCK_SETTLE);
        self.press("home")
    }
}
