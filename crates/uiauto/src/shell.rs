//! Remote shell and app lifecycle.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use uiauto_core::AppInfo;
use uiauto_core::ShellOutput;
use uiauto_rpc::ClientError;
use uiauto_rpc::ResponseStrategy;
use uiauto_rpc::RpcClient;
use uiauto_rpc::UiaError;

use crate::device::Device;
use crate::error::Error;
use crate::error::Result;

const APP_TIMEOUT_SECS: u64 = 10;

static CURRENT_FOCUS: LazyLock<std::result::Result<Regex, regex::Error>> = LazyLock::new(|| {
    Regex::new(r"mCurrentFocus=Window\{.*\s+(?P<package>[^\s]+)/(?P<activity>[^\s]+)\}")
});

/// Run `command` through the agent's `/shell` endpoint. A non-zero exit
/// status becomes a [`UiaError`] carrying that status.
pub(crate) fn run_shell(
    rpc: &RpcClient,
    command: &str,
    timeout_secs: u64,
) -> std::result::Result<ShellOutput, ClientError> {
    debug!(command, timeout_secs, "Running shell command");
    let out: ShellOutput = rpc.post_form_with(
        "shell",
        vec![
            ("command".to_string(), command.to_string()),
            ("timeout".to_string(), timeout_secs.to_string()),
        ],
        ResponseStrategy::raw(|res| Ok(serde_json::from_slice(&res.body)?)),
    )?;

    if !out.success() {
        return Err(ClientError::Rpc(UiaError::new(
            out.exit_code,
            format!("Failed to execute command: {}", command),
        )));
    }
    Ok(out)
}

impl Device {
    /// Command output on success. `timeout_secs` of 0 lets the agent wait
    /// indefinitely.
    pub fn shell(&self, command: &str, timeout_secs: u64) -> Result<String> {
        Ok(self.shell_output(command, timeout_secs)?.output)
    }

    pub fn shell_output(&self, command: &str, timeout_secs: u64) -> Result<ShellOutput> {
        Ok(run_shell(self.rpc(), command, timeout_secs)?)
    }

    /// Launch `package` through its launcher activity.
    pub fn app_start(&self, package: &str) -> Result<()> {
        self.shell(
            &format!("monkey -p {} -c android.intent.category.LAUNCHER 1", package),
            APP_TIMEOUT_SECS,
        )?;
        Ok(())
    }

    pub fn app_stop(&self, package: &str) -> Result<()> {
        self.shell(&format!("am force-stop {}", package), APP_TIMEOUT_SECS)?;
        Ok(())
    }

    /// Focused package and activity from the window manager.
    pub fn current_app(&self) -> Result<AppInfo> {
        let command = "dumpsys window windows";
        let output = self.shell(command, APP_TIMEOUT_SECS)?;
        parse_current_focus(&output).ok_or_else(|| Error::UnexpectedOutput {
            command: command.to_string(),
            output: output.lines().take(5).collect::<Vec<_>>().join("\n"),
        })
    }
}

fn parse_current_focus(output: &str) -> Option<AppInfo> {
    let re = CURRENT_FOCUS.as_ref().ok()?;
    let caps = re.captures(output)?;
    Some(AppInfo {
        package: caps.name("package")?.as_str().to_string(),
        activity: caps.name("activity")?.as_str().to_string(),
    })
}
