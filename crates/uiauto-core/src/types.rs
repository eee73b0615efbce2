use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::Serialize;

use crate::position::ElementRect;
use crate::position::Position;

/// Reply of the `deviceInfo` RPC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    pub current_package_name: String,
    pub display_height: i32,
    pub display_width: i32,
    pub display_rotation: i32,
    pub display_size_dp_x: i32,
    pub display_size_dp_y: i32,
    pub product_name: String,
    pub screen_on: bool,
    pub sdk_int: i32,
    pub natural_orientation: bool,
}

/// Reply of the `objInfo` RPC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementInfo {
    pub content_description: Option<String>,
    pub checked: bool,
    pub scrollable: bool,
    pub text: Option<String>,
    pub package_name: String,
    pub selected: bool,
    pub enabled: bool,
    pub class_name: String,
    pub focused: bool,
    pub focusable: bool,
    pub clickable: bool,
    /// The agent spells this field `chileCount`.
    #[serde(rename = "chileCount", alias = "childCount")]
    pub child_count: i32,
    pub long_clickable: bool,
    pub checkable: bool,
    pub bounds: Option<ElementRect>,
    pub visible_bounds: Option<ElementRect>,
}

impl ElementInfo {
    /// Layout bounds, falling back to the visible part when the agent
    /// omits them.
    pub fn rect(&self) -> Option<ElementRect> {
        self.bounds.or(self.visible_bounds)
    }

    pub fn center(&self) -> Option<Position> {
        self.rect().map(|r| r.center())
    }
}

/// Foreground application as parsed from the window manager dump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub package: String,
    pub activity: String,
}

/// Raw screenshot bytes with the media type the agent reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screenshot {
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Screenshot {
    pub fn extension(&self) -> &'static str {
        match self.content_type.split(';').next().map(str::trim) {
            Some("image/png") => "png",
            Some("image/webp") => "webp",
            _ => "jpg",
        }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

/// Result of a remote shell command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellOutput {
    pub exit_code: i32,
    pub output: String,
}

impl ShellOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}
