//! Closed sets of named device actions.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// IME editor action delivered through the fast-input broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Go,
    Search,
    Send,
    Next,
    Done,
    Previous,
    /// Any other `EditorInfo` action code.
    Code(i32),
}

impl EditorAction {
    pub fn code(&self) -> i32 {
        match self {
            EditorAction::Go => 2,
            EditorAction::Search => 3,
            EditorAction::Send => 4,
            EditorAction::Next => 5,
            EditorAction::Done => 6,
            EditorAction::Previous => 7,
            EditorAction::Code(code) => *code,
        }
    }
}

impl FromStr for EditorAction {
    type Err = String;

    /// Accepts a known action name or a decimal code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "go" => Ok(EditorAction::Go),
            "search" => Ok(EditorAction::Search),
            "send" => Ok(EditorAction::Send),
            "next" => Ok(EditorAction::Next),
            "done" => Ok(EditorAction::Done),
            "previous" => Ok(EditorAction::Previous),
            other => other
                .parse::<i32>()
                .map(EditorAction::Code)
                .map_err(|_| format!("unknown editor action '{}'", s)),
        }
    }
}

impl From<i32> for EditorAction {
    fn from(code: i32) -> Self {
        EditorAction::Code(code)
    }
}

impl fmt::Display for EditorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditorAction::Code(code) => write!(f, "{}", code),
            EditorAction::Go => write!(f, "go"),
            EditorAction::Search => write!(f, "search"),
            EditorAction::Send => write!(f, "send"),
            EditorAction::Next => write!(f, "next"),
            EditorAction::Done => write!(f, "done"),
            EditorAction::Previous => write!(f, "previous"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Natural,
    Left,
    Right,
    /// Accepted by the agent but not honoured on most devices.
    UpsideDown,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Natural => "natural",
            Orientation::Left => "left",
            Orientation::Right => "right",
            Orientation::UpsideDown => "upsidedown",
        }
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "natural" | "n" => Ok(Orientation::Natural),
            "left" | "l" => Ok(Orientation::Left),
            "right" | "r" => Ok(Orientation::Right),
            "upsidedown" | "u" => Ok(Orientation::UpsideDown),
            other => Err(format!("unknown orientation '{}'", other)),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Touch action codes for `injectInputEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    Down,
    Up,
    Move,
}

impl TouchAction {
    pub fn code(&self) -> i32 {
        match self {
            TouchAction::Down => 0,
            TouchAction::Up => 1,
            TouchAction::Move => 2,
        }
    }
}
