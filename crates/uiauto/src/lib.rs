//! Client for an on-device Android UI automation agent.
//!
//! [`Device`] talks to the agent over HTTP/JSON-RPC. Queries go through
//! [`Element`], which gates its actions on the element existing first.

#![deny(clippy::all)]

pub mod commands;
mod coordinates;
pub mod device;
pub mod element;
pub mod error;
mod gesture;
pub mod handlers;
pub mod input;
pub mod keys;
pub mod presenter;
mod screen;
mod shell;
pub mod telemetry;
pub mod toast;
pub mod wait;
pub mod watcher;

#[cfg(test)]
mod test_support;

pub use device::Device;
pub use element::Element;
pub use error::Error;
pub use error::Result;
pub use handlers::HandlerResult;
pub use input::FAST_INPUT_IME;
pub use input::parse_editor_action;
pub use keys::KeyPress;
pub use toast::Toast;
pub use wait::WaitKind;
pub use wait::WaitPolicy;
pub use watcher::Watcher;

pub use uiauto_core::DeviceInfo;
pub use uiauto_core::EditorAction;
pub use uiauto_core::ElementInfo;
pub use uiauto_core::Orientation;
pub use uiauto_core::Position;
pub use uiauto_core::Selector;
pub use uiauto_core::SwipeDirection;
pub use uiauto_core::TouchAction;
pub use uiauto_core::WindowSize;
pub use uiauto_rpc::ClientConfig;
pub use uiauto_rpc::ClientError;
