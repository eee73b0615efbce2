//! Domain model for uiauto.
//!
//! Pure value types with no I/O: the bitmask selector that addresses remote
//! UI objects, screen geometry and coordinate resolution, and the DTOs the
//! agent returns.

#![deny(clippy::all)]

pub mod actions;
pub mod position;
pub mod selector;
pub mod types;

pub use actions::EditorAction;
pub use actions::Orientation;
pub use actions::TouchAction;
pub use position::ElementRect;
pub use position::Position;
pub use position::SwipeDirection;
pub use position::WindowSize;
pub use selector::Relation;
pub use selector::Selector;
pub use selector::SelectorError;
pub use selector::SelectorKey;
pub use selector::SelectorValue;
pub use types::AppInfo;
pub use types::DeviceInfo;
pub use types::ElementInfo;
pub use types::Screenshot;
pub use types::ShellOutput;
