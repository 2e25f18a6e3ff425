//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! Runtime code translates platform events into `InputEvent`s
//! (see [`platform::winit`]) and feeds them to [`Input::apply_event`]; the game
//! loop calls [`Input::poll`] once per simulation step.

mod latest;
mod poll;
mod types;

pub mod platform;

pub use latest::LatestInput;
pub use poll::Input;
pub use types::{
    Button,
    InputEvent,
    Key,
    KeyState,
    MouseButton,
    MouseButtonState,
    PointerMoveEvent,
};
