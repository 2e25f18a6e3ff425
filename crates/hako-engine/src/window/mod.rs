//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, wires them to the GPU layer and
//! drives a [`Game`](crate::game::Game) from redraw requests.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
