//! GPU presentation.
//!
//! The engine draws on the CPU into a [`Canvas`](crate::surface::Canvas);
//! this module uploads the finished pixels once per frame and draws them to
//! the window surface.

mod ctx;
mod present;

pub use ctx::{RenderCtx, RenderTarget};
pub use present::{letterbox_scale, Presenter};
