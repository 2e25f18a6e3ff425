//! Time subsystem.
//!
//! - [`FrameClock`] turns wall-clock ticks into millisecond timestamps, one
//!   per presented frame.
//! - [`FixedStep`] converts those timestamps into a whole number of
//!   fixed-interval simulation steps.

mod fixed_step;
mod frame_clock;

pub use fixed_step::FixedStep;
pub use frame_clock::{FrameClock, FrameTime};
