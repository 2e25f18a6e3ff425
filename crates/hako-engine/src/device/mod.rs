//! GPU device + window surface management.
//!
//! Creates the wgpu Instance/Adapter/Device/Queue, configures the swapchain
//! and hands out one encoder + view per presented frame.

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
