//! Host event translation.

pub mod winit;
