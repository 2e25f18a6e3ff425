//! Hako engine crate.
//!
//! A small 2D engine built around actors: uniform entities with shared
//! spatial state, pluggable traits and per-step hooks, grouped into scenes
//! and driven by a fixed-timestep game loop. Drawing goes to a software
//! [`surface::Canvas`]; the desktop host in [`window`] presents it with wgpu.

pub mod actor;
pub mod assets;
pub mod camera;
pub mod coords;
pub mod error;
pub mod event;
pub mod game;
pub mod input;
pub mod paint;
pub mod scene;
pub mod surface;
pub mod text;
pub mod traits;

pub mod device;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;

pub use error::EngineError;
