//! The game loop.
//!
//! [`Game`] owns the drawing surface, the camera, the input state and the
//! list of active scenes. The host calls [`Game::frame`] once per presented
//! frame with a monotonically increasing millisecond timestamp; the game runs
//! as many fixed-interval steps as the elapsed time allows, then renders.

mod config;
mod runner;

pub use config::GameConfig;
pub use runner::{FrameStats, Game};
