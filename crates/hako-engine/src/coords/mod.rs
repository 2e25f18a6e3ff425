//! Geometry value types shared by actors, the camera and the canvas.
//!
//! World and surface space share one convention:
//! - origin top-left
//! - +X right, +Y down
//! - units are surface pixels before the camera transform is applied

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
