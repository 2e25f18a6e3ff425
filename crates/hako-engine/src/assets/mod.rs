//! Named asset registries.
//!
//! Registries are plain values owned by the game and passed to whoever needs
//! them. `add` starts a background load; `load_all` is the barrier to run
//! before the loop starts. Failed loads are logged and counted, never retried.

mod images;
mod loader;
mod sounds;

pub use images::ImageRegistry;
pub use loader::{AssetSource, LoadReport};
pub use sounds::{AudioOutput, SoundClip, SoundOptions, SoundRegistry};
