//! Scenes: top-level actor containers driven by the game.
//!
//! A [`Scene`] owns a [`Container`](crate::actor::Container) of actors, a
//! controller actor that hosts scene-level hooks, and the camera bound by the
//! game. Scenes request transitions with [`Scene::change_scene`]; the game
//! applies them at the end of the current step.

mod stage;

pub use stage::{Scene, SceneRef, CHANGE_SCENE};
