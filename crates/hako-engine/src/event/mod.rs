//! Named-event publish/subscribe.
//!
//! Actors, scenes and the sound registry each own an [`EventChannel`]. Channels
//! are single-threaded and use interior mutability, so a listener may register
//! or remove listeners on the very channel that is invoking it.

mod channel;

pub use channel::{EventChannel, ListenerId};
