//! Actors: the uniform entity abstraction.
//!
//! An [`Actor`] carries shared spatial state (position, size, scale, rotation,
//! alpha, parallax), a trait registry, per-step hooks, a frame counter and its
//! own event channel. What it draws is decided by its [`ActorKind`].
//!
//! Actors are shared as [`ActorRef`]. Containment is never ownership: a
//! [`Container`] holds references and follows the actor's `spawn`/`destroy`
//! events.

mod container;
mod entity;
mod kind;
mod static_container;
mod stroke;

use std::cell::RefCell;
use std::rc::Rc;

pub use container::Container;
pub use entity::{Actor, ActorEvent, ActorId, StepCtx, UpdateHook};
pub use kind::{ActorKind, RectFill, Sprite, TextBlock};
pub use static_container::StaticContainer;
pub use stroke::{PathOp, StrokePath, StrokeStyle};

pub type ActorRef = Rc<RefCell<Actor>>;

/// Event emitted by [`Actor::spawn`].
pub const SPAWN: &str = "spawn";
/// Event emitted by [`Actor::destroy`].
pub const DESTROY: &str = "destroy";
