use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::event::{EventChannel, ListenerId};
use crate::surface::Surface;

use super::{ActorEvent, ActorId, ActorRef, StepCtx, DESTROY, SPAWN};

struct Member {
    id: ActorId,
    actor: ActorRef,
    events: Rc<EventChannel<ActorEvent>>,
    on_spawn: ListenerId,
    on_destroy: ListenerId,
}

#[derive(Default)]
struct Members {
    list: RefCell<Vec<Member>>,
}

/// Insertion-ordered set of actors.
///
/// Cloning yields another handle to the same set. Members are followed
/// through their events: `spawn` adopts the new actor here, `destroy`
/// evicts the emitter. Both are safe to emit mid-pass.
#[derive(Clone, Default)]
pub struct Container {
    members: Rc<Members>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `actor` unless already present. Returns whether it was added.
    pub fn add(&self, actor: &ActorRef) -> bool {
        if self.contains(actor) {
            return false;
        }
        let Ok(a) = actor.try_borrow() else {
            log::warn!("container: actor is mutably borrowed, cannot add");
            return false;
        };
        let (id, events) = (a.id(), a.events());
        drop(a);

        let weak = Rc::downgrade(&self.members);
        let on_spawn = events.on(SPAWN, move |ev| {
            if let (ActorEvent::Spawn(child), Some(members)) = (ev, weak.upgrade()) {
                Container { members }.add(child);
            }
        });

        let weak: Weak<Members> = Rc::downgrade(&self.members);
        let on_destroy = events.on(DESTROY, move |ev| {
            if let (ActorEvent::Destroy(id), Some(members)) = (ev, weak.upgrade()) {
                Container { members }.remove_id(*id);
            }
        });

        self.members.list.borrow_mut().push(Member { id, actor: Rc::clone(actor), events, on_spawn, on_destroy });
        true
    }

    /// Removes `actor` and unsubscribes from it. Returns whether it was present.
    pub fn remove(&self, actor: &ActorRef) -> bool {
        let pos = self.members.list.borrow().iter().position(|m| Rc::ptr_eq(&m.actor, actor));
        self.remove_at(pos)
    }

    pub fn remove_id(&self, id: ActorId) -> bool {
        let pos = self.members.list.borrow().iter().position(|m| m.id == id);
        self.remove_at(pos)
    }

    fn remove_at(&self, pos: Option<usize>) -> bool {
        let Some(pos) = pos else { return false; };
        let member = self.members.list.borrow_mut().remove(pos);
        member.events.off(SPAWN, member.on_spawn);
        member.events.off(DESTROY, member.on_destroy);
        true
    }

    pub fn contains(&self, actor: &ActorRef) -> bool {
        self.members.list.borrow().iter().any(|m| Rc::ptr_eq(&m.actor, actor))
    }

    pub fn contains_id(&self, id: ActorId) -> bool {
        self.members.list.borrow().iter().any(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.members.list.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.list.borrow().is_empty()
    }

    /// Members in insertion order.
    pub fn members(&self) -> Vec<ActorRef> {
        self.members.list.borrow().iter().map(|m| Rc::clone(&m.actor)).collect()
    }

    fn snapshot(&self) -> Vec<(ActorId, ActorRef)> {
        self.members.list.borrow().iter().map(|m| (m.id, Rc::clone(&m.actor))).collect()
    }

    /// Updates every member present when the pass starts.
    ///
    /// Members removed earlier in the pass are skipped; members added during
    /// the pass wait for the next one.
    pub fn update(&self, ctx: &mut StepCtx<'_>) {
        for (id, actor) in self.snapshot() {
            if !self.contains_id(id) {
                continue;
            }
            match actor.try_borrow_mut() {
                Ok(mut a) => a.update(ctx),
                Err(_) => log::warn!("container: actor {id:?} already borrowed, update skipped"),
            }
        }
    }

    pub fn render(&self, target: &mut dyn Surface) {
        for (id, actor) in self.snapshot() {
            if !self.contains_id(id) {
                continue;
            }
            match actor.try_borrow() {
                Ok(a) => a.render(target),
                Err(_) => log::warn!("container: actor {id:?} already borrowed, render skipped"),
            }
        }
    }

    /// Removes every member, unsubscribing from each.
    pub fn clear(&self) {
        let drained: Vec<Member> = self.members.list.borrow_mut().drain(..).collect();
        for m in drained {
            m.events.off(SPAWN, m.on_spawn);
            m.events.off(DESTROY, m.on_destroy);
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<ActorId> = self.members.list.borrow().iter().map(|m| m.id).collect();
        f.debug_struct("Container").field("members", &ids).finish()
    }
}
