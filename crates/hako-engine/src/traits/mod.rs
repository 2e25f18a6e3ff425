//! Pluggable per-actor behaviours.
//!
//! A trait kind declares a unique [`TraitTag`] and is stored in the owner's
//! [`TraitRegistry`] under it. At most one trait per tag is attached at a
//! time; traits are updated in attachment order.

mod sprite_animation;

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::actor::{Actor, StepCtx};
use crate::error::EngineError;

pub use sprite_animation::{SpriteAnimation, SpriteAnimationTrait};

/// Stable identity of a trait kind.
pub type TraitTag = &'static str;

/// Behaviour attached to an actor.
///
/// Every hook receives the owner explicitly; traits never hold a reference
/// back to it.
pub trait ActorTrait: Any {
    fn tag(&self) -> TraitTag;

    /// Runs once, right after the trait is attached.
    fn init(&mut self, _owner: &mut Actor) {}

    /// Runs once per step, before the owner's update hooks.
    fn update(&mut self, _owner: &mut Actor, _ctx: &mut StepCtx<'_>) {}

    /// Runs when the trait is detached or replaced.
    fn on_remove(&mut self, _owner: &mut Actor) {}
}

/// A trait kind that can be constructed by [`Actor::add_trait`].
pub trait TraitKind: ActorTrait + Sized {
    const TAG: TraitTag;
    type Options;

    /// Validates the owner and builds the trait.
    fn create(owner: &Actor, options: Self::Options) -> Result<Self, EngineError>;
}

struct Entry {
    tag: TraitTag,
    handle: Rc<RefCell<dyn ActorTrait>>,
    typed: Rc<dyn Any>,
}

/// Tag-keyed trait storage in attachment order.
#[derive(Default)]
pub struct TraitRegistry {
    entries: Vec<Entry>,
}

impl TraitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `handle` under `K::TAG`.
    ///
    /// An existing entry with the same tag is replaced in place and its
    /// handle returned.
    pub fn insert<K: TraitKind>(&mut self, handle: Rc<RefCell<K>>) -> Option<Rc<RefCell<dyn ActorTrait>>> {
        let typed: Rc<dyn Any> = handle.clone();
        let entry = Entry { tag: K::TAG, handle, typed };

        match self.entries.iter_mut().find(|e| e.tag == K::TAG) {
            Some(slot) => Some(std::mem::replace(slot, entry).handle),
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    pub fn get<K: TraitKind>(&self) -> Option<Rc<RefCell<K>>> {
        let entry = self.entries.iter().find(|e| e.tag == K::TAG)?;
        Rc::clone(&entry.typed).downcast::<RefCell<K>>().ok()
    }

    pub fn get_dyn(&self, tag: &str) -> Option<Rc<RefCell<dyn ActorTrait>>> {
        self.entries.iter().find(|e| e.tag == tag).map(|e| Rc::clone(&e.handle))
    }

    /// Removes the entry under `tag`, returning its handle.
    pub fn remove(&mut self, tag: &str) -> Option<Rc<RefCell<dyn ActorTrait>>> {
        let pos = self.entries.iter().position(|e| e.tag == tag)?;
        Some(self.entries.remove(pos).handle)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.iter().any(|e| e.tag == tag)
    }

    /// Snapshot of the attached handles, in update order.
    pub fn handles(&self) -> Vec<Rc<RefCell<dyn ActorTrait>>> {
        self.entries.iter().map(|e| Rc::clone(&e.handle)).collect()
    }

    pub fn is_attached(&self, handle: &Rc<RefCell<dyn ActorTrait>>) -> bool {
        self.entries.iter().any(|e| Rc::ptr_eq(&e.handle, handle))
    }

    pub fn tags(&self) -> impl Iterator<Item = TraitTag> + '_ {
        self.entries.iter().map(|e| e.tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::input::Input;

    /// Records every hook call.
    struct Tracer {
        label: u32,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl ActorTrait for Tracer {
        fn tag(&self) -> TraitTag {
            Self::TAG
        }

        fn init(&mut self, _owner: &mut Actor) {
            self.log.borrow_mut().push(format!("init {}", self.label));
        }

        fn update(&mut self, owner: &mut Actor, _ctx: &mut StepCtx<'_>) {
            owner.x += 1.0;
            self.log.borrow_mut().push(format!("update {}", self.label));
        }

        fn on_remove(&mut self, _owner: &mut Actor) {
            self.log.borrow_mut().push(format!("remove {}", self.label));
        }
    }

    impl TraitKind for Tracer {
        const TAG: TraitTag = "tracer";
        type Options = (u32, Rc<RefCell<Vec<String>>>);

        fn create(_owner: &Actor, (label, log): Self::Options) -> Result<Self, EngineError> {
            Ok(Self { label, log })
        }
    }

    struct Other;

    impl ActorTrait for Other {
        fn tag(&self) -> TraitTag {
            Self::TAG
        }
    }

    impl TraitKind for Other {
        const TAG: TraitTag = "other";
        type Options = ();

        fn create(_owner: &Actor, _: ()) -> Result<Self, EngineError> {
            Ok(Other)
        }
    }

    /// Removes `Other` from its owner while updating.
    struct Remover(Rc<Cell<bool>>);

    impl ActorTrait for Remover {
        fn tag(&self) -> TraitTag {
            Self::TAG
        }

        fn update(&mut self, owner: &mut Actor, _ctx: &mut StepCtx<'_>) {
            self.0.set(owner.remove_trait(Other::TAG));
        }
    }

    impl TraitKind for Remover {
        const TAG: TraitTag = "remover";
        type Options = Rc<Cell<bool>>;

        fn create(_owner: &Actor, flag: Self::Options) -> Result<Self, EngineError> {
            Ok(Remover(flag))
        }
    }

    // ── registry ──────────────────────────────────────────────────────────

    #[test]
    fn typed_and_dyn_lookup_share_the_instance() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut reg = TraitRegistry::new();
        let handle = Rc::new(RefCell::new(Tracer { label: 1, log }));
        assert!(reg.insert(Rc::clone(&handle)).is_none());

        let typed = reg.get::<Tracer>().unwrap();
        assert!(Rc::ptr_eq(&typed, &handle));
        assert_eq!(reg.get_dyn("tracer").unwrap().borrow().tag(), "tracer");
        assert!(reg.get::<Other>().is_none());
    }

    #[test]
    fn insert_replaces_in_place() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut reg = TraitRegistry::new();
        reg.insert(Rc::new(RefCell::new(Tracer { label: 1, log: Rc::clone(&log) })));
        reg.insert(Rc::new(RefCell::new(Other)));
        let old = reg.insert(Rc::new(RefCell::new(Tracer { label: 2, log })));

        assert!(old.is_some());
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.tags().collect::<Vec<_>>(), vec!["tracer", "other"]);
        assert_eq!(reg.get::<Tracer>().unwrap().borrow().label, 2);
    }

    // ── actor integration ─────────────────────────────────────────────────

    #[test]
    fn duplicate_add_replaces_and_runs_on_remove() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut a = Actor::new_null();
        a.add_trait::<Tracer>((1, Rc::clone(&log))).unwrap();
        a.add_trait::<Tracer>((2, Rc::clone(&log))).unwrap();

        assert_eq!(a.trait_tags(), vec!["tracer"]);
        assert_eq!(*log.borrow(), vec!["init 1", "remove 1", "init 2"]);
    }

    #[test]
    fn removing_absent_trait_returns_false() {
        let mut a = Actor::new_null();
        assert!(!a.remove_trait("tracer"));
    }

    #[test]
    fn remove_runs_on_remove_once() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut a = Actor::new_null();
        a.add_trait::<Tracer>((7, Rc::clone(&log))).unwrap();
        assert!(a.remove_trait("tracer"));
        assert!(!a.remove_trait("tracer"));
        assert!(!a.has_trait("tracer"));
        assert_eq!(*log.borrow(), vec!["init 7", "remove 7"]);
    }

    #[test]
    fn traits_update_before_hooks() {
        let input = Input::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut a = Actor::new_null();
        a.add_trait::<Tracer>((1, Rc::clone(&log))).unwrap();
        let l = Rc::clone(&log);
        a.on_update(move |me, _| l.borrow_mut().push(format!("hook x={}", me.x)));

        let mut ctx = StepCtx::new(&input, None);
        a.update(&mut ctx);
        assert_eq!(*log.borrow(), vec!["init 1", "update 1", "hook x=1"]);
    }

    #[test]
    fn trait_removed_mid_step_is_skipped() {
        let input = Input::new();
        let removed = Rc::new(Cell::new(false));
        let mut a = Actor::new_null();
        a.add_trait::<Remover>(Rc::clone(&removed)).unwrap();
        a.add_trait::<Other>(()).unwrap();

        let mut ctx = StepCtx::new(&input, None);
        a.update(&mut ctx);
        assert!(removed.get());
        assert_eq!(a.trait_tags(), vec!["remover"]);
    }

    #[test]
    fn with_trait_borrows_trait_and_owner() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut a = Actor::new_null();
        a.add_trait::<Tracer>((3, log)).unwrap();
        let label = a.with_trait::<Tracer, _>(|p, owner| {
            owner.y = 4.0;
            p.label
        });
        assert_eq!(label, Some(3));
        assert_eq!(a.y, 4.0);
        assert_eq!(a.with_trait::<Other, _>(|_, _| ()), None);
    }
}
