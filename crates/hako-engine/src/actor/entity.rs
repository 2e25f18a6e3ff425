use std::cell::RefCell;
use std::fmt;
use std::mem;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::assets::ImageRegistry;
use crate::camera::Camera;
use crate::coords::{Rect, Vec2};
use crate::error::EngineError;
use crate::event::{EventChannel, ListenerId};
use crate::input::Input;
use crate::paint::Paint;
use crate::surface::Surface;
use crate::text::{FontSystem, TextStyle};
use crate::traits::{ActorTrait, TraitKind, TraitRegistry, TraitTag};

use super::{
    ActorKind, ActorRef, Container, RectFill, Sprite, StaticContainer, StrokePath, StrokeStyle,
    TextBlock, DESTROY, SPAWN,
};

/// Process-unique actor identity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ActorId(u64);

impl ActorId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ActorId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Payload of every event emitted on an actor's channel.
pub enum ActorEvent {
    /// `spawn`: a new actor to adopt into the emitter's container(s).
    Spawn(ActorRef),
    /// `destroy`: the emitter asks to be evicted.
    Destroy(ActorId),
    /// Any custom event raised with [`Actor::notify`].
    Notify(ActorId),
}

impl fmt::Debug for ActorEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActorEvent::Spawn(actor) => match actor.try_borrow() {
                Ok(a) => write!(f, "Spawn({:?})", a.id()),
                Err(_) => f.write_str("Spawn(<borrowed>)"),
            },
            ActorEvent::Destroy(id) => write!(f, "Destroy({id:?})"),
            ActorEvent::Notify(id) => write!(f, "Notify({id:?})"),
        }
    }
}

/// What one simulation step hands to every actor.
pub struct StepCtx<'a> {
    pub input: &'a Input,
    /// The game camera. `None` when the actor is stepped outside a game.
    pub camera: Option<&'a mut Camera>,
}

impl<'a> StepCtx<'a> {
    pub fn new(input: &'a Input, camera: Option<&'a mut Camera>) -> Self {
        Self { input, camera }
    }

    pub fn camera_position(&self) -> Option<Vec2> {
        self.camera.as_deref().map(Camera::position)
    }
}

/// Per-step closure attached with [`Actor::on_update`].
pub type UpdateHook = Box<dyn FnMut(&mut Actor, &mut StepCtx<'_>)>;

/// A scene entity.
///
/// Spatial fields are public and freely mutated by hooks and traits.
/// `rotation` is in degrees; parallax `1.0` moves with the world and `0.0`
/// stays fixed on screen.
pub struct Actor {
    id: ActorId,

    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub rotation: f32,
    pub alpha: f32,
    pub parallax_x: f32,
    pub parallax_y: f32,

    time: i64,
    tags: Vec<String>,
    prev_camera: Option<Vec2>,
    traits: TraitRegistry,
    // Detached while borrowed; `on_remove` runs once the borrow ends.
    pending_removals: Vec<Rc<RefCell<dyn ActorTrait>>>,
    hooks: Vec<UpdateHook>,
    events: Rc<EventChannel<ActorEvent>>,
    kind: ActorKind,
}

impl Actor {
    pub fn new(rect: Rect, kind: ActorKind) -> Self {
        Self {
            id: ActorId::next(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
            alpha: 1.0,
            parallax_x: 1.0,
            parallax_y: 1.0,
            time: -1,
            tags: Vec::new(),
            prev_camera: None,
            traits: TraitRegistry::default(),
            pending_removals: Vec::new(),
            hooks: Vec::new(),
            events: Rc::new(EventChannel::new()),
            kind,
        }
    }

    // ── constructors ──────────────────────────────────────────────────────

    /// Zero-size actor that draws nothing; a host for hooks.
    pub fn new_null() -> Self {
        Self::new(Rect::default(), ActorKind::Null)
    }

    pub fn new_rect(rect: Rect, paint: impl Into<Paint>) -> Self {
        Self::new(rect, ActorKind::Rect(RectFill { paint: paint.into() }))
    }

    /// Text anchored at `(x, y)`; `\n` starts a new line `style.size` lower.
    pub fn new_text(text: impl Into<String>, x: f32, y: f32, style: TextStyle) -> Self {
        Self::new(Rect::new(x, y, 0.0, 0.0), ActorKind::Text(TextBlock { text: text.into(), style }))
    }

    /// Sprite showing the whole of image `name`, drawn into `rect`.
    pub fn new_sprite(images: &ImageRegistry, name: &str, rect: Rect) -> Result<Self, EngineError> {
        let image = images.require(name)?;
        Ok(Self::new(rect, ActorKind::Sprite(Sprite::new(image))))
    }

    pub fn new_stroke_path(style: impl Into<StrokeStyle>) -> Self {
        Self::new(Rect::default(), ActorKind::StrokePath(StrokePath::new(style.into())))
    }

    pub fn new_container() -> Self {
        Self::new(Rect::default(), ActorKind::Container(Container::new()))
    }

    /// Container that bakes its children once into an off-screen buffer
    /// covering `rect`.
    pub fn new_static_container(rect: Rect) -> Self {
        Self::new(rect, ActorKind::StaticContainer(StaticContainer::new(rect)))
    }

    /// Static container whose buffer can draw text children with `fonts`.
    pub fn new_static_container_with_fonts(rect: Rect, fonts: Rc<FontSystem>) -> Self {
        Self::new(rect, ActorKind::StaticContainer(StaticContainer::with_fonts(rect, fonts)))
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_parallax(mut self, x: f32, y: f32) -> Self {
        self.parallax_x = x;
        self.parallax_y = y;
        self
    }

    /// Wraps the actor for sharing with containers and closures.
    pub fn shared(self) -> ActorRef {
        Rc::new(RefCell::new(self))
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> ActorId {
        self.id
    }

    /// Steps since the first update (`0` during the first one, `-1` before).
    #[inline]
    pub fn time(&self) -> i64 {
        self.time
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    pub fn kind(&self) -> &ActorKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ActorKind {
        &mut self.kind
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.has_tag(&tag) {
            self.tags.push(tag);
        }
    }

    /// Source region of a sprite; `None` for other variants.
    pub fn source_rect(&self) -> Option<Rect> {
        match &self.kind {
            ActorKind::Sprite(s) => Some(s.source),
            _ => None,
        }
    }

    /// Sets the source region of a sprite. Returns `false` for other variants.
    pub fn set_source_rect(&mut self, rect: Rect) -> bool {
        match &mut self.kind {
            ActorKind::Sprite(s) => {
                s.source = rect;
                true
            }
            _ => false,
        }
    }

    /// Replaces the text of a text actor. Returns `false` for other variants.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match &mut self.kind {
            ActorKind::Text(t) => {
                t.text = text.into();
                true
            }
            _ => false,
        }
    }

    pub fn stroke_path_mut(&mut self) -> Option<&mut StrokePath> {
        match &mut self.kind {
            ActorKind::StrokePath(p) => Some(p),
            _ => None,
        }
    }

    // ── events ────────────────────────────────────────────────────────────

    /// Shared handle to this actor's channel, usable without borrowing the
    /// actor.
    pub fn events(&self) -> Rc<EventChannel<ActorEvent>> {
        Rc::clone(&self.events)
    }

    pub fn on(&self, event: &str, listener: impl Fn(&ActorEvent) + 'static) -> ListenerId {
        self.events.on(event, listener)
    }

    pub fn off(&self, event: &str, id: ListenerId) -> bool {
        self.events.off(event, id)
    }

    /// Asks the containers holding this actor to adopt `child`.
    pub fn spawn(&self, child: ActorRef) {
        self.events.emit(SPAWN, &ActorEvent::Spawn(child));
    }

    /// Asks the containers holding this actor to evict it.
    ///
    /// Traits stay attached; detach them explicitly if needed.
    pub fn destroy(&self) {
        self.events.emit(DESTROY, &ActorEvent::Destroy(self.id));
    }

    /// Emits a custom named event carrying this actor's id.
    pub fn notify(&self, event: &str) {
        self.events.emit(event, &ActorEvent::Notify(self.id));
    }

    // ── hooks ─────────────────────────────────────────────────────────────

    /// Appends a closure run once per step after the traits.
    pub fn on_update(&mut self, hook: impl FnMut(&mut Actor, &mut StepCtx<'_>) + 'static) {
        self.hooks.push(Box::new(hook));
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    // ── traits ────────────────────────────────────────────────────────────

    /// Creates, attaches and initializes a `K`.
    ///
    /// An existing trait with the same tag is replaced: its `on_remove` runs
    /// and the new one takes its place in update order. A trait replacing
    /// itself from one of its own hooks gets `on_remove` once that hook
    /// returns.
    pub fn add_trait<K: TraitKind>(&mut self, options: K::Options) -> Result<Rc<RefCell<K>>, EngineError> {
        let handle = Rc::new(RefCell::new(K::create(self, options)?));

        if let Some(old) = self.traits.insert(Rc::clone(&handle)) {
            log::debug!("actor {:?}: replacing trait '{}'", self.id, K::TAG);
            self.detach(old);
        }
        handle.borrow_mut().init(self);
        Ok(handle)
    }

    pub fn trait_handle<K: TraitKind>(&self) -> Option<Rc<RefCell<K>>> {
        self.traits.get::<K>()
    }

    pub fn trait_by_tag(&self, tag: &str) -> Option<Rc<RefCell<dyn ActorTrait>>> {
        self.traits.get_dyn(tag)
    }

    pub fn has_trait(&self, tag: &str) -> bool {
        self.traits.contains(tag)
    }

    pub fn trait_tags(&self) -> Vec<TraitTag> {
        self.traits.tags().collect()
    }

    /// Detaches the trait under `tag` and runs its `on_remove`.
    ///
    /// Returns `false` when no such trait is attached. A trait removing
    /// itself from one of its own hooks gets `on_remove` once that hook
    /// returns.
    pub fn remove_trait(&mut self, tag: &str) -> bool {
        match self.traits.remove(tag) {
            Some(old) => {
                self.detach(old);
                true
            }
            None => false,
        }
    }

    /// Runs `f` with the `K` trait and its owner both mutably borrowed.
    ///
    /// Returns `None` when no `K` is attached (or it is already borrowed).
    pub fn with_trait<K: TraitKind, R>(&mut self, f: impl FnOnce(&mut K, &mut Actor) -> R) -> Option<R> {
        let handle = self.traits.get::<K>()?;
        let result = {
            let mut t = handle.try_borrow_mut().ok()?;
            f(&mut *t, self)
        };
        self.finish_removals();
        Some(result)
    }

    /// Number of detached traits still waiting for `on_remove`.
    pub fn pending_removals(&self) -> usize {
        self.pending_removals.len()
    }

    fn detach(&mut self, old: Rc<RefCell<dyn ActorTrait>>) {
        let busy = match old.try_borrow_mut() {
            Ok(mut t) => {
                t.on_remove(self);
                false
            }
            Err(_) => true,
        };
        if busy {
            log::trace!("actor {:?}: trait busy, on_remove deferred", self.id);
            self.pending_removals.push(old);
        }
    }

    /// Runs `on_remove` for every deferred trait whose borrow has ended.
    fn finish_removals(&mut self) {
        while !self.pending_removals.is_empty() {
            let pending = mem::take(&mut self.pending_removals);
            let before = pending.len();
            let mut busy = Vec::new();
            for old in pending {
                match old.try_borrow_mut() {
                    Ok(mut t) => t.on_remove(self),
                    Err(_) => busy.push(Rc::clone(&old)),
                };
            }
            let stuck = busy.len() == before;
            self.pending_removals.extend(busy);
            if stuck {
                break;
            }
        }
    }

    // ── children ──────────────────────────────────────────────────────────

    /// Adds `child` to a container or static container actor.
    ///
    /// Static containers render the child into their buffer immediately and
    /// keep no reference. Returns `false` for other variants.
    pub fn add_child(&mut self, child: &ActorRef) -> bool {
        let origin = Vec2::new(self.x, self.y);
        match &mut self.kind {
            ActorKind::Container(c) => c.add(child),
            ActorKind::StaticContainer(s) => s.bake(child, origin),
            _ => {
                log::warn!("actor {:?} cannot hold children", self.id);
                false
            }
        }
    }

    pub fn remove_child(&mut self, child: &ActorRef) -> bool {
        match &self.kind {
            ActorKind::Container(c) => c.remove(child),
            _ => false,
        }
    }

    /// Live members of a container actor (empty for other variants).
    pub fn children(&self) -> Vec<ActorRef> {
        match &self.kind {
            ActorKind::Container(c) => c.members(),
            _ => Vec::new(),
        }
    }

    // ── step / render ─────────────────────────────────────────────────────

    /// Advances this actor by one simulation step.
    pub fn update(&mut self, ctx: &mut StepCtx<'_>) {
        self.time += 1;

        if let Some(cam) = ctx.camera_position() {
            if let Some(prev) = self.prev_camera {
                self.x += (cam.x - prev.x) * (1.0 - self.parallax_x);
                self.y += (cam.y - prev.y) * (1.0 - self.parallax_y);
            }
            self.prev_camera = Some(cam);
        }

        self.update_traits(ctx);
        self.run_hooks(ctx);

        match &mut self.kind {
            ActorKind::StrokePath(path) => path.camera_origin = ctx.camera_position(),
            ActorKind::Container(c) => {
                let c = c.clone();
                c.update(ctx);
            }
            _ => {}
        }
    }

    pub fn render(&self, target: &mut dyn Surface) {
        self.kind.render(self, target);
    }

    fn update_traits(&mut self, ctx: &mut StepCtx<'_>) {
        for handle in self.traits.handles() {
            // A trait removed earlier in this step is skipped.
            if !self.traits.is_attached(&handle) {
                continue;
            }
            match handle.try_borrow_mut() {
                Ok(mut t) => t.update(self, ctx),
                Err(_) => log::warn!("actor {:?}: trait busy, update skipped", self.id),
            }
            self.finish_removals();
        }
    }

    fn run_hooks(&mut self, ctx: &mut StepCtx<'_>) {
        let mut hooks = mem::take(&mut self.hooks);
        for hook in hooks.iter_mut() {
            hook(self, ctx);
        }
        // Hooks registered during the pass run from the next step.
        let added = mem::replace(&mut self.hooks, hooks);
        self.hooks.extend(added);
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("kind", &self.kind.name())
            .field("bounds", &self.bounds())
            .field("time", &self.time)
            .field("traits", &self.trait_tags())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::paint::Color;

    /// Drops itself (or swaps in a fresh copy) from its own update.
    struct Quitter {
        removed: Rc<Cell<u32>>,
        replace: bool,
    }

    impl ActorTrait for Quitter {
        fn tag(&self) -> TraitTag {
            Self::TAG
        }

        fn update(&mut self, owner: &mut Actor, _ctx: &mut StepCtx<'_>) {
            if self.replace {
                assert!(owner.add_trait::<Quitter>((Rc::clone(&self.removed), false)).is_ok());
            } else {
                assert!(owner.remove_trait(Self::TAG));
            }
        }

        fn on_remove(&mut self, _owner: &mut Actor) {
            self.removed.set(self.removed.get() + 1);
        }
    }

    impl TraitKind for Quitter {
        const TAG: TraitTag = "quitter";
        type Options = (Rc<Cell<u32>>, bool);

        fn create(_owner: &Actor, (removed, replace): Self::Options) -> Result<Self, EngineError> {
            Ok(Self { removed, replace })
        }
    }

    fn step(actor: &mut Actor, input: &Input, camera: Option<&mut Camera>) {
        let mut ctx = StepCtx::new(input, camera);
        actor.update(&mut ctx);
    }

    // ── bookkeeping ───────────────────────────────────────────────────────

    #[test]
    fn ids_are_unique() {
        assert_ne!(Actor::new_null().id(), Actor::new_null().id());
    }

    #[test]
    fn time_starts_at_minus_one() {
        let input = Input::new();
        let mut a = Actor::new_null();
        assert_eq!(a.time(), -1);
        step(&mut a, &input, None);
        assert_eq!(a.time(), 0);
        step(&mut a, &input, None);
        assert_eq!(a.time(), 1);
    }

    #[test]
    fn tags_are_unique() {
        let mut a = Actor::new_null().with_tags(["enemy"]);
        a.add_tag("enemy");
        a.add_tag("boss");
        assert_eq!(a.tags(), ["enemy".to_string(), "boss".to_string()]);
        assert!(a.has_tag("boss"));
    }

    // ── parallax ──────────────────────────────────────────────────────────

    #[test]
    fn parallax_shift_skips_first_step() {
        let input = Input::new();
        let mut cam = Camera::new(Rect::new(50.0, 0.0, 10.0, 10.0));
        let mut a = Actor::new_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE).with_parallax(0.5, 1.0);

        step(&mut a, &input, Some(&mut cam));
        assert_eq!(a.x, 0.0);

        cam.x = 60.0;
        cam.y = 8.0;
        step(&mut a, &input, Some(&mut cam));
        assert_eq!(a.x, 5.0);
        assert_eq!(a.y, 0.0);
    }

    #[test]
    fn zero_parallax_tracks_camera() {
        let input = Input::new();
        let mut cam = Camera::new(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut a = Actor::new_null().with_parallax(0.0, 0.0);
        step(&mut a, &input, Some(&mut cam));
        cam.x = 7.0;
        step(&mut a, &input, Some(&mut cam));
        assert_eq!(a.x, 7.0);
    }

    // ── hooks ─────────────────────────────────────────────────────────────

    #[test]
    fn hooks_run_in_order_and_can_mutate_owner() {
        let input = Input::new();
        let mut a = Actor::new_null();
        a.on_update(|me, _| me.x += 1.0);
        a.on_update(|me, _| me.x *= 10.0);
        step(&mut a, &input, None);
        assert_eq!(a.x, 10.0);
    }

    #[test]
    fn hook_added_mid_step_runs_next_step() {
        let input = Input::new();
        let runs = Rc::new(Cell::new(0));
        let mut a = Actor::new_null();
        let r = Rc::clone(&runs);
        let mut added = false;
        a.on_update(move |me, _| {
            if !added {
                added = true;
                let r = Rc::clone(&r);
                me.on_update(move |_, _| r.set(r.get() + 1));
            }
        });

        step(&mut a, &input, None);
        assert_eq!(runs.get(), 0);
        assert_eq!(a.hook_count(), 2);
        step(&mut a, &input, None);
        assert_eq!(runs.get(), 1);
    }

    // ── trait self-removal ────────────────────────────────────────────────

    #[test]
    fn trait_removing_itself_gets_on_remove_once() {
        let input = Input::new();
        let removed = Rc::new(Cell::new(0));
        let mut a = Actor::new_null();
        a.add_trait::<Quitter>((Rc::clone(&removed), false)).unwrap();

        step(&mut a, &input, None);
        assert!(!a.has_trait(Quitter::TAG));
        assert_eq!(removed.get(), 1);
        assert_eq!(a.pending_removals(), 0);

        step(&mut a, &input, None);
        assert_eq!(removed.get(), 1);
    }

    #[test]
    fn trait_replacing_itself_gets_on_remove_once() {
        let input = Input::new();
        let removed = Rc::new(Cell::new(0));
        let mut a = Actor::new_null();
        let first = a.add_trait::<Quitter>((Rc::clone(&removed), true)).unwrap();

        step(&mut a, &input, None);
        assert_eq!(removed.get(), 1);
        assert_eq!(a.trait_tags(), vec![Quitter::TAG]);
        let current = a.trait_handle::<Quitter>().unwrap();
        assert!(!Rc::ptr_eq(&first, &current));
        assert!(!current.borrow().replace);
    }

    #[test]
    fn removal_inside_with_trait_completes_on_return() {
        let removed = Rc::new(Cell::new(0));
        let mut a = Actor::new_null();
        a.add_trait::<Quitter>((Rc::clone(&removed), false)).unwrap();

        let r = Rc::clone(&removed);
        let out = a.with_trait::<Quitter, _>(move |_, owner| {
            let gone = owner.remove_trait(Quitter::TAG);
            // Still borrowed here.
            assert_eq!(r.get(), 0);
            gone
        });
        assert_eq!(out, Some(true));
        assert_eq!(removed.get(), 1);
        assert_eq!(a.pending_removals(), 0);
    }

    // ── events ────────────────────────────────────────────────────────────

    #[test]
    fn destroy_carries_the_id() {
        let a = Actor::new_null();
        let seen = Rc::new(Cell::new(None));
        let s = Rc::clone(&seen);
        a.on(DESTROY, move |ev| {
            if let ActorEvent::Destroy(id) = ev {
                s.set(Some(*id));
            }
        });
        a.destroy();
        assert_eq!(seen.get(), Some(a.id()));
    }

    #[test]
    fn notify_uses_custom_name() {
        let a = Actor::new_null();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        a.on("landed", move |_| h.set(h.get() + 1));
        a.notify("landed");
        a.notify("other");
        assert_eq!(hits.get(), 1);
    }

    // ── variants ──────────────────────────────────────────────────────────

    #[test]
    fn sprite_requires_loaded_image() {
        let images = ImageRegistry::new();
        let err = Actor::new_sprite(&images, "hero", Rect::new(0.0, 0.0, 8.0, 8.0)).unwrap_err();
        assert!(matches!(err, EngineError::MissingAsset { .. }));
    }

    #[test]
    fn sprite_source_defaults_to_whole_image() {
        let mut images = ImageRegistry::new();
        images.insert("hero", crate::surface::Pixmap::new(16, 8));
        let a = Actor::new_sprite(&images, "hero", Rect::new(0.0, 0.0, 8.0, 8.0)).unwrap();
        assert_eq!(a.source_rect(), Some(Rect::new(0.0, 0.0, 16.0, 8.0)));
    }

    #[test]
    fn non_containers_reject_children() {
        let mut a = Actor::new_null();
        let child = Actor::new_null().shared();
        assert!(!a.add_child(&child));
        assert!(a.children().is_empty());
    }
}
