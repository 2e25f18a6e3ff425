use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::actor::{Actor, ActorRef, Container, StepCtx};
use crate::camera::Camera;
use crate::event::{EventChannel, ListenerId};
use crate::surface::Surface;

/// Shared scene handle; scenes are referenced by the game and by hooks.
pub type SceneRef = Rc<Scene>;

/// Event emitted by [`Scene::change_scene`].
pub const CHANGE_SCENE: &str = "changeScene";

/// A container of actors plus a controller and the bound camera.
///
/// All methods take `&self` so hooks holding a [`std::rc::Weak`] to the
/// scene can add actors or request a transition mid-step.
pub struct Scene {
    name: String,
    actors: Container,
    controller: ActorRef,
    camera: RefCell<Option<Rc<RefCell<Camera>>>>,
    events: EventChannel<Vec<SceneRef>>,
}

impl Scene {
    /// Creates a scene whose controller is its first member.
    pub fn new(name: impl Into<String>) -> SceneRef {
        let actors = Container::new();
        let controller = Actor::new_null().with_tags(["controller"]).shared();
        actors.add(&controller);

        Rc::new(Self {
            name: name.into(),
            actors,
            controller,
            camera: RefCell::new(None),
            events: EventChannel::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ── membership ────────────────────────────────────────────────────────

    pub fn add(&self, actor: &ActorRef) -> bool {
        self.actors.add(actor)
    }

    pub fn remove(&self, actor: &ActorRef) -> bool {
        self.actors.remove(actor)
    }

    pub fn contains(&self, actor: &ActorRef) -> bool {
        self.actors.contains(actor)
    }

    /// Number of members, controller included.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn actors(&self) -> Vec<ActorRef> {
        self.actors.members()
    }

    // ── camera / controller ───────────────────────────────────────────────

    /// Camera bound by the game; `None` until the scene is activated.
    ///
    /// During a step this is the camera as it was when the scene's step
    /// began; moves made through [`StepCtx::camera`] land once it ends.
    pub fn camera(&self) -> Option<Rc<RefCell<Camera>>> {
        self.camera.borrow().clone()
    }

    pub fn bind_camera(&self, camera: Rc<RefCell<Camera>>) {
        *self.camera.borrow_mut() = Some(camera);
    }

    /// Null actor updated first in every step.
    pub fn controller(&self) -> ActorRef {
        Rc::clone(&self.controller)
    }

    /// Adds a scene-level hook, run once per step by the controller.
    pub fn on_update(&self, hook: impl FnMut(&mut Actor, &mut StepCtx<'_>) + 'static) {
        match self.controller.try_borrow_mut() {
            Ok(mut c) => c.on_update(hook),
            Err(_) => log::warn!("scene '{}': controller busy, hook not added", self.name),
        }
    }

    // ── transitions ───────────────────────────────────────────────────────

    /// Asks whoever drives this scene to switch to `scenes`.
    pub fn change_scene(&self, scenes: Vec<SceneRef>) {
        log::debug!("scene '{}' requests a change to {} scene(s)", self.name, scenes.len());
        self.events.emit(CHANGE_SCENE, &scenes);
    }

    pub fn on_change_scene(&self, listener: impl Fn(&Vec<SceneRef>) + 'static) -> ListenerId {
        self.events.on(CHANGE_SCENE, listener)
    }

    pub fn off_change_scene(&self, id: ListenerId) -> bool {
        self.events.off(CHANGE_SCENE, id)
    }

    // ── step / render ─────────────────────────────────────────────────────

    pub fn update(&self, ctx: &mut StepCtx<'_>) {
        self.actors.update(ctx);
    }

    pub fn render(&self, target: &mut dyn Surface) {
        self.actors.render(target);
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("actors", &self.actors.len())
            .field("camera", &self.camera.borrow().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::coords::Rect;
    use crate::input::Input;
    use crate::paint::Color;
    use crate::surface::Canvas;

    #[test]
    fn controller_is_first_member() {
        let scene = Scene::new("title");
        assert_eq!(scene.len(), 1);
        assert!(Rc::ptr_eq(&scene.actors()[0], &scene.controller()));
    }

    #[test]
    fn on_update_runs_through_controller() {
        let input = Input::new();
        let scene = Scene::new("play");
        let steps = Rc::new(Cell::new(0));
        let s = Rc::clone(&steps);
        scene.on_update(move |_, _| s.set(s.get() + 1));

        let mut ctx = StepCtx::new(&input, None);
        scene.update(&mut ctx);
        scene.update(&mut ctx);
        assert_eq!(steps.get(), 2);
    }

    #[test]
    fn change_scene_reaches_listeners() {
        let (a, b) = (Scene::new("a"), Scene::new("b"));
        let got = Rc::new(RefCell::new(Vec::new()));
        let g = Rc::clone(&got);
        let id = a.on_change_scene(move |scenes| {
            g.borrow_mut().extend(scenes.iter().map(|s| s.name().to_owned()));
        });

        a.change_scene(vec![Rc::clone(&b)]);
        assert!(a.off_change_scene(id));
        a.change_scene(vec![b]);
        assert_eq!(*got.borrow(), vec!["b".to_string()]);
    }

    #[test]
    fn camera_is_unbound_until_set() {
        let scene = Scene::new("s");
        assert!(scene.camera().is_none());
        scene.bind_camera(Rc::new(RefCell::new(Camera::new(Rect::new(0.0, 0.0, 4.0, 4.0)))));
        assert_eq!(scene.camera().map(|c| c.borrow().width), Some(4.0));
    }

    #[test]
    fn renders_members_in_order() {
        let scene = Scene::new("s");
        scene.add(&Actor::new_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_srgb_u8(255, 0, 0, 255)).shared());
        scene.add(&Actor::new_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::from_srgb_u8(0, 0, 255, 255)).shared());

        let mut canvas = Canvas::new(1, 1);
        scene.render(&mut canvas);
        assert_eq!(canvas.pixmap().pixel(0, 0), Some([0, 0, 255, 255]));
    }
}
