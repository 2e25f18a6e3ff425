use std::cell::RefCell;
use std::rc::Rc;

use crate::actor::StepCtx;
use crate::camera::Camera;
use crate::coords::Rect;
use crate::event::ListenerId;
use crate::input::{Input, InputEvent};
use crate::scene::SceneRef;
use crate::surface::Surface;
use crate::time::FixedStep;

use super::GameConfig;

/// What one call to [`Game::frame`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Simulation steps run this frame.
    pub steps: u32,
    /// Whether the active scenes were rendered.
    pub rendered: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum LoopState {
    Idle,
    Running,
}

type PendingChange = Rc<RefCell<Option<Vec<SceneRef>>>>;

/// Fixed-step game loop over a set of active scenes.
pub struct Game<S: Surface> {
    config: GameConfig,
    surface: S,
    camera: Rc<RefCell<Camera>>,
    input: Input,
    step: FixedStep,
    state: LoopState,

    scenes: Vec<(SceneRef, ListenerId)>,
    // Filled by the scenes' `changeScene` listener, drained after each step.
    pending: PendingChange,
}

impl<S: Surface> Game<S> {
    /// Creates an idle game drawing into `surface`.
    ///
    /// The camera starts out covering `config.width × config.height` at the
    /// world origin.
    pub fn new(config: GameConfig, surface: S) -> Self {
        let camera = Camera::new(Rect::new(0.0, 0.0, config.width as f32, config.height as f32));
        Self {
            config,
            surface,
            camera: Rc::new(RefCell::new(camera)),
            input: Input::new(),
            step: FixedStep::new(config.fps),
            state: LoopState::Idle,
            scenes: Vec::new(),
            pending: Rc::new(RefCell::new(None)),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn camera(&self) -> Rc<RefCell<Camera>> {
        Rc::clone(&self.camera)
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    /// Feeds one host event into the latest-observed input state.
    pub fn handle_event(&mut self, event: &InputEvent) {
        self.input.apply_event(event);
    }

    pub fn scenes(&self) -> Vec<SceneRef> {
        self.scenes.iter().map(|(s, _)| Rc::clone(s)).collect()
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Enters the running state; frames before this do nothing.
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            log::debug!("game: starting at {} fps", self.config.fps);
            self.state = LoopState::Running;
        }
    }

    /// Replaces the active scenes.
    ///
    /// The game stops listening to the previous scenes, listens for
    /// `changeScene` on the new ones and binds its camera onto each.
    pub fn change_scene(&mut self, scenes: Vec<SceneRef>) {
        for (scene, id) in self.scenes.drain(..) {
            scene.off_change_scene(id);
        }

        for scene in scenes {
            let pending = Rc::clone(&self.pending);
            let id = scene.on_change_scene(move |next| {
                *pending.borrow_mut() = Some(next.clone());
            });
            scene.bind_camera(Rc::clone(&self.camera));
            self.scenes.push((scene, id));
        }

        let names: Vec<&str> = self.scenes.iter().map(|(s, _)| s.name()).collect();
        log::info!("game: active scenes {names:?}");
    }

    /// Advances the simulation to `timestamp_ms` and renders once.
    ///
    /// Does nothing until [`Game::start`] has been called.
    pub fn frame(&mut self, timestamp_ms: f64) -> FrameStats {
        if self.state == LoopState::Idle {
            return FrameStats::default();
        }

        self.step.accumulate(timestamp_ms);
        let mut steps = 0;
        while self.step.take_step() {
            self.input.poll();
            self.update_scenes();
            self.apply_pending_change();
            steps += 1;
        }

        self.render();
        FrameStats { steps, rendered: true }
    }

    /// Steps every scene with a copy of the camera, written back after each
    /// scene when a hook changed it through the context.
    ///
    /// The shared camera stays unborrowed during the step, so hooks may read
    /// it through [`crate::scene::Scene::camera`].
    fn update_scenes(&mut self) {
        for scene in self.scenes() {
            let before = self.camera.borrow().clone();
            let mut camera = before.clone();
            let mut ctx = StepCtx::new(&self.input, Some(&mut camera));
            scene.update(&mut ctx);
            if camera != before {
                *self.camera.borrow_mut() = camera;
            }
        }
    }

    fn apply_pending_change(&mut self) {
        let next = self.pending.borrow_mut().take();
        if let Some(scenes) = next {
            self.change_scene(scenes);
        }
    }

    fn render(&mut self) {
        let camera = self.camera.borrow().clone();
        let mut scope = camera.apply_transform(&mut self.surface);
        for (scene, _) in &self.scenes {
            scene.render(&mut *scope);
        }
        scope.reset();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::actor::Actor;
    use crate::paint::Color;
    use crate::scene::Scene;
    use crate::surface::{Canvas, Transform};

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn game(w: u32, h: u32) -> Game<Canvas> {
        Game::new(GameConfig::new(w, h).with_fps(50), Canvas::new(w, h))
    }

    fn counter(scene: &SceneRef) -> Rc<Cell<u32>> {
        let n = Rc::new(Cell::new(0));
        let c = Rc::clone(&n);
        scene.on_update(move |_, _| c.set(c.get() + 1));
        n
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn idle_game_does_nothing() {
        let mut g = game(4, 4);
        let scene = Scene::new("s");
        let n = counter(&scene);
        g.change_scene(vec![scene]);

        assert_eq!(g.frame(1000.0), FrameStats::default());
        assert_eq!(n.get(), 0);
        assert!(!g.is_running());
    }

    #[test]
    fn long_gap_runs_a_single_step() {
        let mut g = Game::new(GameConfig::new(4, 4), Canvas::new(4, 4));
        let scene = Scene::new("s");
        let n = counter(&scene);
        g.change_scene(vec![scene]);
        g.start();

        assert_eq!(g.frame(10_000.0).steps, 1);
        assert_eq!(n.get(), 1);
    }

    #[test]
    fn steps_follow_elapsed_time() {
        let mut g = game(4, 4);
        let scene = Scene::new("s");
        let n = counter(&scene);
        g.change_scene(vec![scene]);
        g.start();

        assert_eq!(g.frame(20.0).steps, 1);
        assert_eq!(g.frame(30.0).steps, 0);
        assert_eq!(g.frame(40.0).steps, 1);
        assert_eq!(n.get(), 2);
    }

    // ── scene changes ─────────────────────────────────────────────────────

    #[test]
    fn change_scene_binds_camera_and_moves_listener() {
        let mut g = game(4, 4);
        let (a, b) = (Scene::new("a"), Scene::new("b"));
        g.change_scene(vec![Rc::clone(&a)]);
        assert!(a.camera().is_some_and(|c| Rc::ptr_eq(&c, &g.camera())));

        g.change_scene(vec![Rc::clone(&b)]);
        assert!(b.camera().is_some());

        // `a` is no longer followed.
        a.change_scene(vec![Scene::new("c")]);
        g.apply_pending_change();
        assert_eq!(g.scenes()[0].name(), "b");
    }

    #[test]
    fn scene_request_applies_after_the_step() {
        let mut g = game(4, 4);
        let title = Scene::new("title");
        let play = Scene::new("play");
        let play_steps = counter(&play);

        let weak = Rc::downgrade(&title);
        let next = Rc::clone(&play);
        title.on_update(move |_, _| {
            if let Some(t) = weak.upgrade() {
                t.change_scene(vec![Rc::clone(&next)]);
            }
        });
        g.change_scene(vec![title]);
        g.start();

        g.frame(20.0);
        assert_eq!(g.scenes()[0].name(), "play");
        assert_eq!(play_steps.get(), 0);

        g.frame(40.0);
        assert_eq!(play_steps.get(), 1);
    }

    // ── camera ────────────────────────────────────────────────────────────

    #[test]
    fn hooks_move_the_camera_through_ctx() {
        let mut g = game(4, 4);
        let scene = Scene::new("s");
        scene.on_update(|_, ctx| {
            if let Some(cam) = ctx.camera.as_deref_mut() {
                cam.x += 1.0;
            }
        });
        g.change_scene(vec![scene]);
        g.start();
        g.frame(20.0);
        assert_eq!(g.camera().borrow().x, 1.0);
    }

    #[test]
    fn render_goes_through_camera_and_restores() {
        let mut g = game(4, 2);
        let scene = Scene::new("s");
        scene.add(&Actor::new_rect(Rect::new(3.0, 0.0, 1.0, 1.0), Color::from_srgb_u8(255, 0, 0, 255)).shared());
        g.change_scene(vec![scene]);
        g.camera().borrow_mut().x = 2.0;
        g.start();

        let stats = g.frame(20.0);
        assert!(stats.rendered);
        assert_eq!(g.surface().pixmap().pixel(1, 0), Some(RED));
        assert_eq!(g.surface().pixmap().pixel(3, 0), Some([0, 0, 0, 0]));
        assert_eq!(g.surface().transform(), Transform::IDENTITY);
        assert_eq!(g.surface().save_depth(), 0);
    }

    #[test]
    fn hooks_can_read_the_scene_camera_mid_step() {
        let mut g = game(4, 4);
        let scene = Scene::new("s");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let weak = Rc::downgrade(&scene);
        let s = Rc::clone(&seen);
        scene.on_update(move |_, ctx| {
            if let Some(cam) = ctx.camera.as_deref_mut() {
                cam.x += 2.0;
            }
            if let Some(shared) = weak.upgrade().and_then(|scene| scene.camera()) {
                s.borrow_mut().push(shared.borrow().x);
            }
        });
        g.change_scene(vec![scene]);
        g.start();

        g.frame(20.0);
        g.frame(40.0);
        assert_eq!(*seen.borrow(), vec![0.0, 2.0]);
        assert_eq!(g.camera().borrow().x, 4.0);
    }

    #[test]
    fn stroke_path_follows_the_moved_camera() {
        let mut g = game(8, 4);
        let scene = Scene::new("s");
        scene.on_update(|_, ctx| {
            if let Some(cam) = ctx.camera.as_deref_mut() {
                cam.x = 3.0;
            }
        });
        let mut path = Actor::new_stroke_path("#f00");
        if let Some(p) = path.stroke_path_mut() {
            p.move_to(5.0, 1.0);
            p.line_to(6.0, 1.0);
        }
        scene.add(&path.shared());
        g.change_scene(vec![scene]);
        g.start();

        g.frame(20.0);
        let pixels = g.surface().pixmap();
        assert_eq!(pixels.pixel(2, 1), Some(RED));
        assert_eq!(pixels.pixel(3, 1), Some(RED));
        assert_eq!(pixels.pixel(5, 1), Some([0, 0, 0, 0]));
        assert_eq!(pixels.pixel(6, 1), Some([0, 0, 0, 0]));
    }
}
