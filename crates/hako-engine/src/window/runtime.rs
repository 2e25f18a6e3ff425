use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::coords::Vec2;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::game::Game;
use crate::input::platform::winit::{translate_window_event, PointerMapping};
use crate::render::{Presenter, RenderCtx, RenderTarget};
use crate::surface::{Canvas, Surface};
use crate::time::FrameClock;

/// Window configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Initial window size as a multiple of the canvas size (logical pixels).
    pub scale: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "hako".to_string(),
            scale: 2.0,
        }
    }
}

/// Desktop host for a [`Game`] drawing into a [`Canvas`].
pub struct Runtime;

impl Runtime {
    /// Opens the window, starts `game` and drives it until the window closes.
    ///
    /// Every redraw advances the game to the current [`FrameClock`] timestamp
    /// and presents the canvas.
    pub fn run(config: RuntimeConfig, gpu_init: GpuInit, game: Game<Canvas>) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, game);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    clock: FrameClock,
    presenter: Presenter,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    game: Game<Canvas>,

    window: Option<WindowEntry>,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig, gpu_init: GpuInit, game: Game<Canvas>) -> Self {
        Self {
            config,
            gpu_init,
            game,
            window: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let surface = self.game.surface();
        let size = LogicalSize::new(
            f64::from(surface.width()) * self.config.scale,
            f64::from(surface.height()) * self.config.scale,
        );
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        WindowEntryTryBuilder {
            clock: FrameClock::new(),
            presenter: Presenter::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.window = Some(entry);
                self.game.start();
            }
            Err(e) => self.fail(event_loop, e.context("failed to create initial window")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Wait);

        // The game loop runs off redraws, so keep them coming.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (game, window) = (&mut self.game, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return;
        };

        let mapping = entry.with_window(|w| {
            let inner = w.inner_size();
            PointerMapping {
                window_size: Vec2::new(inner.width as f32, inner.height as f32),
                surface_size: Vec2::new(game.surface().width() as f32, game.surface().height() as f32),
            }
        });
        if let Some(ev) = translate_window_event(&mapping, &event) {
            game.handle_event(&ev);
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::debug!("runtime: close requested");
                self.window = None;
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => {
                let mut fatal = false;

                entry.with_mut(|fields| {
                    let ft = fields.clock.tick();
                    let stats = game.frame(ft.timestamp_ms);
                    if !stats.rendered || fields.gpu.is_zero_sized() {
                        return;
                    }

                    let mut frame = match fields.gpu.begin_frame() {
                        Ok(f) => f,
                        Err(err) => {
                            fatal = fields.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal;
                            return;
                        }
                    };

                    // The target borrows the frame; release it before submit() takes it.
                    {
                        let ctx = RenderCtx::new(fields.gpu);
                        let mut target = RenderTarget::new(&mut frame);
                        fields.presenter.present(&ctx, &mut target, game.surface().pixmap());
                    }

                    fields.window.pre_present_notify();
                    fields.gpu.submit(frame);
                });

                if fatal {
                    self.fail(event_loop, anyhow::anyhow!("GPU surface lost beyond recovery"));
                }
            }

            _ => {}
        }
    }
}
