use std::cell::RefCell;
use std::rc::Rc;

use hako_engine::actor::{Actor, ActorRef};
use hako_engine::coords::{Rect, Vec2};
use hako_engine::paint::{Color, ColorStop, LinearGradient, Paint, SpreadMode};
use hako_engine::scene::{Scene, SceneRef};
use hako_engine::EngineError;

use crate::actors::{self, confirm_pressed, FruitKind, Phase, PlayState, SharedState};
use crate::content::{Content, APPLE, BGM, GROUND_Y, HEIGHT, TILE, WIDTH, WORLD_WIDTH};
use crate::rng::Rng;

/// Steps between the hero's fall and the game-over prompt.
const DYING_STEPS: u32 = 90;
const APPLE_ODDS: f32 = 0.8;

fn background() -> Color {
    Color::from_srgb_u8(0x99, 0x99, 0x99, 255)
}

// ── title ──────────────────────────────────────────────────────────────────

pub fn title(content: &Rc<Content>) -> Result<SceneRef, EngineError> {
    let scene = Scene::new("title");
    let w = WIDTH as f32;

    scene.add(&Actor::new_rect(Rect::new(0.0, 0.0, w, HEIGHT as f32), background()).shared());
    scene.add(&Actor::new_text("KUDAMONO\nCATCH", w / 2.0, 36.0, content.text_style(12.0, Color::WHITE)).shared());

    let mut prompt = Actor::new_text("Tap to Start", w / 2.0, 96.0, content.text_style(8.0, Color::BLACK));
    prompt.on_update(|me, _| {
        me.alpha = if (me.time() / 30) % 2 == 0 { 1.0 } else { 0.0 };
    });
    scene.add(&prompt.shared());

    let mut apple = Actor::new_sprite(&content.images, APPLE, Rect::new(w / 2.0 - 8.0, 60.0, 16.0, 16.0))?;
    apple.on_update(|me, _| {
        me.rotation = ((me.time() as f32 / 20.0).sin()) * 20.0;
    });
    scene.add(&apple.shared());

    let weak = Rc::downgrade(&scene);
    let content = Rc::clone(content);
    scene.on_update(move |_, ctx| {
        if let Some(cam) = ctx.camera.as_deref_mut() {
            cam.x = 0.0;
            cam.y = 0.0;
        }
        if !confirm_pressed(ctx.input) {
            return;
        }
        let Some(scene) = weak.upgrade() else { return };
        match play(&content) {
            Ok(next) => scene.change_scene(vec![next]),
            Err(e) => log::error!("cannot start a round: {e}"),
        }
    });

    Ok(scene)
}

// ── play ───────────────────────────────────────────────────────────────────

/// One round: catch apples, dodge bombs.
///
/// Members in drawing order: sky, hills, tree, ground, grass, hero, HUD,
/// then whatever the round spawns.
pub fn play(content: &Rc<Content>) -> Result<SceneRef, EngineError> {
    let scene = Scene::new("play");
    let state: SharedState = Rc::new(RefCell::new(PlayState::new(Rng::from_time())));

    scene.add(&sky());
    scene.add(&hills());
    scene.add(&tree());
    scene.add(&Actor::new_rect(Rect::new(0.0, GROUND_Y, WORLD_WIDTH, HEIGHT as f32 - GROUND_Y), Color::from_srgb_u8(110, 80, 50, 255)).shared());
    scene.add(&grass());

    // Starts centred on the screen so the camera opens at the origin.
    let hero = actors::hero(content, &state, (WIDTH as f32 - TILE) / 2.0)?;
    scene.add(&hero);
    scene.add(&actors::hud(content, &state));

    let weak_scene = Rc::downgrade(&scene);
    let weak_hero = Rc::downgrade(&hero);
    let closure_content = Rc::clone(content);
    scene.on_update(move |me, ctx| {
        let content = &closure_content;
        let phase = state.borrow().phase;
        match phase {
            Phase::Playing => {
                if let (Some(cam), Some(hero)) = (ctx.camera.as_deref_mut(), weak_hero.upgrade()) {
                    if let Ok(hero) = hero.try_borrow() {
                        cam.x = follow(cam.width, hero.bounds());
                    }
                }

                let roll = {
                    let mut s = state.borrow_mut();
                    s.ticks += 1;
                    let chance = s.spawn_chance();
                    if s.rng.chance(chance) {
                        let kind = if s.rng.chance(APPLE_ODDS) { FruitKind::Apple } else { FruitKind::Bomb };
                        Some((kind, s.rng.range(0.0, WORLD_WIDTH - TILE).floor()))
                    } else {
                        None
                    }
                };
                if let Some((kind, x)) = roll {
                    match actors::fruit(&content, &state, weak_hero.clone(), kind, x) {
                        Ok(fruit) => me.spawn(fruit),
                        Err(e) => log::error!("cannot drop {kind:?}: {e}"),
                    }
                }
            }

            Phase::Dying { ticks } if ticks >= DYING_STEPS => {
                state.borrow_mut().phase = Phase::Over;
                let cam_x = ctx.camera_position().map_or(0.0, |c| c.x.floor());
                let text = Actor::new_text(
                    "GAME OVER\nTap to retry",
                    cam_x + WIDTH as f32 / 2.0,
                    48.0,
                    content.text_style(8.0, Color::WHITE),
                )
                .with_parallax(0.0, 0.0);
                me.spawn(text.shared());
                log::info!("round over: score {}", state.borrow().score);
            }

            Phase::Dying { ticks } => {
                state.borrow_mut().phase = Phase::Dying { ticks: ticks + 1 };
            }

            Phase::Over => {
                if !confirm_pressed(ctx.input) {
                    return;
                }
                let Some(scene) = weak_scene.upgrade() else { return };
                match title(&content) {
                    Ok(next) => scene.change_scene(vec![next]),
                    Err(e) => log::error!("cannot return to the title: {e}"),
                }
            }
        }
    });

    content.play_sound(BGM);
    Ok(scene)
}

/// Camera x that keeps `target` centred without leaving the field.
fn follow(view_width: f32, target: Rect) -> f32 {
    let x = target.x + target.width / 2.0 - view_width / 2.0;
    x.clamp(0.0, (WORLD_WIDTH - view_width).max(0.0)).floor()
}

/// Screen-fixed gradient sky.
fn sky() -> ActorRef {
    let gradient = LinearGradient::new(
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, GROUND_Y),
        vec![
            ColorStop::new(0.0, Color::from_srgb_u8(120, 180, 240, 255)),
            ColorStop::new(1.0, background()),
        ],
        SpreadMode::Pad,
    );
    Actor::new_rect(Rect::new(0.0, 0.0, WIDTH as f32, HEIGHT as f32), Paint::LinearGradient(gradient))
        .with_parallax(0.0, 0.0)
        .with_tags(["sky"])
        .shared()
}

/// Far hills scrolling at half speed.
fn hills() -> ActorRef {
    let mut hills = Actor::new_container().with_tags(["hills"]);
    let color = Color::from_srgb_u8(90, 140, 90, 255);
    for (x, w, h) in [(0.0, 40.0, 16.0), (28.0, 48.0, 24.0), (70.0, 36.0, 12.0), (96.0, 44.0, 20.0)] {
        let hill = Actor::new_rect(Rect::new(x, GROUND_Y - h, w, h), color).with_parallax(0.5, 1.0);
        hills.add_child(&hill.shared());
    }
    hills.shared()
}

/// Tree at the right of the field, baked once into a static buffer.
fn tree() -> ActorRef {
    let mut tree = Actor::new_static_container(Rect::new(112.0, 40.0, 32.0, 72.0)).with_tags(["tree"]);
    let leaf = |shade: u8| Color::from_srgb_u8(30, shade, 40, 255);
    let parts = [
        (Rect::new(125.0, 80.0, 6.0, 32.0), Color::from_srgb_u8(100, 60, 30, 255)),
        (Rect::new(116.0, 64.0, 24.0, 16.0), leaf(110)),
        (Rect::new(112.0, 52.0, 32.0, 16.0), leaf(130)),
        (Rect::new(120.0, 40.0, 16.0, 16.0), leaf(150)),
        (Rect::new(118.0, 58.0, 2.0, 2.0), Color::from_srgb_u8(220, 30, 40, 255)),
        (Rect::new(134.0, 66.0, 2.0, 2.0), Color::from_srgb_u8(220, 30, 40, 255)),
    ];
    for (rect, color) in parts {
        tree.add_child(&Actor::new_rect(rect, color).shared());
    }
    tree.shared()
}

/// Zigzag grass line along the ground, drawn pixel by pixel.
fn grass() -> ActorRef {
    let mut grass = Actor::new_stroke_path("#3c9a3c").with_tags(["grass"]);
    if let Some(path) = grass.stroke_path_mut() {
        path.begin_path();
        path.move_to(0.0, GROUND_Y);
        let mut x = 0.0;
        let mut up = true;
        while x < WORLD_WIDTH {
            x += 3.0;
            path.line_to(x, if up { GROUND_Y - 2.0 } else { GROUND_Y });
            up = !up;
        }
    }
    grass.shared()
}
