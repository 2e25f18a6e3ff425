use std::cell::RefCell;
use std::f32::consts::TAU;
use std::rc::{Rc, Weak};

use hako_engine::actor::{Actor, ActorRef, StepCtx};
use hako_engine::coords::Rect;
use hako_engine::input::{Input, Key, MouseButton};
use hako_engine::paint::Color;
use hako_engine::traits::{SpriteAnimation, SpriteAnimationTrait};
use hako_engine::EngineError;

use crate::content::{Content, APPLE, BOMB, BGM, GROUND_Y, HERO, SFX_BOOM, SFX_PICK, TILE, WIDTH, WORLD_WIDTH};
use crate::rng::Rng;

/// Steps between level increases.
const LEVEL_STEPS: u32 = 300;
/// Steps a landed fruit takes to fade out.
const FADE_STEPS: u32 = 20;
const PARTICLE_LIFE: i64 = 40;
const APPLE_POINTS: u32 = 10;

/// Where a round is.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Playing,
    /// The hero was hit; `ticks` counts steps since.
    Dying { ticks: u32 },
    Over,
}

/// Round state shared by the play scene's hooks.
#[derive(Debug)]
pub struct PlayState {
    pub score: u32,
    pub ticks: u32,
    pub phase: Phase,
    pub rng: Rng,
}

impl PlayState {
    pub fn new(rng: Rng) -> Self {
        Self { score: 0, ticks: 0, phase: Phase::Playing, rng }
    }

    pub fn level(&self) -> u32 {
        self.ticks / LEVEL_STEPS
    }

    /// Per-step probability that a new fruit appears.
    pub fn spawn_chance(&self) -> f32 {
        0.03 + self.level() as f32 * 0.0001
    }
}

pub type SharedState = Rc<RefCell<PlayState>>;

/// Space, Enter or a click, on the step it happened.
pub fn confirm_pressed(input: &Input) -> bool {
    input.just_pressed(Key::Space) || input.just_pressed(Key::Enter) || input.just_pressed(MouseButton::Left)
}

/// Collision box, one pixel inside the actor's bounds.
pub fn hitbox(actor: &Actor) -> Rect {
    Rect::new(actor.x + 1.0, actor.y + 1.0, actor.width - 2.0, actor.height - 2.0)
}

// ── hero ───────────────────────────────────────────────────────────────────

pub fn hero(content: &Content, state: &SharedState, x: f32) -> Result<ActorRef, EngineError> {
    let mut hero =
        Actor::new_sprite(&content.images, HERO, Rect::new(x, GROUND_Y - TILE, TILE, TILE))?.with_tags(["hero"]);

    let frame = |i: f32| Rect::new(i * TILE, 0.0, TILE, TILE);
    hero.add_trait::<SpriteAnimationTrait>(vec![
        SpriteAnimation::new("stand", vec![frame(0.0)], 0),
        SpriteAnimation::strip("walk", frame(1.0), 2, 6).looped(),
        SpriteAnimation::strip("dying", frame(3.0), 2, 12),
        SpriteAnimation::new("died", vec![frame(5.0)], 0),
    ])?;
    hero.with_trait::<SpriteAnimationTrait, _>(|anim, owner| {
        anim.play(owner, "stand", true);
    });

    let state = Rc::clone(state);
    hero.on_update(move |me, ctx| {
        let phase = state.borrow().phase;
        if phase == Phase::Playing {
            walk(me, ctx);
        } else {
            fall_down(me);
        }
    });

    Ok(hero.shared())
}

fn walk(me: &mut Actor, ctx: &StepCtx<'_>) {
    let input = ctx.input;
    let mut dx = 0.0;
    if input.is_down(Key::ArrowLeft) || input.is_down(Key::A) {
        dx -= 1.0;
    }
    if input.is_down(Key::ArrowRight) || input.is_down(Key::D) {
        dx += 1.0;
    }
    // Holding the pointer walks towards it.
    if dx == 0.0 && input.is_down(MouseButton::Left) {
        let cam_x = ctx.camera_position().map_or(0.0, |c| c.x.floor());
        let target = input.pointer().x + cam_x;
        let center = me.x + me.width / 2.0;
        if (target - center).abs() >= 1.0 {
            dx = (target - center).signum();
        }
    }

    if dx != 0.0 {
        me.x = (me.x + dx).clamp(0.0, WORLD_WIDTH - me.width);
        me.scale_x = dx;
    }

    let wanted = if dx == 0.0 { "stand" } else { "walk" };
    me.with_trait::<SpriteAnimationTrait, _>(|anim, owner| {
        if anim.current() != Some(wanted) {
            anim.play(owner, wanted, true);
        }
    });
}

fn fall_down(me: &mut Actor) {
    me.with_trait::<SpriteAnimationTrait, _>(|anim, owner| {
        let current = anim.current().map(str::to_owned);
        match current.as_deref() {
            Some("dying") if !anim.is_playing() => {
                anim.play(owner, "died", true);
            }
            Some("dying") | Some("died") => {}
            _ => {
                anim.play(owner, "dying", true);
            }
        }
    });
}

// ── fruit ──────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FruitKind {
    Apple,
    Bomb,
}

impl FruitKind {
    fn image(self) -> &'static str {
        match self {
            FruitKind::Apple => APPLE,
            FruitKind::Bomb => BOMB,
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum FruitPhase {
    Falling,
    Landed { ticks: u32 },
}

/// Horizontal speed for a new fruit; later levels drift more.
fn drift(level: u32, rng: &mut Rng) -> f32 {
    let tier = (level / 5).min(3) as f32;
    rng.range(-0.15, 0.15) * tier
}

/// A fruit dropping from above `x`.
///
/// Falling fruit accelerates, bounces off the field edges and is caught
/// when it touches the hero's hitbox. Fruit that reaches the ground fades
/// away.
pub fn fruit(
    content: &Rc<Content>,
    state: &SharedState,
    hero: Weak<RefCell<Actor>>,
    kind: FruitKind,
    x: f32,
) -> Result<ActorRef, EngineError> {
    let mut actor = Actor::new_sprite(&content.images, kind.image(), Rect::new(x, -TILE, TILE, TILE))?
        .with_tags([kind.image()]);

    let (level, vx) = {
        let mut s = state.borrow_mut();
        let level = s.level();
        (level, drift(level, &mut s.rng))
    };
    let ay = (level as f32 + 100.0) / 4096.0;
    let (mut vx, mut vy) = (vx, -1.5 * ay);
    let mut phase = FruitPhase::Falling;

    let content = Rc::clone(content);
    let state = Rc::clone(state);
    actor.on_update(move |me, _| match phase {
        FruitPhase::Falling => {
            vy += ay;
            me.x += vx;
            me.y += vy;
            if me.x < 0.0 || me.x > WORLD_WIDTH - me.width {
                vx = -vx;
                me.x = me.x.clamp(0.0, WORLD_WIDTH - me.width);
            }
            if kind == FruitKind::Bomb {
                me.rotation = (me.time() as f32 * 12.0) % 360.0;
            }

            let playing = state.borrow().phase == Phase::Playing;
            if playing && touches(&hero, me.bounds()) {
                caught(me, kind, &content, &state);
                return;
            }
            if me.y + me.height >= GROUND_Y {
                me.y = GROUND_Y - me.height;
                phase = FruitPhase::Landed { ticks: 0 };
            }
        }
        FruitPhase::Landed { ticks } => {
            me.alpha = 1.0 - ticks as f32 / FADE_STEPS as f32;
            if ticks >= FADE_STEPS {
                me.destroy();
            } else {
                phase = FruitPhase::Landed { ticks: ticks + 1 };
            }
        }
    });

    Ok(actor.shared())
}

fn touches(hero: &Weak<RefCell<Actor>>, bounds: Rect) -> bool {
    let Some(hero) = hero.upgrade() else {
        return false;
    };
    let Ok(hero) = hero.try_borrow() else {
        return false;
    };
    hitbox(&hero).intersects(bounds)
}

fn caught(me: &mut Actor, kind: FruitKind, content: &Content, state: &SharedState) {
    match kind {
        FruitKind::Apple => {
            state.borrow_mut().score += APPLE_POINTS;
            content.play_sound(SFX_PICK);
        }
        FruitKind::Bomb => {
            log::info!("bomb caught at score {}", state.borrow().score);
            content.stop_sound(BGM);
            content.play_sound(SFX_BOOM);

            let center = me.bounds().center();
            let mut s = state.borrow_mut();
            s.phase = Phase::Dying { ticks: 0 };
            for i in 0..12 {
                let color = if i % 2 == 0 { Color::from_srgb_u8(250, 160, 40, 255) } else { Color::WHITE };
                me.spawn(particle(center.x, center.y, color, &mut s.rng));
            }
        }
    }
    me.destroy();
}

// ── effects / HUD ──────────────────────────────────────────────────────────

/// One-pixel spark thrown out of an explosion.
pub fn particle(x: f32, y: f32, color: Color, rng: &mut Rng) -> ActorRef {
    let angle = rng.range(0.0, TAU);
    let speed = rng.range(0.5, 2.0);
    let (mut vx, mut vy) = (angle.cos() * speed, angle.sin() * speed - 1.0);

    let mut spark = Actor::new_rect(Rect::new(x, y, 1.0, 1.0), color).with_tags(["particle"]);
    spark.on_update(move |me, _| {
        if me.time() >= 10 {
            vx *= 0.6;
            vy *= 0.6;
        } else {
            vy += 0.1;
        }
        me.x += vx;
        me.y += vy;
        me.alpha = 1.0 - me.time() as f32 / PARTICLE_LIFE as f32;
        if me.time() >= PARTICLE_LIFE {
            me.destroy();
        }
    });
    spark.shared()
}

/// Score and level readouts pinned to the screen.
pub fn hud(content: &Content, state: &SharedState) -> ActorRef {
    let mut hud = Actor::new_container().with_tags(["hud"]);

    let mut score = Actor::new_text("0", WIDTH as f32 / 2.0, 4.0, content.text_style(8.0, Color::WHITE))
        .with_parallax(0.0, 0.0);
    let s = Rc::clone(state);
    score.on_update(move |me, _| {
        let text = format!("{:05}", s.borrow().score);
        me.set_text(text);
    });

    let mut level = Actor::new_text("", WIDTH as f32 / 2.0, 14.0, content.text_style(6.0, Color::WHITE))
        .with_parallax(0.0, 0.0);
    level.alpha = 0.7;
    let s = Rc::clone(state);
    level.on_update(move |me, _| {
        let text = format!("LV {}", s.borrow().level() + 1);
        me.set_text(text);
    });

    hud.add_child(&score.shared());
    hud.add_child(&level.shared());
    hud.shared()
}

#[cfg(test)]
mod tests {
    use hako_engine::actor::Container;

    use super::*;

    fn content() -> Rc<Content> {
        Content::build(None)
    }

    fn state() -> SharedState {
        Rc::new(RefCell::new(PlayState::new(Rng::new(1))))
    }

    fn step(container: &Container, input: &Input) {
        let mut ctx = StepCtx::new(input, None);
        container.update(&mut ctx);
    }

    // ── rules ─────────────────────────────────────────────────────────────

    #[test]
    fn level_and_spawn_chance_grow_with_time() {
        let mut s = PlayState::new(Rng::new(1));
        assert_eq!(s.level(), 0);
        assert!((s.spawn_chance() - 0.03).abs() < 1e-6);
        s.ticks = LEVEL_STEPS * 10;
        assert_eq!(s.level(), 10);
        assert!(s.spawn_chance() > 0.03);
    }

    #[test]
    fn early_levels_do_not_drift() {
        let mut rng = Rng::new(3);
        assert_eq!(drift(0, &mut rng), 0.0);
        assert!(drift(20, &mut rng).abs() <= 0.45);
    }

    // ── actors ────────────────────────────────────────────────────────────

    #[test]
    fn apple_landing_on_the_hero_scores() {
        let (content, state) = (content(), state());
        let world = Container::new();
        let hero = hero(&content, &state, 40.0).unwrap();
        world.add(&hero);

        let apple = fruit(&content, &state, Rc::downgrade(&hero), FruitKind::Apple, 40.0).unwrap();
        world.add(&apple);

        let input = Input::new();
        for _ in 0..200 {
            step(&world, &input);
        }
        assert_eq!(state.borrow().score, APPLE_POINTS);
        assert!(!world.contains(&apple));
    }

    #[test]
    fn bomb_ends_the_round_and_throws_sparks() {
        let (content, state) = (content(), state());
        let world = Container::new();
        let hero = hero(&content, &state, 40.0).unwrap();
        world.add(&hero);
        world.add(&fruit(&content, &state, Rc::downgrade(&hero), FruitKind::Bomb, 40.0).unwrap());

        let input = Input::new();
        for _ in 0..200 {
            step(&world, &input);
            if state.borrow().phase != Phase::Playing {
                break;
            }
        }
        assert_eq!(state.borrow().phase, Phase::Dying { ticks: 0 });
        let sparks = world.members().iter().filter(|a| a.borrow().has_tag("particle")).count();
        assert_eq!(sparks, 12);

        step(&world, &input);
        let anim = hero.borrow().trait_handle::<SpriteAnimationTrait>().unwrap();
        assert_eq!(anim.borrow().current(), Some("dying"));
    }

    #[test]
    fn missed_fruit_fades_on_the_ground() {
        let (content, state) = (content(), state());
        let world = Container::new();
        let apple = fruit(&content, &state, Weak::new(), FruitKind::Apple, 8.0).unwrap();
        world.add(&apple);

        let input = Input::new();
        for _ in 0..400 {
            step(&world, &input);
        }
        assert!(world.is_empty());
        assert_eq!(state.borrow().score, 0);
    }

    #[test]
    fn particles_expire() {
        let world = Container::new();
        let mut rng = Rng::new(9);
        world.add(&particle(10.0, 10.0, Color::WHITE, &mut rng));
        let input = Input::new();
        for _ in 0..=PARTICLE_LIFE {
            step(&world, &input);
        }
        assert!(world.is_empty());
    }

    #[test]
    fn hero_walks_and_faces_left() {
        let (content, state) = (content(), state());
        let hero = hero(&content, &state, 40.0).unwrap();
        let mut input = Input::new();
        input.apply_event(&hako_engine::input::InputEvent::Key {
            key: Key::ArrowLeft,
            state: hako_engine::input::KeyState::Pressed,
            code: 0,
            repeat: false,
        });
        input.poll();

        let mut ctx = StepCtx::new(&input, None);
        hero.borrow_mut().update(&mut ctx);
        let h = hero.borrow();
        assert_eq!(h.x, 39.0);
        assert_eq!(h.scale_x, -1.0);
        let anim = h.trait_handle::<SpriteAnimationTrait>().unwrap();
        assert_eq!(anim.borrow().current(), Some("walk"));
    }
}
