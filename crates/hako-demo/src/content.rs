use std::cell::RefCell;
use std::f32::consts::TAU;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use hako_engine::assets::{AudioOutput, ImageRegistry, SoundClip, SoundOptions, SoundRegistry};
use hako_engine::paint::Color;
use hako_engine::surface::Pixmap;
use hako_engine::text::{FontId, FontSystem, TextAlign, TextStyle};

use crate::rng::Rng;

pub const WIDTH: u32 = 96;
pub const HEIGHT: u32 = 128;
/// The play field scrolls horizontally across this many pixels.
pub const WORLD_WIDTH: f32 = 160.0;
pub const GROUND_Y: f32 = 112.0;
pub const TILE: f32 = 8.0;

pub const HERO: &str = "hero";
pub const APPLE: &str = "apple";
pub const BOMB: &str = "bomb";

pub const SFX_PICK: &str = "pick";
pub const SFX_BOOM: &str = "boom";
pub const BGM: &str = "bgm";

const SAMPLE_RATE: u32 = 22_050;

/// Images, sounds and the optional font shared by every scene.
pub struct Content {
    pub images: ImageRegistry,
    pub sounds: RefCell<SoundRegistry>,
    pub font: Option<FontId>,
}

impl Content {
    /// Generates the sprite sheets and sound clips and settles the registries.
    pub fn build(font: Option<FontId>) -> Rc<Self> {
        let mut images = ImageRegistry::new();
        images.insert(HERO, hero_sheet());
        images.insert(APPLE, apple());
        images.insert(BOMB, bomb());
        let report = images.load_all();
        log::debug!("images ready: {report:?}");

        let mut sounds = SoundRegistry::new();
        sounds.insert(SFX_PICK, sweep(880.0, 1320.0, 0.08), SoundOptions { volume: 0.6, ..Default::default() });
        sounds.insert(SFX_BOOM, noise_burst(0.4), SoundOptions::default());
        sounds.insert(BGM, arpeggio(), SoundOptions { volume: 0.3, loop_start: Some(0.0), loop_end: None });
        let _ = sounds.on_init(|| log::info!("audio ready"));
        sounds.init(Box::new(LogOutput));

        Rc::new(Self { images, sounds: RefCell::new(sounds), font })
    }

    pub fn text_style(&self, size: f32, color: Color) -> TextStyle {
        let mut style = TextStyle::new(self.font, size, color);
        style.align = TextAlign::Center;
        style
    }

    pub fn play_sound(&self, name: &str) {
        match self.sounds.try_borrow_mut() {
            Ok(mut s) => s.play(name),
            Err(_) => log::warn!("sound registry busy; '{name}' dropped"),
        }
    }

    pub fn stop_sound(&self, name: &str) {
        match self.sounds.try_borrow_mut() {
            Ok(mut s) => s.stop(name),
            Err(_) => log::warn!("sound registry busy; '{name}' not stopped"),
        }
    }
}

/// Loads the TrueType/OpenType font at `path` into a fresh font system.
pub fn load_font(path: &Path) -> Result<(FontSystem, FontId)> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read font {}", path.display()))?;
    let mut fonts = FontSystem::new();
    let id = fonts.load_font(&bytes).with_context(|| format!("failed to parse font {}", path.display()))?;
    Ok((fonts, id))
}

/// Stands in for an audio device: voices are only logged.
struct LogOutput;

impl AudioOutput for LogOutput {
    fn start(&mut self, name: &str, clip: Rc<SoundClip>, options: &SoundOptions) {
        log::debug!(
            "audio: start '{name}' ({:.2}s, volume {:.1}, looping {})",
            clip.duration_secs(),
            options.volume,
            options.looping()
        );
    }

    fn stop(&mut self, name: &str) {
        log::debug!("audio: stop '{name}'");
    }
}

// ── sprite sheets ──────────────────────────────────────────────────────────

const HAIR: [u8; 4] = [70, 45, 25, 255];
const SKIN: [u8; 4] = [240, 200, 160, 255];
const SHIRT: [u8; 4] = [40, 100, 200, 255];
const HURT: [u8; 4] = [220, 60, 60, 255];
const LEGS: [u8; 4] = [50, 50, 70, 255];

fn block(p: &mut Pixmap, x: i32, y: i32, w: i32, h: i32, rgba: [u8; 4]) {
    for yy in y..y + h {
        for xx in x..x + w {
            p.set_pixel(xx, yy, rgba);
        }
    }
}

fn disc(p: &mut Pixmap, cx: f32, cy: f32, r: f32, rgba: [u8; 4]) {
    for y in 0..p.height() as i32 {
        for x in 0..p.width() as i32 {
            let (dx, dy) = (x as f32 + 0.5 - cx, y as f32 + 0.5 - cy);
            if dx * dx + dy * dy <= r * r {
                p.set_pixel(x, y, rgba);
            }
        }
    }
}

/// Six 8×8 frames: stand, walk ×2, dying ×2, died.
pub fn hero_sheet() -> Pixmap {
    let mut p = Pixmap::new(48, 8);

    for (frame, legs) in [(0, [2, 5]), (1, [1, 4]), (2, [3, 6])] {
        let ox = frame * 8;
        block(&mut p, ox + 2, 0, 4, 1, HAIR);
        block(&mut p, ox + 2, 1, 4, 2, SKIN);
        block(&mut p, ox + 1, 3, 6, 3, SHIRT);
        for lx in legs {
            block(&mut p, ox + lx, 6, 1, 2, LEGS);
        }
    }

    for (frame, sink) in [(3, 0), (4, 1)] {
        let ox = frame * 8;
        block(&mut p, ox + 2, sink, 4, 1, HAIR);
        block(&mut p, ox + 2, 1 + sink, 4, 2, SKIN);
        block(&mut p, ox + 1, 3 + sink, 6, 3 - sink, HURT);
        block(&mut p, ox + 2, 6, 1, 2, LEGS);
        block(&mut p, ox + 5, 6, 1, 2, LEGS);
    }

    block(&mut p, 40, 6, 1, 2, HAIR);
    block(&mut p, 41, 6, 2, 2, SKIN);
    block(&mut p, 43, 6, 3, 2, HURT);
    block(&mut p, 46, 6, 2, 2, LEGS);
    p
}

pub fn apple() -> Pixmap {
    let mut p = Pixmap::new(8, 8);
    disc(&mut p, 4.0, 4.5, 3.4, [220, 30, 40, 255]);
    block(&mut p, 4, 0, 1, 2, [110, 70, 30, 255]);
    block(&mut p, 5, 1, 2, 1, [60, 170, 60, 255]);
    p.set_pixel(2, 3, [255, 160, 160, 255]);
    p
}

pub fn bomb() -> Pixmap {
    let mut p = Pixmap::new(8, 8);
    disc(&mut p, 4.0, 4.5, 3.4, [30, 30, 40, 255]);
    p.set_pixel(2, 3, [120, 120, 140, 255]);
    block(&mut p, 5, 0, 1, 2, [250, 160, 40, 255]);
    p
}

// ── sound clips ────────────────────────────────────────────────────────────

fn clip(samples: Vec<f32>) -> SoundClip {
    SoundClip { samples, channels: 1, sample_rate: SAMPLE_RATE }
}

fn frames(secs: f32) -> usize {
    (secs * SAMPLE_RATE as f32) as usize
}

/// Sine sweep from `from` to `to` Hz with a linear fade-out.
pub fn sweep(from: f32, to: f32, secs: f32) -> SoundClip {
    let n = frames(secs).max(1);
    let mut phase = 0.0f32;
    let samples = (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            phase += (from + (to - from) * t) / SAMPLE_RATE as f32;
            (phase * TAU).sin() * (1.0 - t)
        })
        .collect();
    clip(samples)
}

pub fn noise_burst(secs: f32) -> SoundClip {
    let n = frames(secs).max(1);
    let mut rng = Rng::new(0xB00B);
    let samples = (0..n)
        .map(|i| {
            let fade = 1.0 - i as f32 / n as f32;
            rng.range(-1.0, 1.0) * fade * fade
        })
        .collect();
    clip(samples)
}

/// Two-second loop of square-wave notes.
pub fn arpeggio() -> SoundClip {
    const NOTES: [f32; 8] = [262.0, 330.0, 392.0, 523.0, 392.0, 330.0, 294.0, 392.0];
    let per_note = frames(0.25);
    let samples = NOTES
        .iter()
        .flat_map(|&freq| {
            (0..per_note).map(move |i| {
                let cycle = (i as f32 * freq / SAMPLE_RATE as f32).fract();
                let env = 1.0 - i as f32 / per_note as f32;
                if cycle < 0.5 { 0.2 * env } else { -0.2 * env }
            })
        })
        .collect();
    clip(samples)
}
