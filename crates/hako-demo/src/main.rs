//! Kudamono Catch: apples and bombs fall from a tree, the hero catches the
//! apples and must dodge the bombs.
//!
//! Arrows / A-D or holding the pointer walk; Space, Enter or a click
//! confirms. Set `HAKO_FONT` to a TrueType/OpenType file to see the text.

mod actors;
mod content;
mod rng;
mod scenes;

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use hako_engine::device::GpuInit;
use hako_engine::game::{Game, GameConfig};
use hako_engine::logging::{init_logging, LoggingConfig};
use hako_engine::surface::Canvas;
use hako_engine::window::{Runtime, RuntimeConfig};

use content::{Content, HEIGHT, WIDTH};

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let (canvas, font) = match std::env::var_os("HAKO_FONT").map(PathBuf::from) {
        Some(path) => match content::load_font(&path) {
            Ok((fonts, id)) => (Canvas::with_fonts(WIDTH, HEIGHT, Rc::new(fonts)), Some(id)),
            Err(e) => {
                log::warn!("{e:#}; text will not be drawn");
                (Canvas::new(WIDTH, HEIGHT), None)
            }
        },
        None => {
            log::info!("HAKO_FONT not set; text will not be drawn");
            (Canvas::new(WIDTH, HEIGHT), None)
        }
    };

    let content = Content::build(font);
    let mut game = Game::new(GameConfig::new(WIDTH, HEIGHT), canvas);
    game.change_scene(vec![scenes::title(&content).context("failed to build the title scene")?]);

    let config = RuntimeConfig { title: "Kudamono Catch".to_string(), scale: 4.0 };
    Runtime::run(config, GpuInit::default(), game)
}
